//! Proposal submission tests: validation, staging, and the chair bypass

mod common;

use common::*;
use mtc_committee::catalog::ballots;
use mtc_committee::catalog::ordering;
use mtc_committee::catalog::submission::{self, QuestionDraft};
use mtc_committee::catalog::tags;
use mtc_common::Error;

#[tokio::test]
async fn member_submission_is_staged_without_position() {
    let pool = setup_db("submit-staged").await;
    let committee = seed_committee(&pool).await;

    let id = stage_competency(&pool, committee.members[0], "Vessel measurement").await;

    let staged: i64 = count(&pool, "SELECT COUNT(*) FROM competencies_stage").await;
    let live: i64 = count(&pool, "SELECT COUNT(*) FROM competencies").await;
    assert_eq!(staged, 1);
    assert_eq!(live, 0);

    let pending = submission::list_pending_competencies(&pool, None).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].proposal.id, id);
    assert_eq!(pending[0].tally.total(), 0);
}

#[tokio::test]
async fn chair_submission_goes_live_directly() {
    let pool = setup_db("submit-chair").await;
    let committee = seed_committee(&pool).await;

    live_competency(&pool, committee.chair, "Catheter handling").await;

    let staged: i64 = count(&pool, "SELECT COUNT(*) FROM competencies_stage").await;
    assert_eq!(staged, 0, "chair bypass must not create a staged row");
    let ballots: i64 = count(&pool, "SELECT COUNT(*) FROM ballots").await;
    assert_eq!(ballots, 0, "chair bypass must not create ballots");

    let live = ordering::list_competencies(&pool).await.unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].position, 1);
}

#[tokio::test]
async fn chair_submissions_get_contiguous_positions() {
    let pool = setup_db("submit-positions").await;
    let committee = seed_committee(&pool).await;

    live_competency(&pool, committee.chair, "First").await;
    live_competency(&pool, committee.chair, "Second").await;
    live_competency(&pool, committee.chair, "Third").await;

    let live = ordering::list_competencies(&pool).await.unwrap();
    let positions: Vec<i64> = live.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
}

#[tokio::test]
async fn empty_name_is_rejected() {
    let pool = setup_db("submit-empty-name").await;
    let committee = seed_committee(&pool).await;

    let result = submission::submit_competency(
        &pool,
        committee.members[0],
        &competency_draft("   ", vec![]),
    )
    .await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn dangling_tag_is_rejected() {
    let pool = setup_db("submit-bad-tag").await;
    let committee = seed_committee(&pool).await;

    let result = submission::submit_competency(
        &pool,
        committee.members[0],
        &competency_draft("Valid name", vec![uuid::Uuid::new_v4()]),
    )
    .await;
    assert!(matches!(result, Err(Error::Reference(_))));
}

#[tokio::test]
async fn unknown_proposer_is_rejected() {
    let pool = setup_db("submit-bad-proposer").await;
    seed_committee(&pool).await;

    let result = submission::submit_competency(
        &pool,
        uuid::Uuid::new_v4(),
        &competency_draft("Valid name", vec![]),
    )
    .await;
    assert!(matches!(result, Err(Error::Reference(_))));
}

#[tokio::test]
async fn staged_competency_carries_tags_and_justification() {
    let pool = setup_db("submit-tags").await;
    let committee = seed_committee(&pool).await;
    let tag = tags::create_tag(&pool, committee.chair, "IVUS").await.unwrap();

    let mut draft = competency_draft("Plaque assessment", vec![tag.id]);
    draft.justification = Some("Missing from the current catalog".to_string());
    let outcome = submission::submit_competency(&pool, committee.members[0], &draft)
        .await
        .unwrap();

    let pending = submission::list_pending_competencies(&pool, None).await.unwrap();
    assert_eq!(pending[0].proposal.id, outcome.id());
    assert_eq!(pending[0].proposal.tag_ids, vec![tag.id]);
    assert_eq!(
        pending[0].proposal.justification.as_deref(),
        Some("Missing from the current catalog")
    );
}

#[tokio::test]
async fn question_requires_live_target_competency() {
    let pool = setup_db("question-target").await;
    let committee = seed_committee(&pool).await;

    // A *staged* competency is not a valid target
    let staged = stage_competency(&pool, committee.members[0], "Still pending").await;
    let result = submission::submit_question(
        &pool,
        committee.members[1],
        &question_draft(staged, "Which finding?", 0),
    )
    .await;
    assert!(matches!(result, Err(Error::Reference(_))));
}

#[tokio::test]
async fn question_option_validation() {
    let pool = setup_db("question-options").await;
    let committee = seed_committee(&pool).await;
    let target = live_competency(&pool, committee.chair, "Target").await;

    // Only three options
    let mut three = question_draft(target, "Prompt", 0);
    three.options.pop();
    let result = submission::submit_question(&pool, committee.members[0], &three).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    // One option blank
    let mut blank = question_draft(target, "Prompt", 0);
    blank.options[2] = "   ".to_string();
    let result = submission::submit_question(&pool, committee.members[0], &blank).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    // Correct index out of range
    let out_of_range = question_draft(target, "Prompt", 4);
    let result = submission::submit_question(&pool, committee.members[0], &out_of_range).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    // Empty prompt
    let empty_prompt = question_draft(target, "  ", 0);
    let result = submission::submit_question(&pool, committee.members[0], &empty_prompt).await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn question_options_round_trip_in_order() {
    let pool = setup_db("question-roundtrip").await;
    let committee = seed_committee(&pool).await;
    let target = live_competency(&pool, committee.chair, "Target").await;

    let draft = QuestionDraft {
        competency_id: target,
        prompt: "Which layer is the intima?".to_string(),
        options: vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()],
        correct_index: 2,
    };
    submission::submit_question(&pool, committee.members[0], &draft)
        .await
        .unwrap();

    let pending = submission::list_pending_questions(&pool, None).await.unwrap();
    let options = &pending[0].proposal.options;
    assert_eq!(options.len(), 4);
    let bodies: Vec<&str> = options.iter().map(|o| o.body.as_str()).collect();
    assert_eq!(bodies, vec!["A", "B", "C", "D"]);
    let correct: Vec<bool> = options.iter().map(|o| o.is_correct).collect();
    assert_eq!(correct, vec![false, false, true, false]);
    assert_eq!(options[2].label(), 'C');
}

#[tokio::test]
async fn chair_bypass_is_equivalent_to_voted_merge() {
    let pool = setup_db("bypass-equivalence").await;
    let committee = seed_committee(&pool).await;
    let tag = tags::create_tag(&pool, committee.chair, "Imaging").await.unwrap();

    // Committee path: propose, then vote to quorum-weighted majority
    let mut draft = competency_draft("Lumen sizing", vec![tag.id]);
    draft.justification = Some("reason".to_string());
    let staged = submission::submit_competency(&pool, committee.members[0], &draft)
        .await
        .unwrap()
        .id();
    for (voter, vote) in committee.members.iter().zip([true, true, false, false]) {
        ballots::cast_ballot(&pool, staged, *voter, vote).await.unwrap();
    }

    // Chair path: same fields, submitted directly
    let chair_draft = competency_draft("Lumen sizing (chair)", vec![tag.id]);
    submission::submit_competency(&pool, committee.chair, &chair_draft)
        .await
        .unwrap();

    let live = ordering::list_competencies(&pool).await.unwrap();
    assert_eq!(live.len(), 2);
    let voted = live.iter().find(|c| c.name == "Lumen sizing").expect("voted merge");
    let direct = live.iter().find(|c| c.name == "Lumen sizing (chair)").expect("chair bypass");

    // Same live shape: difficulty, tag set, and a contiguous position each
    assert_eq!(voted.difficulty, direct.difficulty);
    assert_eq!(voted.tag_ids, direct.tag_ids);
    let mut positions = vec![voted.position, direct.position];
    positions.sort();
    assert_eq!(positions, vec![1, 2]);

    // Neither path leaves voting residue
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM ballots").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM competencies_stage").await, 0);
}
