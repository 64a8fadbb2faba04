//! Committee consensus workflow
//!
//! Members propose competencies and questions, vote on each other's
//! proposals, and the merge coordinator promotes a proposal into the live
//! catalog exactly once when it reaches quorum-weighted majority. Chairs
//! bypass voting, manage the tag vocabulary, and reorder the catalog.

pub mod ballots;
pub mod media;
pub mod members;
pub mod merge;
pub mod ordering;
pub mod submission;
pub mod tags;
