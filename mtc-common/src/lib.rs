//! # MTC Common Library
//!
//! Shared code for the medical-training catalog services including:
//! - Database initialization and models
//! - Error taxonomy
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
