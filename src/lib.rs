//! taskpulse: a personal task tracker.
//!
//! Tasks live in three status columns and are reordered per column. The
//! service reports daily and weekly completion statistics and produces
//! productivity insights, either through a hosted text-generation API or a
//! deterministic local heuristic.

pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod insights;
pub mod models;
pub mod repository;

pub use error::{Error, Result};
