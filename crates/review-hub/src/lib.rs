//! Case study review hub.
//!
//! Reviewers are assigned generated case studies they have not yet seen, submit a score with
//! structured feedback, and the team reads aggregate summaries built from the stored evaluations.

pub mod config;
pub mod error;
pub mod storage;
pub mod telemetry;
pub mod workflows;
