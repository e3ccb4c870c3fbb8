//! State module for tracking worker progress
//!
//! # Components
//!
//! - `WorkerState`: The per-task cycle a worker moves through (idle, delaying,
//!   fetching, extracting, reporting)

mod worker_state;

pub use worker_state::WorkerState;
