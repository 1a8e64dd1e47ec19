// src/engine/mod.rs

pub mod engine;
pub mod types;

pub use engine::{page_visits, run_visits, submit, wait_for};
pub use types::{Marker, PageVisit, PredictorSpec, SeqFormat};
