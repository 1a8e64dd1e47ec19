// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod browser;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod specs;

pub mod csv;
pub mod file;
pub mod pool;
pub mod progress;
pub mod regions;
pub mod runner;
pub mod vaxign;

pub use error::{Error, Result};
