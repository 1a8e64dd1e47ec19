// src/core/mod.rs

pub mod cancel;
pub mod fasta;
pub mod html;
pub mod sanitize;

pub use cancel::CancelToken;
