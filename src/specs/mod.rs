// src/specs/mod.rs
//! # Predictor specs
//!
//! One module per remote predictor. Each encodes *where the form lives*, *which
//! fields it takes* and *how to read the result page*.
//!
//! ## What lives here
//! - A `const SPEC: PredictorSpec` per predictor: endpoint, sequence field, submit
//!   control, default form values and the marker that shows results have rendered.
//! - **Pure parsing** of result pages from their serialized source (`parse_*`), built on
//!   `core::html` helpers, plus the thin `scrape` loop that waits and walks pagination.
//! - [`Software`], the closed set of supported predictors, and [`table`], the common
//!   column-oriented result shape.
//!
//! ## What does **not** live here
//! - Worker threads and fan-in (`pool`, `runner`).
//! - Browser sessions (`browser`); specs only drive the [`Browser`] they are handed.
//!
//! ## Conventions & invariants
//! - Every scraper converges on a [`ResultTable`] whose columns have equal length.
//! - Evaluators end with a `Score` column (`ResultTable::rename_score`).
//! - Only visible rows are read; pagers hide the rest with `display: none`.
//! - Parsers are testable offline against captured pages.

pub mod abcpred;
pub mod ifnepitope;
pub mod il10pred;
pub mod lbtope;
pub mod table;
pub mod toxinpred;
pub mod toxinpred2;

use std::fmt;
use std::str::FromStr;

use crate::browser::Browser;
use crate::config::options::RunOptions;
use crate::config::tasks::Task;
use crate::core::cancel::CancelToken;
use crate::engine::{self, PredictorSpec};
use crate::error::{Error, Result};

pub use table::{ResultTable, SequenceTables, SCORE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Selection,
    Evaluation,
}

impl Stage {
    pub fn noun(&self) -> &'static str {
        match self {
            Stage::Selection => "selector",
            Stage::Evaluation => "evaluator",
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Software {
    ABCpred,
    LBtope,
    ToxinPred,
    ToxinPred2,
    AlgPred2,
    IL4pred,
    IL10pred,
    IFNepitope,
}

impl Software {
    pub const ALL: [Software; 8] = [
        Software::ABCpred,
        Software::LBtope,
        Software::ToxinPred,
        Software::ToxinPred2,
        Software::AlgPred2,
        Software::IL4pred,
        Software::IL10pred,
        Software::IFNepitope,
    ];

    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn stage(&self) -> Stage {
        match self {
            Software::ABCpred | Software::LBtope => Stage::Selection,
            _ => Stage::Evaluation,
        }
    }

    pub fn spec(&self) -> &'static PredictorSpec {
        match self {
            Software::ABCpred => &abcpred::SPEC,
            Software::LBtope => &lbtope::SPEC,
            Software::ToxinPred => &toxinpred::TOXINPRED,
            Software::IL4pred => &toxinpred::IL4PRED,
            Software::ToxinPred2 => &toxinpred2::TOXINPRED2,
            Software::AlgPred2 => &toxinpred2::ALGPRED2,
            Software::IL10pred => &il10pred::SPEC,
            Software::IFNepitope => &ifnepitope::SPEC,
        }
    }
}

impl fmt::Display for Software {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Software {
    type Err = Error;

    /// Case-insensitive; unknown names are an error rather than skipped.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Software::ALL
            .into_iter()
            .find(|sw| sw.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownSoftware(s.to_string()))
    }
}

/// Run a selection task on `browser`: per input sequence, the epitopes found.
pub fn select(
    task: &Task,
    browser: &mut dyn Browser,
    seqs: &[String],
    opts: &RunOptions,
    cancel: &CancelToken,
) -> Result<SequenceTables> {
    let spec = task.software.spec();
    let visits = engine::page_visits(spec, seqs, opts.max_chunk, &opts.scratch_dir.join(&task.name))?;
    let wait = &opts.wait;

    let pages = engine::run_visits(browser, spec, &visits, &task.params, |b| match task.software {
        Software::ABCpred => abcpred::scrape(b, wait, cancel),
        Software::LBtope => lbtope::scrape(b, wait, cancel, task.min_probability),
        other => Err(Error::Validation(vec![format!("{other} is not a selector")])),
    })?;

    let mut out = SequenceTables::new();
    for page in pages {
        out.merge(page);
    }
    Ok(out)
}

/// Run an evaluation task on `browser`: one row per input sequence, with a `Score` column.
pub fn evaluate(
    task: &Task,
    browser: &mut dyn Browser,
    seqs: &[String],
    opts: &RunOptions,
    cancel: &CancelToken,
) -> Result<ResultTable> {
    let spec = task.software.spec();
    let visits = engine::page_visits(spec, seqs, opts.max_chunk, &opts.scratch_dir.join(&task.name))?;
    let wait = &opts.wait;

    let pages = engine::run_visits(browser, spec, &visits, &task.params, |b| match task.software {
        Software::ToxinPred | Software::IL4pred => toxinpred::scrape(b, spec, wait, cancel),
        Software::ToxinPred2 => toxinpred2::scrape(b, toxinpred2::HeaderCell::Bold, wait, cancel),
        Software::AlgPred2 => toxinpred2::scrape(b, toxinpred2::HeaderCell::Th, wait, cancel),
        Software::IL10pred => il10pred::scrape(b, wait, cancel),
        Software::IFNepitope => ifnepitope::scrape(b, wait, cancel),
        other => Err(Error::Validation(vec![format!("{other} is not an evaluator")])),
    })?;

    let mut out = ResultTable::default();
    for page in &pages {
        out.append(page);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_names_parse_case_insensitively() {
        assert_eq!("abcpred".parse::<Software>().unwrap(), Software::ABCpred);
        assert_eq!(" IL10pred ".parse::<Software>().unwrap(), Software::IL10pred);
        assert!(matches!("BepiPred".parse::<Software>(), Err(Error::UnknownSoftware(n)) if n == "BepiPred"));
    }

    #[test]
    fn every_spec_is_named_after_its_software() {
        for sw in Software::ALL {
            assert_eq!(sw.to_string(), sw.spec().name);
            for (k, _) in sw.spec().defaults {
                assert!(sw.spec().accepts.contains(k), "{sw}: default {k} not accepted");
            }
        }
    }

    #[test]
    fn only_two_selectors() {
        let sel: Vec<_> = Software::ALL.into_iter().filter(|s| s.stage() == Stage::Selection).collect();
        assert_eq!(sel, vec![Software::ABCpred, Software::LBtope]);
    }
}
