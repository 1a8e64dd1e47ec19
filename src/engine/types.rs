// src/engine/types.rs
use crate::core::html::{self, Selector};

/// How a predictor wants its sequences delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeqFormat {
    /// Raw residues, one sequence per visit.
    Sequence,
    /// FASTA text typed into a text area.
    FastaString,
    /// Path to a FASTA file given to a file input.
    FastaFile,
}

/// What shows that a result page has rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Element(Selector),
    LinkText(&'static str),
}

impl Marker {
    pub fn present(&self, source: &str) -> bool {
        match self {
            Marker::Element(sel) => html::exists(source, sel),
            Marker::LinkText(t) => html::has_link_text(source, t),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Marker::Element(sel) => match sel.attr {
                Some((n, v)) => format!("{}[{n}='{v}']", sel.tag),
                None => s!(sel.tag),
            },
            Marker::LinkText(t) => format!("link \"{t}\""),
        }
    }
}

/// Static description of one predictor's submission form.
#[derive(Debug)]
pub struct PredictorSpec {
    pub name: &'static str,
    pub url: &'static str,
    /// Accepts several sequences per visit.
    pub multi: bool,
    pub seq_format: SeqFormat,
    pub seq_field: &'static str,
    /// Field that receives `seq<N>` alongside the sequence.
    pub seq_name_field: Option<&'static str>,
    pub submit_css: &'static str,
    pub defaults: &'static [(&'static str, &'static str)],
    /// Every form field a task may set.
    pub accepts: &'static [&'static str],
    pub marker: Marker,
}

/// Values to type into named fields on one page load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageVisit {
    /// Global 1-based number of the first sequence in this visit.
    pub first: usize,
    pub count: usize,
    pub fields: Vec<(String, String)>,
}
