// src/specs/abcpred.rs
//! ABCpred: linear B-cell epitopes, one sequence per submission.
//!
//! The result page has two tables sharing a malformed `width` attribute: the first
//! names the submitted sequence, the second lists the epitopes with a header row of
//! `td` cells (`Rank`, `Sequence`, `Start position`, `Score`).

use super::table::{ResultTable, SequenceTables};
use crate::browser::Browser;
use crate::config::options::WaitOptions;
use crate::core::cancel::CancelToken;
use crate::core::html::{self, Selector};
use crate::engine::{self, Marker, PredictorSpec, SeqFormat};
use crate::error::{Error, Result};

const HEADER_TABLE: Selector = Selector::with("table", "width", "60% bgcolor=");
const RESULT_TABLE: Selector = Selector::with("table", "width", "75% bgcolor=");

pub const SPEC: PredictorSpec = PredictorSpec {
    name: "ABCpred",
    url: "https://webs.iiitd.edu.in/raghava/abcpred/ABC_submission.html",
    multi: false,
    seq_format: SeqFormat::Sequence,
    seq_field: "SEQ",
    seq_name_field: Some("SEQNAME"),
    submit_css: "input[value='Submit sequence']",
    defaults: &[("window", "16"), ("filter", "on"), ("Threshold", "0.51")],
    accepts: &["window", "filter", "Threshold"],
    marker: Marker::Element(HEADER_TABLE),
};

pub fn scrape(browser: &mut dyn Browser, wait: &WaitOptions, cancel: &CancelToken) -> Result<SequenceTables> {
    let source = engine::wait_for(browser, &SPEC.marker, wait, cancel)?;
    let (name, table) = parse(&source)?;
    logd!("ABCpred: {} epitopes for {name}", table.len());
    let mut out = SequenceTables::new();
    out.add(name, table);
    Ok(out)
}

/// Sequence name and epitope table from a result page.
pub fn parse(source: &str) -> Result<(String, ResultTable)> {
    let header = html::select(source, &HEADER_TABLE)
        .ok_or_else(|| Error::automation("ABCpred: sequence header table not found"))?;
    let name = sequence_name(header)
        .ok_or_else(|| Error::automation("ABCpred: no 'Sequence name' in header table"))?;

    let results = html::select(source, &RESULT_TABLE)
        .ok_or_else(|| Error::automation("ABCpred: result table not found"))?;
    let body = html::select(results, &Selector::tag("tbody")).unwrap_or(results);

    let mut rows = html::rows(body, "td").into_iter();
    let labels = rows
        .next()
        .ok_or_else(|| Error::automation("ABCpred: result table has no header row"))?;

    let mut table = ResultTable::new(labels);
    for row in rows {
        table.push_row(row);
    }
    table.rename("Start position", "Position");
    Ok((name, table))
}

fn sequence_name(header_table: &str) -> Option<String> {
    html::rows(header_table, "td").into_iter().find_map(|cells| {
        let line = cells.join(" ");
        let at = line.find("Sequence name")?;
        line[at + "Sequence name".len()..]
            .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
            .split_whitespace()
            .next()
            .map(String::from)
    })
}
