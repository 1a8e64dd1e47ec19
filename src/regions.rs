// src/regions.rs
//! Output shapes built from dispatcher results.
//!
//! Selectors report epitopes per submitted sequence; each becomes a named region
//! `<task>_ROI_<start>-<end>` on the input record it came from. Evaluators report
//! one score per input sequence, in submission order, and are laid side by side.

use crate::core::fasta::Record;
use crate::runner::ScoreIndex;
use crate::specs::{SequenceTables, Software, SCORE};

pub const REGION_HEADERS: [&str; 8] = ["Name", "Task", "Software", "Sequence", "Start", "End", "Epitope", "Score"];

#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub name: String,
    pub task: String,
    pub software: Software,
    /// Id of the input record the epitope lies on.
    pub sequence: String,
    pub start: usize,
    pub end: usize,
    pub epitope: String,
    pub score: f64,
}

impl Region {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.task.clone(),
            self.software.to_string(),
            self.sequence.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.epitope.clone(),
            self.score.to_string(),
        ]
    }
}

/// Map a reported sequence name back to an input record id.
/// `seqN` is the N-th record; anything else is taken as an id already.
pub fn record_id(name: &str, records: &[Record]) -> String {
    name.strip_prefix("seq")
        .and_then(|n| n.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| records.get(i))
        .map(|r| r.id.clone())
        .unwrap_or_else(|| name.to_string())
}

/// Regions of one selector task.
pub fn task_regions(task: &str, software: Software, tables: &SequenceTables, records: &[Record]) -> Vec<Region> {
    let mut out = Vec::new();
    for (seq_name, table) in tables.iter() {
        let (Some(epitopes), Some(positions)) = (table.column("Sequence"), table.column("Position")) else {
            logw!("{task}: result for {seq_name} lacks Sequence/Position columns");
            continue;
        };
        let scores = table.column(SCORE);
        let sequence = record_id(seq_name, records);

        for (i, (epitope, pos)) in epitopes.iter().zip(positions).enumerate() {
            let Ok(start) = pos.trim().parse::<usize>() else {
                logw!("{task}: skipping epitope {epitope} with position '{pos}'");
                continue;
            };
            let end = start + epitope.chars().count();
            let score = scores
                .and_then(|c| c.get(i))
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(f64::NAN);
            out.push(Region {
                name: format!("{task}_ROI_{start}-{end}"),
                task: task.to_string(),
                software,
                sequence: sequence.clone(),
                start,
                end,
                epitope: epitope.clone(),
                score,
            });
        }
    }
    out
}

/// Regions of every successful selector task, in task order.
pub fn regions(index: &ScoreIndex<SequenceTables>, records: &[Record]) -> Vec<Region> {
    index
        .entries
        .iter()
        .flat_map(|((task, sw), tables)| task_regions(task, *sw, tables, records))
        .collect()
}

/// One row per input record, one score column per evaluation task.
/// Scores attach by position; a short score list leaves trailing cells empty.
pub fn evaluation_rows(index: &ScoreIndex<Vec<f64>>, records: &[Record]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = labels!["Sequence"];
    headers.extend(index.entries.iter().map(|((task, _), _)| task.clone()));

    let rows = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut row = vec![r.id.clone()];
            row.extend(
                index.entries.iter().map(|(_, scores)| scores.get(i).map(f64::to_string).unwrap_or_default()),
            );
            row
        })
        .collect();
    (headers, rows)
}
