// src/core/fasta.rs
use std::ops::Range;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// First token of the header line.
    pub id: String,
    /// Rest of the header line, possibly empty.
    pub description: String,
    pub seq: String,
}

impl Record {
    pub fn new(id: impl Into<String>, seq: impl Into<String>) -> Self {
        Self { id: id.into(), description: s!(), seq: seq.into() }
    }
}

/// Parse FASTA text. Sequence lines are concatenated with whitespace removed.
/// Non-blank text before the first header is an error.
pub fn parse(text: &str) -> Result<Vec<Record>> {
    let mut out: Vec<Record> = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if let Some(header) = line.strip_prefix('>') {
            let header = header.trim();
            let (id, description) = match header.split_once(char::is_whitespace) {
                Some((id, rest)) => (id.to_string(), rest.trim().to_string()),
                None => (header.to_string(), s!()),
            };
            out.push(Record { id, description, seq: s!() });
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(rec) => rec.seq.extend(line.chars().filter(|c| !c.is_whitespace())),
            None => {
                return Err(Error::Parse(format!("line {}: sequence data before the first header", n + 1)));
            }
        }
    }
    Ok(out)
}

pub fn read(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

/// Records as FASTA text, one sequence line each.
pub fn to_fasta(records: &[Record]) -> String {
    let mut out = s!();
    for r in records {
        out.push('>');
        out.push_str(&r.id);
        if !r.description.is_empty() {
            out.push(' ');
            out.push_str(&r.description);
        }
        out.push('\n');
        out.push_str(&r.seq);
        out.push('\n');
    }
    out
}

/// FASTA payload with generated headers `>seq<N>`, `N` counting from `first`.
/// No trailing newline, which is what the form text areas receive.
pub fn numbered<S: AsRef<str>>(seqs: &[S], first: usize) -> String {
    seqs.iter()
        .enumerate()
        .map(|(i, s)| format!(">seq{}\n{}", first + i, s.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `0..n` into consecutive ranges of at most `max_chunk` items.
/// `max_chunk == 0` puts everything in one range.
pub fn chunks(n: usize, max_chunk: usize) -> Vec<Range<usize>> {
    if n == 0 {
        return Vec::new();
    }
    let size = if max_chunk == 0 { n } else { max_chunk };
    (0..n).step_by(size).map(|a| a..(a + size).min(n)).collect()
}
