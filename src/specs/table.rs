// src/specs/table.rs
use crate::error::{Error, Result};

pub const SCORE: &str = "Score";

/// Column-oriented result table. Every column always holds the same number of values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultTable {
    columns: Vec<(String, Vec<String>)>,
}

impl ResultTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { columns: labels.into_iter().map(|l| (l, Vec::new())).collect() }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|(l, _)| l.as_str()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |(_, v)| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one row. Short rows are padded with `""`; surplus cells are dropped.
    pub fn push_row(&mut self, cells: Vec<String>) {
        let mut cells = cells.into_iter();
        for (_, col) in &mut self.columns {
            col.push(cells.next().unwrap_or_default());
        }
    }

    pub fn column(&self, label: &str) -> Option<&[String]> {
        self.columns.iter().find(|(l, _)| l == label).map(|(_, v)| v.as_slice())
    }

    pub fn row(&self, i: usize) -> Option<Vec<&str>> {
        (i < self.len()).then(|| self.columns.iter().map(|(_, v)| v[i].as_str()).collect())
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        (0..self.len())
            .map(|i| self.columns.iter().map(|(_, v)| v[i].clone()).collect())
            .collect()
    }

    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.columns.iter_mut().find(|(l, _)| l == from) {
            Some((l, _)) => {
                *l = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Append the rows of `other`, matching columns by label.
    /// Labels missing from `other` get `""`.
    pub fn append(&mut self, other: &ResultTable) {
        if self.columns.is_empty() {
            *self = other.clone();
            return;
        }
        let n = other.len();
        for (label, col) in &mut self.columns {
            match other.column(label) {
                Some(src) => col.extend_from_slice(src),
                None => col.extend(std::iter::repeat_n(s!(), n)),
            }
        }
    }

    /// Rename the score column to `Score`: the column named `exact` if given, otherwise
    /// the last one whose label contains "score" in any case. A different column
    /// already named `Score` is dropped.
    pub fn rename_score(&mut self, exact: Option<&str>) -> Result<()> {
        let pick = match exact {
            Some(name) => self.columns.iter().position(|(l, _)| l == name),
            None => self.columns.iter().rposition(|(l, _)| l.to_lowercase().contains("score")),
        };
        let Some(idx) = pick else {
            return Err(Error::MissingScoreColumn(self.labels().into_iter().map(String::from).collect()));
        };
        if let Some(old) = self.columns.iter().position(|(l, _)| l == SCORE) {
            if old != idx {
                self.columns.remove(old);
                let idx = if old < idx { idx - 1 } else { idx };
                self.columns[idx].0 = s!(SCORE);
                return Ok(());
            }
        }
        self.columns[idx].0 = s!(SCORE);
        Ok(())
    }

    /// Keep only the `Score` column as numbers. Cells that don't parse become NaN.
    pub fn scores(&self) -> Result<Vec<f64>> {
        let col = self
            .column(SCORE)
            .ok_or_else(|| Error::MissingScoreColumn(self.labels().into_iter().map(String::from).collect()))?;
        Ok(col
            .iter()
            .map(|c| {
                c.trim().parse::<f64>().unwrap_or_else(|_| {
                    logw!("Non-numeric score '{c}' recorded as NaN");
                    f64::NAN
                })
            })
            .collect())
    }

    pub fn is_rectangular(&self) -> bool {
        let n = self.len();
        self.columns.iter().all(|(_, v)| v.len() == n)
    }
}

/// Result tables keyed by input sequence name, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceTables(Vec<(String, ResultTable)>);

impl SequenceTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rows for `name`, appending to an existing table of that name.
    pub fn add(&mut self, name: impl Into<String>, table: ResultTable) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, t)) => t.append(&table),
            None => self.0.push((name, table)),
        }
    }

    pub fn merge(&mut self, other: SequenceTables) {
        for (name, table) in other.0 {
            self.add(name, table);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ResultTable> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultTable)> {
        self.0.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
