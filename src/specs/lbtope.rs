// src/specs/lbtope.rs
//! LBtope: results come as a plain-text dump behind a download link.
//!
//! The dump names each protein with a `>seqN` token, then lists
//! `EPITOPE SCORE PROBABILITY` lines for it.

use super::table::{ResultTable, SequenceTables};
use crate::browser::Browser;
use crate::config::options::WaitOptions;
use crate::core::cancel::CancelToken;
use crate::engine::{self, Marker, PredictorSpec, SeqFormat};
use crate::error::{Error, Result};

const DOWNLOAD_LINK: &str = "Download results as a text file";

pub const SPEC: PredictorSpec = PredictorSpec {
    name: "LBtope",
    url: "https://webs.iiitd.edu.in/raghava/lbtope/protein.php",
    multi: true,
    seq_format: SeqFormat::FastaString,
    seq_field: "seq",
    seq_name_field: None,
    submit_css: "input[value='Submit antigen for prediction']",
    defaults: &[("for", "flx")],
    accepts: &["for"],
    marker: Marker::LinkText(DOWNLOAD_LINK),
};

pub fn scrape(
    browser: &mut dyn Browser,
    wait: &WaitOptions,
    cancel: &CancelToken,
    min_probability: f64,
) -> Result<SequenceTables> {
    engine::wait_for(browser, &SPEC.marker, wait, cancel)?;
    if !browser.click_link(DOWNLOAD_LINK)? {
        return Err(Error::automation("LBtope: download link vanished"));
    }
    let dump = browser.body_text()?;
    Ok(parse_dump(&dump, min_probability))
}

#[derive(Debug)]
struct Hit {
    epitope: String,
    score: String,
    probability: f64,
}

/// Epitopes per protein, filtered and numbered.
///
/// Epitopes containing `X` are dropped. A repeated epitope keeps its first position
/// and takes the later line's values. Positions count every surviving epitope; only
/// those with probability >= `min_probability` become rows.
pub fn parse_dump(text: &str, min_probability: f64) -> SequenceTables {
    let mut proteins: Vec<(String, Vec<Hit>)> = Vec::new();

    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if let Some(id) = tokens.iter().find_map(|t| t.strip_prefix('>')) {
            proteins.push((id.to_string(), Vec::new()));
            continue;
        }
        let [ep, sc, prob] = tokens[..] else { continue };
        let (Ok(_), Ok(probability)) = (sc.parse::<f64>(), prob.parse::<f64>()) else { continue };
        let Some((_, hits)) = proteins.last_mut() else { continue };
        if ep.contains('X') {
            continue;
        }
        match hits.iter_mut().find(|h| h.epitope == ep) {
            Some(h) => {
                h.score = sc.to_string();
                h.probability = probability;
            }
            None => hits.push(Hit { epitope: ep.to_string(), score: sc.to_string(), probability }),
        }
    }

    let mut out = SequenceTables::new();
    for (id, hits) in proteins {
        let mut table = ResultTable::new(labels!["Sequence", "Position", "Score"]);
        for (i, h) in hits.iter().enumerate() {
            if h.probability >= min_probability {
                table.push_row(vec![h.epitope.clone(), (i + 1).to_string(), h.score.clone()]);
            }
        }
        out.add(id, table);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
LBtope prediction results
Protein Id : >seq1
AKTYFPHFDLSHGSAQ 0.61 90
MVLSPADKTNVKAAWG 0.33 77
GKVGAHAGEYGAEALE 0.40 78
XXLSPADKTNVKAAWG 0.99 99
SFPTTKTYFPHFDLSH 0.12 50
Protein Id : >seq2
TTKTYFPHFDLSHGSA 0.50 80
TTKTYFPHFDLSHGSA 0.55 70
";

    #[test]
    fn keeps_only_rows_at_or_above_threshold() {
        let out = parse_dump(DUMP, 78.0);
        let t = out.get("seq1").unwrap();
        assert_eq!(t.column("Sequence").unwrap(), &[s!("AKTYFPHFDLSHGSAQ"), s!("GKVGAHAGEYGAEALE")]);
        assert_eq!(t.column("Position").unwrap(), &[s!("1"), s!("3")]);
        assert_eq!(t.column("Score").unwrap(), &[s!("0.61"), s!("0.40")]);
    }

    #[test]
    fn duplicate_takes_last_values() {
        let out = parse_dump(DUMP, 78.0);
        let t = out.get("seq2").unwrap();
        assert!(t.is_empty());
        let t = parse_dump(DUMP, 60.0);
        assert_eq!(t.get("seq2").unwrap().row(0), Some(vec!["TTKTYFPHFDLSHGSA", "1", "0.55"]));
    }

    #[test]
    fn threshold_is_configurable() {
        let out = parse_dump(DUMP, 0.0);
        assert_eq!(out.get("seq1").unwrap().len(), 4);
    }
}
