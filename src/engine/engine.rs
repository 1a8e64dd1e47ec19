// src/engine/engine.rs
use std::path::Path;

use crate::browser::Browser;
use crate::config::options::WaitOptions;
use crate::config::tasks::FormParams;
use crate::core::cancel::{self, CancelToken, Deadline};
use crate::core::fasta;
use crate::engine::types::*;
use crate::error::{Error, Result};

/// Split the input into page visits for `spec`.
/// Single-sequence forms get one visit per sequence; the others get FASTA chunks of at
/// most `max_chunk` sequences (`0` = all), numbered `seq1..` across the whole input.
pub fn page_visits<S: AsRef<str>>(
    spec: &PredictorSpec,
    seqs: &[S],
    max_chunk: usize,
    scratch_dir: &Path,
) -> Result<Vec<PageVisit>> {
    let mut visits = Vec::new();

    if !spec.multi {
        for (i, seq) in seqs.iter().enumerate() {
            let mut fields = vec![(s!(spec.seq_field), seq.as_ref().to_string())];
            if let Some(name_field) = spec.seq_name_field {
                fields.push((s!(name_field), format!("seq{}", i + 1)));
            }
            visits.push(PageVisit { first: i + 1, count: 1, fields });
        }
        return Ok(visits);
    }

    for (i, range) in fasta::chunks(seqs.len(), max_chunk).into_iter().enumerate() {
        let payload = fasta::numbered(&seqs[range.clone()], range.start + 1);
        let value = match spec.seq_format {
            SeqFormat::FastaFile => {
                std::fs::create_dir_all(scratch_dir)?;
                let path = scratch_dir.join(format!("{}_input_{i}.fa", spec.name));
                std::fs::write(&path, &payload)?;
                path.to_string_lossy().into_owned()
            }
            SeqFormat::FastaString | SeqFormat::Sequence => payload,
        };
        let mut fields = vec![(s!(spec.seq_field), value)];
        if let Some(name_field) = spec.seq_name_field {
            fields.push((s!(name_field), format!("seq{}", range.start + 1)));
        }
        visits.push(PageVisit { first: range.start + 1, count: range.len(), fields });
    }
    Ok(visits)
}

/// Load the form, fill it and press submit.
pub fn submit(
    browser: &mut dyn Browser,
    spec: &PredictorSpec,
    visit: &PageVisit,
    params: &FormParams,
) -> Result<()> {
    browser.goto(spec.url)?;

    for (name, value) in &visit.fields {
        browser.type_into(name, value)?;
    }
    for (name, value) in params.iter() {
        let n = browser.click_matching(name, value)?;
        if n == 0 {
            logd!("{}: no '{name}' control with value '{value}'", spec.name);
        }
    }
    if !browser.click(spec.submit_css)? {
        return Err(Error::automation(format!(
            "{}: submit control {} not found", spec.name, spec.submit_css
        )));
    }
    logd!("{}: submitted sequences {}..{}", spec.name, visit.first, visit.first + visit.count - 1);
    Ok(())
}

/// Poll the page until `marker` shows up and return the source that had it.
pub fn wait_for(
    browser: &mut dyn Browser,
    marker: &Marker,
    wait: &WaitOptions,
    cancel: &CancelToken,
) -> Result<String> {
    let deadline = Deadline::after(wait.timeout);
    loop {
        cancel.check()?;
        let source = browser.source()?;
        if marker.present(&source) {
            return Ok(source);
        }
        deadline.check(&marker.describe())?;
        cancel::sleep(wait.poll, cancel)?;
    }
}

/// Submit every visit in turn on one session and scrape each result page.
pub fn run_visits<T>(
    browser: &mut dyn Browser,
    spec: &PredictorSpec,
    visits: &[PageVisit],
    params: &FormParams,
    mut scrape: impl FnMut(&mut dyn Browser) -> Result<T>,
) -> Result<Vec<T>> {
    let mut out = Vec::with_capacity(visits.len());
    for visit in visits {
        submit(browser, spec, visit, params)?;
        out.push(scrape(browser)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::html::Selector;

    const MULTI: PredictorSpec = PredictorSpec {
        name: "Multi",
        url: "https://example.org/form",
        multi: true,
        seq_format: SeqFormat::FastaFile,
        seq_field: "seq",
        seq_name_field: None,
        submit_css: "input[value='Go']",
        defaults: &[],
        accepts: &[],
        marker: Marker::Element(Selector::with("table", "id", "out")),
    };

    #[test]
    fn single_sequence_forms_get_one_visit_each() {
        let spec = PredictorSpec { multi: false, seq_name_field: Some("SEQNAME"), ..MULTI };
        let visits = page_visits(&spec, &["AAA", "CCC"], 5, Path::new("/nonexistent")).unwrap();
        assert_eq!(visits.len(), 2);
        assert_eq!(visits[1].fields, vec![(s!("seq"), s!("CCC")), (s!("SEQNAME"), s!("seq2"))]);
    }

    #[test]
    fn fasta_files_are_written_per_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let visits = page_visits(&MULTI, &["AA", "CC", "DD"], 2, dir.path()).unwrap();
        assert_eq!(visits.len(), 2);
        assert_eq!((visits[1].first, visits[1].count), (3, 1));
        let second = std::fs::read_to_string(dir.path().join("Multi_input_1.fa")).unwrap();
        assert_eq!(second, ">seq3\nDD");
        assert_eq!(visits[1].fields[0].1, dir.path().join("Multi_input_1.fa").to_string_lossy());
    }
}
