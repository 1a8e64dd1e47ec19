// src/specs/toxinpred2.rs
//! ToxinPred2 and AlgPred2 batch pages: a single `table[border='1']`, no pagination.
//! ToxinPred2 wraps its header labels in `<b>`, AlgPred2 uses plain `th`.

use super::table::ResultTable;
use crate::browser::Browser;
use crate::config::options::WaitOptions;
use crate::core::cancel::CancelToken;
use crate::core::html::{self, Selector};
use crate::engine::{self, Marker, PredictorSpec, SeqFormat};
use crate::error::{Error, Result};

const TABLE: Selector = Selector::with("table", "border", "1");
const TABLE_MARKER: Marker = Marker::Element(TABLE);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderCell {
    Bold,
    Th,
}

impl HeaderCell {
    fn tag(self) -> &'static str {
        match self {
            HeaderCell::Bold => "b",
            HeaderCell::Th => "th",
        }
    }
}

pub const TOXINPRED2: PredictorSpec = PredictorSpec {
    name: "ToxinPred2",
    url: "https://webs.iiitd.edu.in/raghava/toxinpred2/batch.html",
    multi: true,
    seq_format: SeqFormat::FastaString,
    seq_field: "seq",
    seq_name_field: None,
    submit_css: "input[value='Submit']",
    defaults: &[("terminus", "4"), ("svm_th", "0.6")],
    accepts: &["terminus", "svm_th"],
    marker: TABLE_MARKER,
};

pub const ALGPRED2: PredictorSpec = PredictorSpec {
    name: "AlgPred2",
    url: "https://webs.iiitd.edu.in/raghava/algpred2/batch.html",
    defaults: &[("terminus", "4"), ("svm_th", "0.3")],
    ..TOXINPRED2
};

pub fn scrape(
    browser: &mut dyn Browser,
    header: HeaderCell,
    wait: &WaitOptions,
    cancel: &CancelToken,
) -> Result<ResultTable> {
    let source = engine::wait_for(browser, &TABLE_MARKER, wait, cancel)?;
    let mut table = parse(&source, header)?;
    table.rename_score(None)?;
    Ok(table)
}

pub fn parse(source: &str, header: HeaderCell) -> Result<ResultTable> {
    let table = html::select(source, &TABLE).ok_or_else(|| Error::automation("result table not found"))?;
    let head = html::select(table, &Selector::tag("thead"))
        .ok_or_else(|| Error::automation("result table has no thead"))?;
    let labels = html::cells(head, header.tag());

    let body = html::select(table, &Selector::tag("tbody"))
        .ok_or_else(|| Error::automation("result table has no tbody"))?;
    let mut out = ResultTable::new(labels);
    for row in html::rows(body, "td") {
        out.push_row(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOXIN2: &str = r#"<table border="1" class="table">
<thead><tr><th><b>Seq ID</b></th><th><b>Sequence</b></th><th><b>ML Score</b></th><th><b>Hybrid Score</b></th><th><b>Prediction</b></th></tr></thead>
<tbody><tr><td>seq1</td><td>KVGAHAGEYGAEALER</td><td>0.31</td><td>0.31</td><td>Non-Toxin</td></tr></tbody>
</table>"#;

    const ALG2: &str = r#"<table border='1'>
<thead><tr><th>Seq ID</th><th>Sequence</th><th>Score</th><th>Prediction</th></tr></thead>
<tbody><tr><td>seq1</td><td>AAAA</td><td>0.12</td><td>Non-Allergen</td></tr>
<tr><td>seq2</td><td>CCCC</td><td>0.48</td><td>Allergen</td></tr></tbody>
</table>"#;

    #[test]
    fn toxinpred2_reads_bold_headers() {
        let mut t = parse(TOXIN2, HeaderCell::Bold).unwrap();
        assert_eq!(t.labels().len(), 5);
        t.rename_score(None).unwrap();
        assert_eq!(t.labels()[3], "Score");
        assert_eq!(t.scores().unwrap(), vec![0.31]);
    }

    #[test]
    fn algpred2_reads_th_headers() {
        let mut t = parse(ALG2, HeaderCell::Th).unwrap();
        t.rename_score(None).unwrap();
        assert_eq!(t.scores().unwrap(), vec![0.12, 0.48]);
    }

    #[test]
    fn defaults_differ_only_in_threshold() {
        assert_eq!(ALGPRED2.submit_css, TOXINPRED2.submit_css);
        assert_eq!(ALGPRED2.defaults[1], ("svm_th", "0.3"));
    }
}
