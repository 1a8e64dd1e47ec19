// src/specs/toxinpred.rs
//! ToxinPred and IL4pred share one result template: `#tableTwo` under a tablesorter
//! pager whose `input.pagedisplay` reads `current/last`.

use super::table::ResultTable;
use crate::browser::Browser;
use crate::config::options::WaitOptions;
use crate::core::cancel::CancelToken;
use crate::core::html::{self, Selector};
use crate::engine::{self, Marker, PredictorSpec, SeqFormat};
use crate::error::{Error, Result};

const TABLE: Selector = Selector::with("table", "id", "tableTwo");
const PAGE_DISPLAY: &str = "input.pagedisplay";
const NEXT_PAGE: &str = "img.next";

pub const TOXINPRED: PredictorSpec = PredictorSpec {
    name: "ToxinPred",
    url: "https://webs.iiitd.edu.in/raghava/toxinpred/multi_submit.php",
    multi: true,
    seq_format: SeqFormat::FastaString,
    seq_field: "seq",
    seq_name_field: None,
    submit_css: "input[value='Run Analysis!']",
    defaults: &[("method", "8"), ("eval", "10"), ("thval", "0.0")],
    accepts: &["method", "eval", "thval"],
    marker: Marker::Element(TABLE),
};

pub const IL4PRED: PredictorSpec = PredictorSpec {
    name: "IL4pred",
    url: "https://webs.iiitd.edu.in/raghava/il4pred/predict.php",
    multi: true,
    seq_format: SeqFormat::FastaString,
    seq_field: "seq",
    seq_name_field: None,
    submit_css: "input[value='Virtual Screening']",
    defaults: &[("method", "3")],
    accepts: &["method", "thval"],
    marker: Marker::Element(TABLE),
};

pub fn scrape(
    browser: &mut dyn Browser,
    spec: &PredictorSpec,
    wait: &WaitOptions,
    cancel: &CancelToken,
) -> Result<ResultTable> {
    let source = engine::wait_for(browser, &spec.marker, wait, cancel)?;
    let mut table = parse(&source)?;

    // Bounded by the page count the pager reports.
    let mut shown = page_position(browser)?;
    let mut turned = 0usize;
    while let Some((current, last)) = shown {
        if current == last {
            break;
        }
        turned += 1;
        if turned >= last.parse().unwrap_or(0usize) || !browser.script_click(NEXT_PAGE)? {
            logw!("{}: pager stuck at {current}/{last}", spec.name);
            break;
        }
        cancel.check()?;
        shown = page_position(browser)?;
        if shown.as_ref().is_some_and(|(c, _)| *c == current) {
            logw!("{}: pager did not advance past {current}/{last}", spec.name);
            break;
        }
        table.append(&parse(&browser.source()?)?);
    }

    table.rename_score(None)?;
    Ok(table)
}

fn page_position(browser: &mut dyn Browser) -> Result<Option<(String, String)>> {
    Ok(browser
        .property(PAGE_DISPLAY, "value")?
        .and_then(|v| v.split_once('/').map(|(c, l)| (c.trim().to_string(), l.trim().to_string()))))
}

/// Header from `thead th`, visible rows from `tbody`.
pub fn parse(source: &str) -> Result<ResultTable> {
    let table = html::select(source, &TABLE).ok_or_else(|| Error::automation("tableTwo not found"))?;
    let head = html::select(table, &Selector::tag("thead"))
        .ok_or_else(|| Error::automation("tableTwo has no thead"))?;
    let labels = html::cells(head, "th");

    let body = html::select(table, &Selector::tag("tbody")).unwrap_or(table);
    let mut out = ResultTable::new(labels);
    for row in html::rows(body, "td") {
        out.push_row(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<table id="tableTwo" class="tablesorter">
<thead><tr><th>Peptide ID</th><th>Peptide Sequence</th><th>SVM Score</th><th>Prediction</th></tr></thead>
<tbody>
<tr><td>seq1</td><td>KVGAHAGEYGAEALER</td><td>-0.52</td><td>Non-Toxin</td></tr>
<tr><td>seq2</td><td>SFPTTKTYFPHFDLSH</td><td>0.13</td><td>Toxin</td></tr>
<tr style="display: none;"><td>seq3</td><td>GSAQVKGHG</td><td>-1.02</td><td>Non-Toxin</td></tr>
</tbody></table>
<input type="text" class="pagedisplay" value="1/2">"#;

    #[test]
    fn reads_visible_rows_only() {
        let t = parse(PAGE).unwrap();
        assert_eq!(t.labels(), vec!["Peptide ID", "Peptide Sequence", "SVM Score", "Prediction"]);
        assert_eq!(t.len(), 2);
        assert!(t.is_rectangular());
    }

    #[test]
    fn score_column_is_normalized() {
        let mut t = parse(PAGE).unwrap();
        t.rename_score(None).unwrap();
        assert_eq!(t.scores().unwrap(), vec![-0.52, 0.13]);
    }

    #[test]
    fn il4pred_shares_the_marker() {
        assert!(IL4PRED.marker.present(PAGE));
        assert!(TOXINPRED.marker.present(PAGE));
    }
}
