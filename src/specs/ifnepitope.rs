// src/specs/ifnepitope.rs
//! IFNepitope: DataTables listing with fixed columns, paged by
//! `a.paginate_enabled_next` while that link is enabled.

use super::table::ResultTable;
use crate::browser::Browser;
use crate::config::options::WaitOptions;
use crate::core::cancel::CancelToken;
use crate::core::html::{self, Selector};
use crate::engine::{self, Marker, PredictorSpec, SeqFormat};
use crate::error::{Error, Result};

const TABLE: Selector = Selector::with("table", "id", "example");
const NEXT: Selector = Selector::with("a", "class", "paginate_enabled_next");
const NEXT_CSS: &str = "a[class='paginate_enabled_next']";

pub const COLUMNS: [&str; 6] = ["N0", "Name", "Epitope", "Method", "Result", "Score"];

pub const SPEC: PredictorSpec = PredictorSpec {
    name: "IFNepitope",
    url: "https://webs.iiitd.edu.in/raghava/ifnepitope/predict.php",
    multi: true,
    seq_format: SeqFormat::FastaString,
    seq_field: "sequence",
    seq_name_field: None,
    submit_css: "input[value='Submit Peptides for Prediction']",
    defaults: &[("method", "svm")],
    accepts: &["method"],
    marker: Marker::Element(TABLE),
};

pub fn scrape(browser: &mut dyn Browser, wait: &WaitOptions, cancel: &CancelToken) -> Result<ResultTable> {
    let mut source = engine::wait_for(browser, &SPEC.marker, wait, cancel)?;
    let mut table = parse(&source)?;

    while html::exists(&source, &NEXT) {
        cancel.check()?;
        if !browser.click(NEXT_CSS)? {
            break;
        }
        let next = browser.source()?;
        if next == source {
            logw!("IFNepitope: pager did not advance");
            break;
        }
        source = next;
        table.append(&parse(&source)?);
    }

    table.rename_score(None)?;
    Ok(table)
}

/// Every visible row with `td` cells; header rows use `th` and are skipped.
pub fn parse(source: &str) -> Result<ResultTable> {
    let table = html::select(source, &TABLE).ok_or_else(|| Error::automation("IFNepitope table not found"))?;
    let mut out = ResultTable::new(COLUMNS.iter().map(|c| s!(*c)).collect());
    for row in html::rows(table, "td") {
        out.push_row(row);
    }
    Ok(out)
}
