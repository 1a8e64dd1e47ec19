// src/specs/il10pred.rs
//! IL10pred: bootstrap table paged by `li.page-next > a` until the last page drops
//! the `page-next` item.

use super::table::ResultTable;
use crate::browser::Browser;
use crate::config::options::WaitOptions;
use crate::core::cancel::CancelToken;
use crate::core::html::{self, Selector};
use crate::engine::{self, Marker, PredictorSpec, SeqFormat};
use crate::error::{Error, Result};

const TABLE: Selector = Selector::with("table", "class", "table table-hover");
const NEXT_ITEM: Selector = Selector::with("li", "class", "page-next");
const NEXT_LINK: &str = "li[class='page-next'] > a";

pub const SPEC: PredictorSpec = PredictorSpec {
    name: "IL10pred",
    url: "https://webs.iiitd.edu.in/raghava/il10pred/predict3.php",
    multi: true,
    seq_format: SeqFormat::FastaString,
    seq_field: "seq",
    seq_name_field: None,
    submit_css: "input[value='Run Analysis!']",
    defaults: &[("method", "1")],
    accepts: &["method", "thval"],
    marker: Marker::Element(TABLE),
};

pub fn scrape(browser: &mut dyn Browser, wait: &WaitOptions, cancel: &CancelToken) -> Result<ResultTable> {
    let mut source = engine::wait_for(browser, &SPEC.marker, wait, cancel)?;
    let mut table = parse(&source)?;

    while html::exists(&source, &NEXT_ITEM) {
        cancel.check()?;
        if !browser.click(NEXT_LINK)? {
            break;
        }
        let next = browser.source()?;
        if next == source {
            logw!("IL10pred: pager did not advance");
            break;
        }
        source = next;
        table.append(&parse(&source)?);
    }

    table.rename_score(None)?;
    Ok(table)
}

pub fn parse(source: &str) -> Result<ResultTable> {
    let table = html::select(source, &TABLE).ok_or_else(|| Error::automation("IL10pred table not found"))?;
    let head = html::select(table, &Selector::tag("thead"))
        .ok_or_else(|| Error::automation("IL10pred table has no thead"))?;
    let body = html::select(table, &Selector::tag("tbody"))
        .ok_or_else(|| Error::automation("IL10pred table has no tbody"))?;

    let mut out = ResultTable::new(html::cells(head, "th"));
    for row in html::rows(body, "td") {
        out.push_row(row);
    }
    Ok(out)
}
