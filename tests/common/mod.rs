// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use immuno_scrape::browser::{Browser, Launcher};
use immuno_scrape::core::html;
use immuno_scrape::Result;

/// What one form submission carried.
#[derive(Clone, Debug, Default)]
pub struct Submission {
    pub url: String,
    pub typed: Vec<(String, String)>,
    pub clicked: Vec<(String, String)>,
    /// Link text followed after the result page, if any.
    pub link: Option<String>,
}

impl Submission {
    pub fn typed(&self, name: &str) -> Option<&str> {
        self.typed.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn clicked(&self, name: &str) -> Option<&str> {
        self.clicked.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }
}

pub type Responder = dyn Fn(&Submission) -> String + Send + Sync;

/// Serves pages from a responder instead of the network and keeps count of sessions.
pub struct ScriptedLauncher {
    responder: Arc<Responder>,
    pub submissions: Arc<Mutex<Vec<Submission>>>,
    pub launches: AtomicUsize,
    active: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl ScriptedLauncher {
    pub fn new(responder: impl Fn(&Submission) -> String + Send + Sync + 'static) -> Self {
        Self {
            responder: Arc::new(responder),
            submissions: Arc::default(),
            launches: AtomicUsize::new(0),
            active: Arc::default(),
            peak: Arc::default(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

impl Launcher for ScriptedLauncher {
    fn launch(&self) -> Result<Box<dyn Browser>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(ScriptedBrowser {
            responder: self.responder.clone(),
            submissions: self.submissions.clone(),
            active: self.active.clone(),
            delay: self.delay,
            pending: Submission::default(),
            page: String::new(),
            open: true,
        }))
    }
}

pub struct ScriptedBrowser {
    responder: Arc<Responder>,
    submissions: Arc<Mutex<Vec<Submission>>>,
    active: Arc<AtomicUsize>,
    delay: Duration,
    pending: Submission,
    page: String,
    open: bool,
}

impl Browser for ScriptedBrowser {
    fn goto(&mut self, url: &str) -> Result<()> {
        self.pending = Submission { url: url.to_string(), ..Default::default() };
        self.page = String::from("<form></form>");
        Ok(())
    }

    fn source(&mut self) -> Result<String> {
        Ok(self.page.clone())
    }

    fn body_text(&mut self) -> Result<String> {
        // Plain-text downloads keep their line breaks.
        if self.page.starts_with('<') { Ok(html::text(&self.page)) } else { Ok(self.page.clone()) }
    }

    fn type_into(&mut self, name: &str, value: &str) -> Result<()> {
        self.pending.typed.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn click_matching(&mut self, name: &str, value: &str) -> Result<usize> {
        self.pending.clicked.push((name.to_string(), value.to_string()));
        Ok(1)
    }

    fn click(&mut self, _css: &str) -> Result<bool> {
        std::thread::sleep(self.delay);
        self.page = (self.responder)(&self.pending);
        self.submissions.lock().unwrap().push(self.pending.clone());
        Ok(true)
    }

    fn script_click(&mut self, _css: &str) -> Result<bool> {
        Ok(false)
    }

    fn click_link(&mut self, text: &str) -> Result<bool> {
        if !html::has_link_text(&self.page, text) {
            return Ok(false);
        }
        let follow = Submission { link: Some(text.to_string()), ..self.pending.clone() };
        self.page = (self.responder)(&follow);
        Ok(true)
    }

    fn property(&mut self, _css: &str, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn quit(&mut self) -> Result<()> {
        if std::mem::take(&mut self.open) {
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// `(id, sequence)` pairs of a `>seqN` FASTA payload.
pub fn fasta_pairs(payload: &str) -> Vec<(String, String)> {
    immuno_scrape::core::fasta::parse(payload)
        .unwrap()
        .into_iter()
        .map(|r| (r.id, r.seq))
        .collect()
}

pub const HBA: &str = "MVLSPADKTNVKAAWGKVGAHAGEYGAEALERMFLSFPTTKTYFPHFDLSHGSAQVKGHG";
pub const HBB: &str = "MVHLTPEEKSAVTALWGKVNVDEVGGEALGRLLVVYPWTQRFFESFGDLSTPDAVMGNPKVKAHGKKVLGAFSDGLAHLDNLKGTFATLSELHCDKLHVDPENFRLLGNVLVCVLAHHFGKEFTPPVQAAYQKVVAGVANALAHKYH";
pub const INS: &str = "FVNQHLCGSHLVEALYLVCGERGFFYTPKT";

/// Serves a fixed run of result pages. Any click counts as "next page" and moves
/// one page on, unless the pager is jammed. `property` reports `current/last`.
pub struct PagedBrowser {
    pages: Vec<String>,
    at: usize,
    jammed: bool,
    pub turns: usize,
}

impl PagedBrowser {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages, at: 0, jammed: false, turns: 0 }
    }

    pub fn jammed(mut self) -> Self {
        self.jammed = true;
        self
    }

    fn turn(&mut self) -> bool {
        self.turns += 1;
        if !self.jammed && self.at + 1 < self.pages.len() {
            self.at += 1;
        }
        true
    }
}

impl Browser for PagedBrowser {
    fn goto(&mut self, _url: &str) -> Result<()> {
        Ok(())
    }

    fn source(&mut self) -> Result<String> {
        Ok(self.pages[self.at].clone())
    }

    fn body_text(&mut self) -> Result<String> {
        Ok(html::text(&self.pages[self.at]))
    }

    fn type_into(&mut self, _name: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn click_matching(&mut self, _name: &str, _value: &str) -> Result<usize> {
        Ok(0)
    }

    fn click(&mut self, _css: &str) -> Result<bool> {
        Ok(self.turn())
    }

    fn script_click(&mut self, _css: &str) -> Result<bool> {
        Ok(self.turn())
    }

    fn click_link(&mut self, _text: &str) -> Result<bool> {
        Ok(false)
    }

    fn property(&mut self, _css: &str, name: &str) -> Result<Option<String>> {
        Ok((name == "value").then(|| format!("{}/{}", self.at + 1, self.pages.len())))
    }

    fn quit(&mut self) -> Result<()> {
        Ok(())
    }
}
