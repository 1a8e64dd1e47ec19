// src/browser/mod.rs
//! Browser automation seam.
//!
//! Scrapers talk to a [`Browser`] and read results from the serialized page source,
//! so everything after the clicks can be exercised offline against captured pages.
//! [`webdriver::WebDriverBrowser`] is the live implementation.

pub mod webdriver;

use crate::error::Result;

pub use webdriver::{WebDriverBrowser, WebDriverLauncher};

/// One browser session. Element lookups are by CSS selector or `name` attribute.
pub trait Browser {
    fn goto(&mut self, url: &str) -> Result<()>;

    /// Serialized DOM of the current page.
    fn source(&mut self) -> Result<String>;

    /// Visible text of `<body>`.
    fn body_text(&mut self) -> Result<String>;

    /// Type into the first element with this `name`; missing element is an error.
    fn type_into(&mut self, name: &str, value: &str) -> Result<()>;

    /// Click every element with this `name` whose `value` attribute equals `value`.
    /// Returns how many were clicked.
    fn click_matching(&mut self, name: &str, value: &str) -> Result<usize>;

    /// Click the first element matching `css`. `Ok(false)` when there is none.
    fn click(&mut self, css: &str) -> Result<bool>;

    /// Click through a script call, for controls the page keeps covered.
    fn script_click(&mut self, css: &str) -> Result<bool>;

    /// Click the first link whose text contains `text`.
    fn click_link(&mut self, text: &str) -> Result<bool>;

    /// Live DOM property (not the attribute) of the first element matching `css`.
    fn property(&mut self, css: &str, name: &str) -> Result<Option<String>>;

    /// End the session. Further calls fail.
    fn quit(&mut self) -> Result<()>;
}

/// Opens a fresh session per task; shared across worker threads.
pub trait Launcher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn Browser>>;
}
