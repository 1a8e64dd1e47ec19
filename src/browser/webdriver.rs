// src/browser/webdriver.rs
use std::future::Future;

use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use tokio::runtime::{Builder, Runtime};

use super::{Browser, Launcher};
use crate::config::options::{BrowserConfig, BrowserKind};
use crate::error::{Error, Result};

const SCRIPT_CLICK: &str =
    "var e = document.querySelector(arguments[0]); if (!e) { return false; } e.click(); return true;";

fn capabilities(cfg: &BrowserConfig) -> Map<String, Value> {
    let binary = cfg.path.to_string_lossy().into_owned();
    let mut caps = Map::new();
    match cfg.kind {
        BrowserKind::Chrome => {
            caps.insert(s!("browserName"), json!("chrome"));
            caps.insert(
                s!("goog:chromeOptions"),
                json!({ "binary": binary, "args": ["--headless", "--remote-debugging-pipe"] }),
            );
        }
        BrowserKind::Firefox => {
            caps.insert(s!("browserName"), json!("firefox"));
            caps.insert(s!("moz:firefoxOptions"), json!({ "binary": binary, "args": ["-headless"] }));
        }
    }
    caps
}

fn cmd<E: std::fmt::Display>(what: &str) -> impl FnOnce(E) -> Error + '_ {
    move |e| Error::automation(format!("{what}: {e}"))
}

/// Headless session behind a WebDriver server, driven from blocking code.
/// Each session owns a single-threaded runtime.
pub struct WebDriverBrowser {
    rt: Runtime,
    client: Option<Client>,
}

impl WebDriverBrowser {
    pub fn connect(cfg: &BrowserConfig) -> Result<Self> {
        let rt = Builder::new_current_thread().enable_all().build()?;
        let client = rt
            .block_on(ClientBuilder::native().capabilities(capabilities(cfg)).connect(&cfg.webdriver))
            .map_err(|e| Error::automation(format!("WebDriver session at {}: {e}", cfg.webdriver)))?;
        logd!("Browser session opened ({:?} via {})", cfg.kind, cfg.webdriver);
        Ok(Self { rt, client: Some(client) })
    }

    fn client(&self) -> Result<Client> {
        self.client.clone().ok_or_else(|| Error::automation("browser session already closed"))
    }

    fn run<T, F: Future<Output = T>>(&self, f: F) -> T {
        self.rt.block_on(f)
    }

    fn all(&self, locator: Locator<'_>) -> Result<Vec<Element>> {
        let c = self.client()?;
        self.run(c.find_all(locator)).map_err(cmd("find elements"))
    }
}

impl Browser for WebDriverBrowser {
    fn goto(&mut self, url: &str) -> Result<()> {
        let c = self.client()?;
        self.run(c.goto(url)).map_err(cmd(url))
    }

    fn source(&mut self) -> Result<String> {
        let c = self.client()?;
        self.run(c.source()).map_err(cmd("page source"))
    }

    fn body_text(&mut self) -> Result<String> {
        let c = self.client()?;
        self.run(async {
            let body = c.find(Locator::Css("body")).await?;
            body.text().await
        })
        .map_err(cmd("body text"))
    }

    fn type_into(&mut self, name: &str, value: &str) -> Result<()> {
        let css = format!("[name='{name}']");
        let el = self
            .all(Locator::Css(&css))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::automation(format!("no element named '{name}'")))?;
        self.run(el.send_keys(value)).map_err(cmd(name))
    }

    fn click_matching(&mut self, name: &str, value: &str) -> Result<usize> {
        let css = format!("[name='{name}']");
        let mut clicked = 0;
        for el in self.all(Locator::Css(&css))? {
            let v = self.run(el.attr("value")).map_err(cmd(name))?;
            if v.as_deref() == Some(value) {
                self.run(el.click()).map_err(cmd(name))?;
                clicked += 1;
            }
        }
        Ok(clicked)
    }

    fn click(&mut self, css: &str) -> Result<bool> {
        match self.all(Locator::Css(css))?.into_iter().next() {
            Some(el) => {
                self.run(el.click()).map_err(cmd(css))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn script_click(&mut self, css: &str) -> Result<bool> {
        let c = self.client()?;
        let v = self.run(c.execute(SCRIPT_CLICK, vec![json!(css)])).map_err(cmd(css))?;
        Ok(v.as_bool().unwrap_or(false))
    }

    fn click_link(&mut self, text: &str) -> Result<bool> {
        let xpath = format!("//a[contains(normalize-space(.), \"{text}\")]");
        match self.all(Locator::XPath(&xpath))?.into_iter().next() {
            Some(el) => {
                self.run(el.click()).map_err(cmd(text))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn property(&mut self, css: &str, name: &str) -> Result<Option<String>> {
        match self.all(Locator::Css(css))?.into_iter().next() {
            Some(el) => self.run(el.prop(name)).map_err(cmd(css)),
            None => Ok(None),
        }
    }

    fn quit(&mut self) -> Result<()> {
        match self.client.take() {
            Some(c) => self.run(c.close()).map_err(cmd("close session")),
            None => Ok(()),
        }
    }
}

impl Drop for WebDriverBrowser {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            logw!("Closing browser session: {e}");
        }
    }
}

/// Launches WebDriver sessions from one configuration.
#[derive(Clone, Debug)]
pub struct WebDriverLauncher {
    pub config: BrowserConfig,
}

impl WebDriverLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl Launcher for WebDriverLauncher {
    fn launch(&self) -> Result<Box<dyn Browser>> {
        Ok(Box::new(WebDriverBrowser::connect(&self.config)?))
    }
}
