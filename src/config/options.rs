// src/config/options.rs
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::consts::*;
use super::tasks::TaskSet;
use crate::error::{Error, Result};
use crate::specs::Stage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

impl BrowserKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" | "google-chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(Error::Config(format!("Unknown browser: {other}"))),
        }
    }
}

/// Which browser to drive and where its WebDriver server listens.
/// Sessions are always headless.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserConfig {
    pub kind: BrowserKind,
    pub path: PathBuf,
    pub webdriver: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self::for_kind(BrowserKind::Chrome)
    }
}

impl BrowserConfig {
    pub fn for_kind(kind: BrowserKind) -> Self {
        match kind {
            BrowserKind::Chrome => Self {
                kind,
                path: PathBuf::from(CHROME_PATH),
                webdriver: s!(CHROMEDRIVER_URL),
            },
            BrowserKind::Firefox => Self {
                kind,
                path: PathBuf::from(FIREFOX_PATH),
                webdriver: s!(GECKODRIVER_URL),
            },
        }
    }

    /// Defaults overridden by `IIITD_BROWSER`, `IIITD_BROWSER_PATH` and `IIITD_WEBDRIVER`.
    /// Empty variables count as unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        let mut cfg = match var(ENV_BROWSER) {
            Some(name) => Self::for_kind(BrowserKind::parse(&name)?),
            None => Self::default(),
        };
        if let Some(p) = var(ENV_BROWSER_PATH) {
            cfg.path = PathBuf::from(p);
        }
        if let Some(url) = var(ENV_WEBDRIVER) {
            cfg.webdriver = url;
        }
        Ok(cfg)
    }
}

/// How long to wait for a result page or an external process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitOptions {
    pub poll: Duration,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll: Duration::from_secs(POLL_SECS),
            timeout: Some(Duration::from_secs(WAIT_TIMEOUT_SECS)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub jobs: usize,
    pub max_chunk: usize,
    pub browser: BrowserConfig,
    pub wait: WaitOptions,
    pub verbose: bool,
    /// Where FASTA upload files are written.
    pub scratch_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            jobs: JOBS,
            max_chunk: MAX_CHUNK,
            browser: BrowserConfig::default(),
            wait: WaitOptions::default(),
            verbose: true,
            scratch_dir: std::env::temp_dir(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaxignConfig {
    /// Container runtime invocation, e.g. `docker run` or `podman run`.
    pub runtime: Vec<String>,
    pub image: String,
    pub model: Option<String>,
}

impl Default for VaxignConfig {
    fn default() -> Self {
        Self {
            runtime: VAXIGN_RUNTIME.iter().map(|s| s.to_string()).collect(),
            image: s!(VAXIGN_IMAGE),
            model: None,
        }
    }
}

/* ---------------- Export ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(&self) -> char {
        match self { ExportFormat::Csv => ',', ExportFormat::Tsv => '\t' }
    }

    /// Format implied by a file extension; anything but `.csv` is TSV.
    pub fn for_path(p: &Path) -> Self {
        match p.extension().and_then(|e| e.to_str()) {
            Some(e) if e.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Tsv,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub include_headers: bool,
    dir: PathBuf,
    file_stem: OsString,
}

impl ExportOptions {
    pub fn new(stem: &str) -> Self {
        Self {
            format: ExportFormat::Tsv,
            include_headers: true,
            dir: PathBuf::from(DEFAULT_OUT_DIR),
            file_stem: OsString::from(stem),
        }
    }

    /// Take directory and stem from a user path; the extension picks the format.
    pub fn set_out_path(&mut self, p: &Path) {
        if let Some(parent) = p.parent() {
            self.dir = parent.to_path_buf();
        }
        if let Some(stem) = p.file_stem() {
            self.file_stem = stem.to_os_string();
        }
        self.format = ExportFormat::for_path(p);
    }

    pub fn out_path(&self) -> PathBuf {
        let stem = self.file_stem.to_string_lossy();
        self.dir.join(join!(&*stem, ".", self.format.ext()))
    }
}

/* ---------------- Run file (TOML) ---------------- */

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    pub jobs: Option<usize>,
    pub max_chunk: Option<usize>,
    pub scratch_dir: Option<PathBuf>,
    pub browser: Option<BrowserSection>,
    pub wait: Option<WaitSection>,
    pub vaxign: Option<VaxignSection>,
    #[serde(default)]
    pub selector: Vec<TaskEntry>,
    #[serde(default)]
    pub evaluator: Vec<TaskEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrowserSection {
    pub name: Option<String>,
    pub path: Option<PathBuf>,
    pub webdriver: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitSection {
    /// Must be positive.
    pub poll_secs: Option<u64>,
    /// 0 disables the bound.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaxignSection {
    pub runtime: Option<Vec<String>>,
    pub image: Option<String>,
    pub model: Option<String>,
}

/// One `[[selector]]` / `[[evaluator]]` entry; every other key is a parameter.
#[derive(Debug, Deserialize)]
pub struct TaskEntry {
    pub name: Option<String>,
    pub software: String,
    #[serde(flatten)]
    pub params: toml::Table,
}

impl RunFile {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Fold the file's settings into `opts`; unset keys leave `opts` alone.
    pub fn apply(&self, opts: &mut RunOptions) -> Result<()> {
        if let Some(j) = self.jobs { opts.jobs = j; }
        if let Some(c) = self.max_chunk { opts.max_chunk = c; }
        if let Some(d) = &self.scratch_dir { opts.scratch_dir = d.clone(); }

        if let Some(b) = &self.browser {
            if let Some(name) = &b.name {
                let kind = BrowserKind::parse(name)?;
                if kind != opts.browser.kind {
                    opts.browser = BrowserConfig::for_kind(kind);
                }
            }
            if let Some(p) = &b.path { opts.browser.path = p.clone(); }
            if let Some(u) = &b.webdriver { opts.browser.webdriver = u.clone(); }
        }
        if let Some(w) = &self.wait {
            match w.poll_secs {
                Some(0) => return Err(Error::Config(s!("wait.poll_secs must be at least 1"))),
                Some(p) => opts.wait.poll = Duration::from_secs(p),
                None => {}
            }
            if let Some(t) = w.timeout_secs {
                opts.wait.timeout = (t > 0).then(|| Duration::from_secs(t));
            }
        }
        Ok(())
    }

    pub fn vaxign_config(&self) -> VaxignConfig {
        let mut cfg = VaxignConfig::default();
        if let Some(v) = &self.vaxign {
            if let Some(r) = &v.runtime { cfg.runtime = r.clone(); }
            if let Some(i) = &v.image { cfg.image = i.clone(); }
            cfg.model = v.model.clone();
        }
        cfg
    }

    pub fn selectors(&self) -> Result<TaskSet> {
        TaskSet::from_entries(&self.selector, Stage::Selection)
    }

    pub fn evaluators(&self) -> Result<TaskSet> {
        TaskSet::from_entries(&self.evaluator, Stage::Evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_browser_defaults() {
        let cfg = BrowserConfig::from_lookup(|k| match k {
            ENV_BROWSER => Some(s!("Firefox")),
            ENV_BROWSER_PATH => Some(s!("")),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg, BrowserConfig::for_kind(BrowserKind::Firefox));

        let bad = BrowserConfig::from_lookup(|k| (k == ENV_BROWSER).then(|| s!("lynx")));
        assert!(matches!(bad, Err(Error::Config(_))));
    }

    #[test]
    fn run_file_applies_over_defaults() {
        let rf = RunFile::parse(
            r#"
            jobs = 2
            [browser]
            name = "firefox"
            webdriver = "http://127.0.0.1:4445"
            [wait]
            timeout_secs = 0

            [[selector]]
            software = "ABCpred"
            abcWindow = 16
            "#,
        )
        .unwrap();
        let mut opts = RunOptions::default();
        rf.apply(&mut opts).unwrap();
        assert_eq!(opts.jobs, 2);
        assert_eq!(opts.max_chunk, MAX_CHUNK);
        assert_eq!(opts.browser.kind, BrowserKind::Firefox);
        assert_eq!(opts.browser.path, PathBuf::from(FIREFOX_PATH));
        assert_eq!(opts.browser.webdriver, "http://127.0.0.1:4445");
        assert_eq!(opts.wait.timeout, None);
        assert_eq!(opts.wait.poll, Duration::from_secs(POLL_SECS));
        assert_eq!(rf.selector.len(), 1);
        assert!(rf.evaluator.is_empty());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let rf = RunFile::parse("[wait]\npoll_secs = 0\n").unwrap();
        let mut opts = RunOptions::default();
        assert!(matches!(rf.apply(&mut opts), Err(Error::Config(m)) if m.contains("poll_secs")));
        assert_eq!(opts.wait.poll, Duration::from_secs(POLL_SECS));

        RunFile::parse("[wait]\npoll_secs = 2\n").unwrap().apply(&mut opts).unwrap();
        assert_eq!(opts.wait.poll, Duration::from_secs(2));
    }

    #[test]
    fn unknown_top_level_keys_are_rejected() {
        assert!(matches!(RunFile::parse("jbos = 3"), Err(Error::Toml(_))));
    }

    #[test]
    fn export_path_follows_extension() {
        let mut ex = ExportOptions::new(SELECTION_FILE);
        assert_eq!(ex.out_path(), PathBuf::from("out/epitopes.tsv"));
        ex.set_out_path(Path::new("res/hits.csv"));
        assert_eq!(ex.format, ExportFormat::Csv);
        assert_eq!(ex.out_path(), PathBuf::from("res/hits.csv"));
    }
}
