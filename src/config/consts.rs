// src/config/consts.rs

// Browser
pub const CHROME_PATH: &str = "/usr/bin/google-chrome";
pub const FIREFOX_PATH: &str = "/usr/bin/firefox";
pub const CHROMEDRIVER_URL: &str = "http://localhost:9515";
pub const GECKODRIVER_URL: &str = "http://localhost:4444";

pub const ENV_BROWSER: &str = "IIITD_BROWSER";
pub const ENV_BROWSER_PATH: &str = "IIITD_BROWSER_PATH";
pub const ENV_WEBDRIVER: &str = "IIITD_WEBDRIVER";

// Waiting on result pages
pub const POLL_SECS: u64 = 5;
pub const WAIT_TIMEOUT_SECS: u64 = 30 * 60;

// Dispatch
pub const JOBS: usize = 4;
pub const MAX_CHUNK: usize = 1; // sequences per page visit; 0 = all at once

// Selection
pub const LBTOPE_MIN_PROBABILITY: f64 = 78.0;

// Vaxign-ML
pub const VAXIGN_RUNTIME: &[&str] = &["docker", "run"];
pub const VAXIGN_IMAGE: &str = "e4ong1031/vaxign-ml:latest";
pub const VAXIGN_MIN_LEN: usize = 50;
pub const STANDARD_RESIDUES: &str = "ACDEFGHIKLMNPQRSTVWY";
pub const VAXIGN_INPUT: &str = "inputSequences.fa";
pub const VAXIGN_RESULT: &str = "inputSequences.result.tsv";

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const SELECTION_FILE: &str = "epitopes";
pub const EVALUATION_FILE: &str = "evaluations";
pub const VAXIGN_FILE: &str = "vaxign";
