// src/core/cancel.rs
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const SLICE: Duration = Duration::from_millis(100);

/// Shared stop flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
    }
}

/// Sleep for `dur`, waking early with `Error::Cancelled` if the token fires.
pub fn sleep(dur: Duration, cancel: &CancelToken) -> Result<()> {
    let end = Instant::now() + dur;
    loop {
        cancel.check()?;
        let now = Instant::now();
        if now >= end {
            return Ok(());
        }
        thread::sleep(SLICE.min(end - now));
    }
}

/// Upper bound on a wait; `None` never expires.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    start: Instant,
    timeout: Option<Duration>,
}

impl Deadline {
    pub fn after(timeout: Option<Duration>) -> Self {
        Self { start: Instant::now(), timeout }
    }

    pub fn check(&self, what: &str) -> Result<()> {
        match self.timeout {
            Some(after) if self.start.elapsed() >= after => {
                Err(Error::Timeout { what: what.to_string(), after })
            }
            _ => Ok(()),
        }
    }
}
