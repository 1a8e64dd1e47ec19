// src/vaxign.rs
//! Vaxign-ML through a container runtime.
//!
//! The tool only scores proteins of at least [`VAXIGN_MIN_LEN`] standard residues;
//! everything else is left out of the input file and scores 0.

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::str::FromStr;

use crate::config::consts::{STANDARD_RESIDUES, VAXIGN_INPUT, VAXIGN_MIN_LEN, VAXIGN_RESULT};
use crate::config::options::{VaxignConfig, WaitOptions};
use crate::core::cancel::{self, CancelToken, Deadline};
use crate::core::fasta::{self, Record};
use crate::error::{Error, Result};

const OUT_DIR: &str = "vaxResults";
const LOG_FILE: &str = "vaxign.log";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Organism {
    GramPos,
    GramNeg,
    Virus,
}

impl fmt::Display for Organism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Organism::GramPos => "gram+",
            Organism::GramNeg => "gram-",
            Organism::Virus => "virus",
        })
    }
}

impl FromStr for Organism {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gram+" => Ok(Organism::GramPos),
            "gram-" => Ok(Organism::GramNeg),
            "virus" => Ok(Organism::Virus),
            other => Err(Error::Config(format!("unknown organism '{other}' (gram+, gram-, virus)"))),
        }
    }
}

fn is_viable(seq: &str) -> bool {
    seq.len() >= VAXIGN_MIN_LEN && seq.bytes().all(|b| STANDARD_RESIDUES.as_bytes().contains(&b.to_ascii_uppercase()))
}

/// Records the tool can score.
pub fn viable(records: &[Record]) -> Vec<&Record> {
    records.iter().filter(|r| is_viable(&r.seq)).collect()
}

/// Ids of records left out; warns once when there are any.
pub fn dropped(records: &[Record]) -> Vec<String> {
    let out: Vec<String> = records.iter().filter(|r| !is_viable(&r.seq)).map(|r| r.id.clone()).collect();
    if !out.is_empty() {
        logw!(
            "{} sequences are shorter than {VAXIGN_MIN_LEN} residues or carry nonstandard residues; \
             Vaxign-ML cannot score them, so they get a score of 0",
            out.len()
        );
    }
    out
}

/// Full argument vector: runtime words first, then mounts, image and tool flags.
pub fn command(cfg: &VaxignConfig, input: &Path, out: &Path, organism: Organism, workers: usize) -> Vec<String> {
    let input = input.display().to_string();
    let out = out.display().to_string();

    let mut args = cfg.runtime.clone();
    args.extend([
        s!("-v"), format!("{input}:{input}"),
        s!("-v"), format!("{out}:{out}"),
        s!("-v"), format!("{out}/_FEATURE/PSORTB:/tmp/results"),
        cfg.image.clone(),
        s!("python3.6"), s!("VaxignML.py"),
        s!("-i"), input,
        s!("-o"), out,
        s!("-t"), organism.to_string(),
    ]);
    if let Some(model) = &cfg.model {
        args.extend([s!("-s"), model.clone()]);
    }
    if workers > 0 {
        args.extend([s!("-p"), workers.to_string()]);
    }
    args
}

/// Spawn `args` and wait for it, bounded by `wait.timeout` and `cancel`.
/// Output goes to `log`. A non-zero exit is a `Tool` error.
pub fn run(args: &[String], log: &Path, wait: &WaitOptions, cancel: &CancelToken) -> Result<()> {
    let (program, rest) = args.split_first().ok_or_else(|| Error::Tool(s!("empty container command")))?;
    let exe = which::which(program).map_err(|e| Error::Tool(format!("{program}: {e}")))?;

    let out = File::create(log)?;
    let err = out.try_clone()?;
    logf!("Running {}", args.join(" "));
    let mut child = Command::new(exe)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(out)
        .stderr(err)
        .spawn()
        .map_err(|e| Error::Tool(format!("{program}: {e}")))?;

    let deadline = Deadline::after(wait.timeout);
    loop {
        if let Some(status) = child.try_wait()? {
            if status.success() {
                return Ok(());
            }
            return Err(Error::Tool(format!("{program} exited with {status}; see {}", log.display())));
        }
        if let Err(e) = deadline.check("Vaxign-ML").and_then(|_| cancel::sleep(wait.poll, cancel)) {
            kill(&mut child);
            return Err(e);
        }
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        logw!("could not stop container process: {e}");
    }
    let _ = child.wait();
}

/// `id → score` from the result TSV: header skipped, score is the last column.
pub fn parse_results(text: &str) -> Vec<(String, f64)> {
    text.lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            let (id, last) = (cols.first()?, cols.last()?);
            match last.parse::<f64>() {
                Ok(v) if cols.len() > 1 => Some((id.to_string(), v)),
                _ => {
                    logw!("Vaxign-ML: unreadable result line '{line}'");
                    None
                }
            }
        })
        .collect()
}

/// Score per id, 0 for ids the tool did not report.
pub fn scores_for(ids: &[String], results: &[(String, f64)]) -> Vec<(String, f64)> {
    ids.iter()
        .map(|id| {
            let score = results.iter().find(|(r, _)| r == id).map(|(_, s)| *s).unwrap_or(0.0);
            (id.clone(), score)
        })
        .collect()
}

#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    /// One entry per input record, in input order.
    pub scores: Vec<(String, f64)>,
    pub dropped: Vec<String>,
    pub result_file: Option<PathBuf>,
}

/// Write the viable records, run the container, read its scores.
pub fn run_vaxign_tool(
    records: &[Record],
    work_dir: &Path,
    organism: Organism,
    workers: usize,
    cfg: &VaxignConfig,
    wait: &WaitOptions,
    cancel: &CancelToken,
) -> Result<Outcome> {
    let keep: Vec<Record> = viable(records).into_iter().cloned().collect();
    let dropped = dropped(records);
    if keep.is_empty() {
        logw!("There are no sequences over {VAXIGN_MIN_LEN} residues in the input. Vaxign-ML cannot be executed");
        return Ok(Outcome { dropped, ..Default::default() });
    }

    fs::create_dir_all(work_dir)?;
    // Mounts need absolute paths.
    let work_dir = fs::canonicalize(work_dir)?;
    let input = work_dir.join(VAXIGN_INPUT);
    let out = work_dir.join(OUT_DIR);
    fs::create_dir_all(&out)?;
    fs::write(&input, fasta::to_fasta(&keep))?;

    let args = command(cfg, &input, &out, organism, workers);
    run(&args, &work_dir.join(LOG_FILE), wait, cancel)?;

    let result_file = out.join(VAXIGN_RESULT);
    let text = fs::read_to_string(&result_file)
        .map_err(|e| Error::Tool(format!("no result at {}: {e}", result_file.display())))?;
    let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
    Ok(Outcome { scores: scores_for(&ids, &parse_results(&text)), dropped, result_file: Some(result_file) })
}
