// src/cli.rs
use std::path::{Path, PathBuf};

use crate::{
    browser::WebDriverLauncher,
    config::{
        consts::{EVALUATION_FILE, SELECTION_FILE, VAXIGN_FILE},
        options::{BrowserConfig, ExportOptions, RunFile, RunOptions},
    },
    core::{cancel::CancelToken, fasta},
    error::{Error, Result},
    file,
    progress::ConsoleProgress,
    regions::{self, REGION_HEADERS},
    runner::{self, ScoreIndex},
    specs::Software,
    vaxign::{self, Organism},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Select,
    Evaluate,
    Vaxign,
    List,
    Help,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Args {
    pub command: Command,
    pub input: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub work_dir: Option<PathBuf>,
    pub organism: Organism,
    pub log: Option<PathBuf>,
    pub quiet: bool,
}

impl Args {
    fn new(command: Command) -> Self {
        Self {
            command,
            input: None,
            config: None,
            out: None,
            jobs: None,
            work_dir: None,
            organism: Organism::GramPos,
            log: None,
            quiet: false,
        }
    }
}

pub fn run() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    crate::log::init(args.log.as_deref())?;

    match args.command {
        Command::Help => {
            eprintln!(include_str!("cli_help.txt"));
            Ok(())
        }
        Command::List => {
            for sw in Software::ALL {
                println!("{}\t{}", sw, sw.stage().noun());
            }
            Ok(())
        }
        Command::Select => select(&args),
        Command::Evaluate => evaluate(&args),
        Command::Vaxign => vaxign(&args),
    }
}

pub fn parse_args(argv: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut argv = argv.into_iter();
    let command = match argv.next().as_deref() {
        Some("select") => Command::Select,
        Some("evaluate") => Command::Evaluate,
        Some("vaxign") => Command::Vaxign,
        Some("list") => Command::List,
        None | Some("-h") | Some("--help") | Some("help") => Command::Help,
        Some(other) => return Err(Error::Config(format!("Unknown command: {other}"))),
    };
    let mut args = Args::new(command);

    while let Some(a) = argv.next() {
        match a.as_str() {
            "-i" | "--input" => args.input = Some(PathBuf::from(value(&a, &mut argv)?)),
            "-c" | "--config" => args.config = Some(PathBuf::from(value(&a, &mut argv)?)),
            "-o" | "--out" => args.out = Some(PathBuf::from(value(&a, &mut argv)?)),
            "-d" | "--work-dir" => args.work_dir = Some(PathBuf::from(value(&a, &mut argv)?)),
            "-j" | "--jobs" => {
                let v = value(&a, &mut argv)?;
                let n = v.parse().map_err(|_| Error::Config(format!("Invalid job count: {v}")))?;
                args.jobs = Some(n);
            }
            "-t" | "--organism" => args.organism = value(&a, &mut argv)?.parse()?,
            "--log" => args.log = Some(PathBuf::from(value(&a, &mut argv)?)),
            "--quiet" | "-q" => args.quiet = true,
            "-h" | "--help" => args.command = Command::Help,
            _ => return Err(Error::Config(format!("Unknown arg: {a}"))),
        }
    }

    let needs_config = matches!(args.command, Command::Select | Command::Evaluate);
    if needs_config && args.config.is_none() {
        return Err(Error::Config(s!("Missing run file (-c)")));
    }
    if args.command == Command::Vaxign && args.work_dir.is_none() {
        return Err(Error::Config(s!("Missing working directory (-d)")));
    }
    if args.command != Command::Help && args.command != Command::List && args.input.is_none() {
        return Err(Error::Config(s!("Missing input FASTA (-i)")));
    }
    Ok(args)
}

fn value(flag: &str, it: &mut impl Iterator<Item = String>) -> Result<String> {
    it.next().ok_or_else(|| Error::Config(format!("Missing value for {flag}")))
}

/* ---------------- Commands ---------------- */

fn load_run(args: &Args) -> Result<(RunFile, RunOptions)> {
    let rf = match &args.config {
        Some(p) => RunFile::load(p)?,
        None => RunFile::default(),
    };
    let mut opts = RunOptions { browser: BrowserConfig::from_env()?, ..Default::default() };
    rf.apply(&mut opts)?;
    if let Some(j) = args.jobs {
        opts.jobs = j;
    }
    opts.verbose = !args.quiet;
    Ok((rf, opts))
}

fn read_input(args: &Args) -> Result<Vec<fasta::Record>> {
    let path = args.input.as_deref().ok_or_else(|| Error::Config(s!("Missing input FASTA (-i)")))?;
    let records = fasta::read(path)?;
    if records.is_empty() {
        return Err(Error::Validation(vec![format!("{} holds no sequences", path.display())]));
    }
    logf!("Read {} sequences from {}", records.len(), path.display());
    Ok(records)
}

fn export(args: &Args, stem: &str, headers: &[String], rows: &[Vec<String>]) -> Result<PathBuf> {
    let mut ex = ExportOptions::new(stem);
    if let Some(p) = &args.out {
        ex.set_out_path(p);
    }
    file::write_table(&ex, headers, rows)
}

fn report_failures<T>(index: &ScoreIndex<T>) {
    for ((name, sw), e) in &index.failures {
        eprintln!("{name} ({sw}) failed: {e}");
    }
}

fn select(args: &Args) -> Result<()> {
    let records = read_input(args)?;
    let (rf, opts) = load_run(args)?;
    let tasks = rf.selectors()?;
    let seqs: Vec<String> = records.iter().map(|r| r.seq.clone()).collect();
    let launcher = WebDriverLauncher::new(opts.browser.clone());

    let index = runner::select_epitopes(&seqs, &tasks, &launcher, &opts, &mut ConsoleProgress, &CancelToken::new())?;
    report_failures(&index);

    let rows: Vec<Vec<String>> = regions::regions(&index, &records).iter().map(|r| r.to_row()).collect();
    let headers: Vec<String> = REGION_HEADERS.iter().map(|h| h.to_string()).collect();
    let path = export(args, SELECTION_FILE, &headers, &rows)?;
    println!("{} epitope regions written to {}", rows.len(), path.display());
    Ok(())
}

fn evaluate(args: &Args) -> Result<()> {
    let records = read_input(args)?;
    let (rf, opts) = load_run(args)?;
    let tasks = rf.evaluators()?;
    let seqs: Vec<String> = records.iter().map(|r| r.seq.clone()).collect();
    let launcher = WebDriverLauncher::new(opts.browser.clone());

    let index = runner::perform_evaluations(&seqs, &tasks, &launcher, &opts, &mut ConsoleProgress, &CancelToken::new())?;
    report_failures(&index);

    let (headers, rows) = regions::evaluation_rows(&index, &records);
    let path = export(args, EVALUATION_FILE, &headers, &rows)?;
    println!("{} task scores written to {}", index.len(), path.display());
    Ok(())
}

fn vaxign(args: &Args) -> Result<()> {
    let records = read_input(args)?;
    let (rf, opts) = load_run(args)?;
    let work_dir: &Path = args.work_dir.as_deref().ok_or_else(|| Error::Config(s!("Missing working directory (-d)")))?;

    let outcome = vaxign::run_vaxign_tool(
        &records,
        work_dir,
        args.organism,
        opts.jobs,
        &rf.vaxign_config(),
        &opts.wait,
        &CancelToken::new(),
    )?;

    let rows: Vec<Vec<String>> = outcome.scores.iter().map(|(id, s)| vec![id.clone(), s.to_string()]).collect();
    let path = export(args, VAXIGN_FILE, &labels!["Sequence", "VaxignML"], &rows)?;
    println!("{} Vaxign-ML scores written to {}", rows.len(), path.display());
    Ok(())
}
