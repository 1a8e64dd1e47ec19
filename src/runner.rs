// src/runner.rs
use crate::{
    browser::{Browser, Launcher},
    config::{options::RunOptions, tasks::{Task, TaskSet}},
    core::cancel::CancelToken,
    error::{Error, Result},
    pool,
    progress::{NullProgress, Progress},
    specs::{self, SequenceTables, Software, Stage},
};

/// Task name plus the software it ran.
pub type TaskKey = (String, Software);

/// Per-task results in task-set order, with failed tasks listed apart.
#[derive(Debug)]
pub struct ScoreIndex<T> {
    pub entries: Vec<(TaskKey, T)>,
    pub failures: Vec<(TaskKey, Error)>,
}

impl<T> Default for ScoreIndex<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), failures: Vec::new() }
    }
}

impl<T> ScoreIndex<T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|((n, _), _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when no task failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reject a task set that cannot be dispatched for `stage`.
pub fn validate(tasks: &TaskSet, stage: Stage) -> Result<()> {
    let mut messages = Vec::new();
    if tasks.is_empty() {
        messages.push(format!("You need to add at least one {} to run the protocol", stage.noun()));
    }
    for t in tasks {
        if t.software.stage() != stage {
            messages.push(format!("{}: {} is not a {}", t.name, t.software, stage.noun()));
        }
    }
    if messages.is_empty() { Ok(()) } else { Err(Error::Validation(messages)) }
}

/// Run every selector over `sequences`; one `SequenceTables` per task.
pub fn select_epitopes(
    sequences: &[String],
    tasks: &TaskSet,
    launcher: &dyn Launcher,
    opts: &RunOptions,
    progress: &mut dyn Progress,
    cancel: &CancelToken,
) -> Result<ScoreIndex<SequenceTables>> {
    validate(tasks, Stage::Selection)?;
    if sequences.is_empty() {
        return Ok(unrun(tasks, SequenceTables::new));
    }
    dispatch(tasks, launcher, opts, progress, cancel, |task, browser| {
        specs::select(task, browser, sequences, opts, cancel)
    })
}

/// Run every evaluator over `sequences`; one score per sequence per task.
pub fn perform_evaluations(
    sequences: &[String],
    tasks: &TaskSet,
    launcher: &dyn Launcher,
    opts: &RunOptions,
    progress: &mut dyn Progress,
    cancel: &CancelToken,
) -> Result<ScoreIndex<Vec<f64>>> {
    validate(tasks, Stage::Evaluation)?;
    if sequences.is_empty() {
        return Ok(unrun(tasks, Vec::new));
    }
    dispatch(tasks, launcher, opts, progress, cancel, |task, browser| {
        let scores = specs::evaluate(task, browser, sequences, opts, cancel)?.scores()?;
        if scores.len() != sequences.len() {
            logw!("{}: {} scores for {} sequences", task.name, scores.len(), sequences.len());
        }
        Ok(scores)
    })
}

/// Empty result for every task, for input with no sequences.
fn unrun<T>(tasks: &TaskSet, empty: impl Fn() -> T) -> ScoreIndex<T> {
    logw!("No input sequences; {} tasks skipped", tasks.len());
    ScoreIndex {
        entries: tasks.iter().map(|t| ((t.name.clone(), t.software), empty())).collect(),
        failures: Vec::new(),
    }
}

fn dispatch<T: Send>(
    tasks: &TaskSet,
    launcher: &dyn Launcher,
    opts: &RunOptions,
    progress: &mut dyn Progress,
    cancel: &CancelToken,
    run: impl Fn(&Task, &mut dyn Browser) -> Result<T> + Sync,
) -> Result<ScoreIndex<T>> {
    let items: Vec<&Task> = tasks.iter().collect();
    let mut quiet = NullProgress;
    let progress: &mut dyn Progress = if opts.verbose { progress } else { &mut quiet };
    progress.log(&format!(
        "Running {} tasks on {} browser sessions",
        items.len(),
        opts.jobs.min(items.len()).max(1)
    ));

    let results = pool::fan_out(
        &items,
        opts.jobs,
        opts.wait.poll,
        |t| t.name.clone(),
        progress,
        cancel,
        |&task| {
            logd!("{}: launching browser", task.name);
            let mut browser = launcher.launch()?;
            let out = run(task, browser.as_mut());
            if let Err(e) = browser.quit() {
                logw!("{}: browser did not quit cleanly: {e}", task.name);
            }
            out
        },
    );

    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let mut index = ScoreIndex::default();
    for (task, result) in items.into_iter().zip(results) {
        let key = (task.name.clone(), task.software);
        match result {
            Ok(v) => index.entries.push((key, v)),
            Err(e) => index.failures.push((key, e)),
        }
    }
    if !index.is_complete() {
        logw!("{} of {} tasks failed", index.failures.len(), tasks.len());
    }
    Ok(index)
}
