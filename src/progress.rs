// src/progress.rs
/// Lightweight progress reporting for the dispatcher.
/// Purely observational: nothing here feeds back into control flow.
pub trait Progress {
    /// Called at the start with the number of tasks.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called once per task, the first time it is seen finished.
    fn item_done(&mut self, _label: &str, _done: usize, _total: usize) {}

    /// Called once per task that finished with an error.
    fn item_failed(&mut self, _label: &str, _error: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Prints one line per finished task on stdout.
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn log(&mut self, msg: &str) {
        println!("{msg}");
    }

    fn item_done(&mut self, label: &str, done: usize, total: usize) {
        println!("{label} execution finished ({done} / {total})");
    }

    fn item_failed(&mut self, label: &str, error: &str) {
        println!("{label} execution failed: {error}");
    }
}

/// Records events; handy for tests and for front-ends that render later.
#[derive(Default, Debug)]
pub struct RecordingProgress {
    pub total: Option<usize>,
    pub logs: Vec<String>,
    pub done: Vec<String>,
    pub failed: Vec<String>,
    pub finished: bool,
}

impl Progress for RecordingProgress {
    fn begin(&mut self, total: usize) {
        self.total = Some(total);
    }
    fn log(&mut self, msg: &str) {
        self.logs.push(msg.to_string());
    }
    fn item_done(&mut self, label: &str, _done: usize, _total: usize) {
        self.done.push(label.to_string());
    }
    fn item_failed(&mut self, label: &str, _error: &str) {
        self.failed.push(label.to_string());
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}
