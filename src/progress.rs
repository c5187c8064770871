// src/progress.rs
use crate::record::Strategy;

/// Lightweight progress reporting for an extraction run.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of strategies that may be tried.
    fn begin(&mut self, _strategies: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one strategy has been evaluated.
    fn attempt_done(&mut self, _strategy: Strategy, _accepted: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}
