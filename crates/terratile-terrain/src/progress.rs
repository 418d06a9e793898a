//! Progress reporting and cooperative cancellation for batch stages

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use terratile_core::Stage;
use tracing::debug;

/// Receives progress from batch stages.
///
/// `update` carries the number of finished units out of the total given to
/// `begin`. Stages poll `cancel_requested` between tiles.
pub trait ProgressReporter {
    fn begin(&mut self, stage: Stage, total: usize);
    fn update(&mut self, done: usize);
    fn end(&mut self);

    fn cancel_requested(&self) -> bool {
        false
    }
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn begin(&mut self, _stage: Stage, _total: usize) {}
    fn update(&mut self, _done: usize) {}
    fn end(&mut self) {}
}

/// Writes progress to the tracing log
#[derive(Debug, Default)]
pub struct LogProgress {
    stage: Option<Stage>,
    total: usize,
}

impl ProgressReporter for LogProgress {
    fn begin(&mut self, stage: Stage, total: usize) {
        self.stage = Some(stage);
        self.total = total;
        debug!(stage = %stage, total, "Progress begin");
    }

    fn update(&mut self, done: usize) {
        if let Some(stage) = self.stage {
            debug!(stage = %stage, done, total = self.total, "Progress");
        }
    }

    fn end(&mut self) {
        if let Some(stage) = self.stage.take() {
            debug!(stage = %stage, "Progress end");
        }
    }
}

/// Wraps another reporter with a shared cancel flag.
///
/// The flag can be raised from anywhere holding a clone of the handle, e.g.
/// a Ctrl-C handler.
#[derive(Debug)]
pub struct Cancellable<P> {
    inner: P,
    flag: Arc<AtomicBool>,
}

impl<P: ProgressReporter> Cancellable<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

impl<P: ProgressReporter> ProgressReporter for Cancellable<P> {
    fn begin(&mut self, stage: Stage, total: usize) {
        self.inner.begin(stage, total);
    }

    fn update(&mut self, done: usize) {
        self.inner.update(done);
    }

    fn end(&mut self) {
        self.inner.end();
    }

    fn cancel_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.inner.cancel_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_is_shared() {
        let progress = Cancellable::new(NoProgress);
        assert!(!progress.cancel_requested());
        progress.handle().store(true, Ordering::Relaxed);
        assert!(progress.cancel_requested());
    }

    #[test]
    fn log_progress_tracks_stage() {
        let mut progress = LogProgress::default();
        progress.begin(Stage::Bake, 4);
        progress.update(1);
        assert_eq!(progress.stage, Some(Stage::Bake));
        progress.end();
        assert_eq!(progress.stage, None);
    }
}
