//! Shared fixtures for unit tests

use crate::progress::ProgressReporter;
use std::path::PathBuf;
use terratile_core::Stage;

/// Write a horizontal 8-bit gradient PNG into the temp directory
pub(crate) fn write_gradient_png(name: &str, width: u32, height: u32) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "terratile-{}-{}.png",
        std::process::id(),
        name
    ));
    let img = image::GrayImage::from_fn(width, height, |x, _| {
        image::Luma([(x * 255 / (width - 1).max(1)) as u8])
    });
    img.save(&path).unwrap();
    path
}

/// Records every call it receives
#[derive(Debug, Default)]
pub(crate) struct RecordingProgress {
    pub stages: Vec<Stage>,
    pub total: usize,
    pub updates: Vec<usize>,
    pub ended: bool,
}

impl ProgressReporter for RecordingProgress {
    fn begin(&mut self, stage: Stage, total: usize) {
        self.stages.push(stage);
        self.total = total;
        self.updates.clear();
        self.ended = false;
    }

    fn update(&mut self, done: usize) {
        self.updates.push(done);
    }

    fn end(&mut self) {
        self.ended = true;
    }
}

/// Requests cancellation once `units` progress units have been reported
#[derive(Debug)]
pub(crate) struct CancelAfter {
    units: usize,
    seen: usize,
}

impl CancelAfter {
    pub fn units(units: usize) -> Self {
        Self { units, seen: 0 }
    }
}

impl ProgressReporter for CancelAfter {
    fn begin(&mut self, _stage: Stage, _total: usize) {
        self.seen = 0;
    }

    fn update(&mut self, done: usize) {
        self.seen = done;
    }

    fn end(&mut self) {}

    fn cancel_requested(&self) -> bool {
        self.seen >= self.units
    }
}
