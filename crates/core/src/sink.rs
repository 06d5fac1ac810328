//! Concurrent warning accumulator.
//!
//! The only mutable state shared across a stage's parallel workers. The
//! contract is deliberately weak: concurrent appends with no ordering
//! guarantee beyond "every warning is eventually recorded exactly once".
//! The run report sorts before emitting, so the weak ordering never leaks
//! to users.

use kosha_types::Warning;
use std::sync::{Arc, Mutex};

/// A cheaply clonable, append-only warning collector.
#[derive(Debug, Clone, Default)]
pub struct WarningSink {
    warnings: Arc<Mutex<Vec<Warning>>>,
}

impl WarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, warning: Warning) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(warning);
        }
    }

    pub fn extend(&self, batch: impl IntoIterator<Item = Warning>) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.extend(batch);
        }
    }

    pub fn len(&self) -> usize {
        self.warnings.lock().map(|w| w.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains every recorded warning. Called once, by the report builder.
    pub fn drain(&self) -> Vec<Warning> {
        self.warnings
            .lock()
            .map(|mut w| std::mem::take(&mut *w))
            .unwrap_or_default()
    }
}
