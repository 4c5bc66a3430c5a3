use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// Delay strategy between sibling draws and between revealed words.
///
/// The renderer only ever calls [`Pacer::pause`] with a non-zero duration.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Returns immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn pause(&self, _delay: Duration) {}
}

/// Records every requested delay without waiting.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .map(|d| d.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn count(&self) -> usize {
        self.delays().len()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, delay: Duration) {
        match self.delays.lock() {
            Ok(mut d) => d.push(delay),
            Err(poisoned) => poisoned.into_inner().push(delay),
        }
    }
}

/// Delay between sibling draws; `None` when pacing is off.
pub(crate) fn sibling_delay(pacing_delay_ms: u64) -> Option<Duration> {
    (pacing_delay_ms > 0).then(|| Duration::from_millis(pacing_delay_ms))
}

/// Delay between revealed words: a quarter of the sibling delay.
pub(crate) fn word_delay(pacing_delay_ms: u64) -> Option<Duration> {
    sibling_delay(pacing_delay_ms).map(|d| d / 4)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pacing.rs"]
mod tests;
