use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use quill_domain::{Clipboard, DiagramCompiler, Error, Result};

/// Diagram compiler that produces a fixed-size graphic echoing its input and
/// counts every compile it is asked to run.
#[derive(Clone, Debug, Default)]
pub struct CountingCompiler {
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    delay: Duration,
}

impl CountingCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every compile wait on the (possibly paused) tokio clock.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn graphic(code: &str) -> String {
        format!(
            r#"<svg width="200" height="100" viewBox="0 0 200 100"><text>{}</text></svg>"#,
            code.trim()
        )
    }
}

#[async_trait::async_trait]
impl DiagramCompiler for CountingCompiler {
    async fn compile(&self, code: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::DiagramCompile("Parse error on line 1".to_string()));
        }
        Ok(Self::graphic(code))
    }
}

/// Clipboard that records what reached it, with switchable failures for both
/// write paths.
#[derive(Clone, Debug, Default)]
pub struct RecordingClipboard {
    writes: Arc<Mutex<Vec<String>>>,
    modern_fails: bool,
    legacy_fails: bool,
}

impl RecordingClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modern_fails(mut self) -> Self {
        self.modern_fails = true;
        self
    }

    pub fn legacy_fails(mut self) -> Self {
        self.legacy_fails = true;
        self
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        if self.modern_fails {
            return Err(Error::Clipboard("permission denied".to_string()));
        }
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn write_text_legacy(&self, text: &str) -> Result<()> {
        if self.legacy_fails {
            return Err(Error::Clipboard("copy command unavailable".to_string()));
        }
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
