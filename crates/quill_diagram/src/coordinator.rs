use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use quill_domain::DiagramCompiler;

use crate::{DiagramCache, DiagramError, Result};

type SharedCompile = Shared<BoxFuture<'static, Result<Arc<str>>>>;

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagramStats {
    pub compiles: u64,
    pub hits: u64,
    pub entries: usize,
}

/// Turns diagram source into graphics, compiling each distinct source at most
/// once while it stays cached, even when many regions ask for it at the same
/// time.
pub struct DiagramCoordinator {
    compiler: Arc<dyn DiagramCompiler>,
    cache: Mutex<DiagramCache>,
    in_flight: Mutex<HashMap<String, SharedCompile>>,
    compiles: AtomicU64,
    hits: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl DiagramCoordinator {
    pub fn new(compiler: Arc<dyn DiagramCompiler>, cache_capacity: Option<usize>) -> Self {
        Self {
            compiler,
            cache: Mutex::new(DiagramCache::new(cache_capacity)),
            in_flight: Mutex::new(HashMap::new()),
            compiles: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    /// Synchronous cache lookup.
    pub fn cached(&self, code: &str) -> Option<Arc<str>> {
        let graphic = lock(&self.cache).get(code)?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(graphic)
    }

    pub async fn render(&self, code: &str) -> Result<Arc<str>> {
        if let Some(graphic) = self.cached(code) {
            return Ok(graphic);
        }

        let compile = {
            let mut in_flight = lock(&self.in_flight);
            match in_flight.get(code) {
                Some(compile) => {
                    tracing::debug!(len = code.len(), "Joining in-flight diagram compile");
                    compile.clone()
                }
                None => {
                    // A compile may have finished between the lookup above and
                    // taking this lock.
                    if let Some(graphic) = self.cached(code) {
                        return Ok(graphic);
                    }
                    let compile = self.start(code);
                    in_flight.insert(code.to_string(), compile.clone());
                    compile
                }
            }
        };

        let result = compile.clone().await;

        if let Ok(graphic) = &result {
            lock(&self.cache).insert(code, graphic.clone());
        }
        let mut in_flight = lock(&self.in_flight);
        if in_flight.get(code).is_some_and(|current| current.ptr_eq(&compile)) {
            in_flight.remove(code);
        }
        drop(in_flight);

        result
    }

    pub fn stats(&self) -> DiagramStats {
        DiagramStats {
            compiles: self.compiles.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            entries: lock(&self.cache).len(),
        }
    }

    fn start(&self, code: &str) -> SharedCompile {
        self.compiles.fetch_add(1, Ordering::Relaxed);
        let compiler = self.compiler.clone();
        let code = code.to_string();
        async move {
            tracing::debug!(len = code.len(), "Compiling diagram");
            let graphic = compiler
                .compile(&code)
                .await
                .map_err(|e| DiagramError::Compile(e.to_string()))?;
            if graphic.trim().is_empty() {
                return Err(DiagramError::EmptyGraphic);
            }
            Ok(Arc::from(graphic))
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::future::join_all;
    use pretty_assertions::assert_eq;
    use quill_test_kit::CountingCompiler;

    use super::*;

    fn coordinator(compiler: &CountingCompiler) -> DiagramCoordinator {
        DiagramCoordinator::new(Arc::new(compiler.clone()), Some(16))
    }

    #[tokio::test]
    async fn test_render_then_hit() {
        let compiler = CountingCompiler::new();
        let fixture = coordinator(&compiler);

        let first = fixture.render("graph TD\nA-->B").await.unwrap();
        let second = fixture.render("graph TD\nA-->B").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(compiler.calls(), 1);
        assert_eq!(fixture.stats(), DiagramStats { compiles: 1, hits: 1, entries: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_compile_once() {
        let compiler = CountingCompiler::new().delay(Duration::from_millis(100));
        let fixture = coordinator(&compiler);

        let actual = join_all((0..5).map(|_| fixture.render("graph LR\nX-->Y"))).await;

        let expected = Arc::<str>::from(CountingCompiler::graphic("graph LR\nX-->Y"));
        assert_eq!(compiler.calls(), 1);
        for result in actual {
            assert_eq!(result.unwrap(), expected);
        }
        assert_eq!(fixture.stats().entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_sources_compile_separately() {
        let compiler = CountingCompiler::new().delay(Duration::from_millis(10));
        let fixture = coordinator(&compiler);

        let actual = join_all([fixture.render("graph A"), fixture.render("graph B")]).await;

        assert!(actual.iter().all(|r| r.is_ok()));
        assert_eq!(compiler.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let compiler = CountingCompiler::new();
        compiler.set_failing(true);
        let fixture = coordinator(&compiler);

        let actual = fixture.render("graph ???").await;
        assert!(matches!(actual, Err(DiagramError::Compile(_))));
        assert!(fixture.cached("graph ???").is_none());

        compiler.set_failing(false);
        let actual = fixture.render("graph ???").await;

        assert!(actual.is_ok());
        assert_eq!(compiler.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_share_failure() {
        let compiler = CountingCompiler::new().delay(Duration::from_millis(50));
        compiler.set_failing(true);
        let fixture = coordinator(&compiler);

        let actual = join_all((0..3).map(|_| fixture.render("bad"))).await;

        assert_eq!(compiler.calls(), 1);
        assert!(actual.iter().all(|r| r.is_err()));
    }

    struct BlankCompiler;

    #[async_trait::async_trait]
    impl DiagramCompiler for BlankCompiler {
        async fn compile(&self, _code: &str) -> quill_domain::Result<String> {
            Ok("  ".to_string())
        }
    }

    #[tokio::test]
    async fn test_empty_graphic_is_failure() {
        let fixture = DiagramCoordinator::new(Arc::new(BlankCompiler), None);

        let actual = fixture.render("graph TD").await;

        assert_eq!(actual, Err(DiagramError::EmptyGraphic));
        assert_eq!(fixture.stats().entries, 0);
    }
}
