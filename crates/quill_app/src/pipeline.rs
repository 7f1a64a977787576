use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::join_all;
use quill_config::RenderConfig;
use quill_diagram::{DiagramCoordinator, Transform, ViewportController, graphic_size};
use quill_domain::{
    ContentEvent, DiagramCompiler, DiagramId, DiagramState, RenderStatus, ScrollSnapshot,
    ScrollSurface, Size, SourceId,
};
use quill_markup::copy_block;
use quill_scroll::{BottomLock, ScrollAnchor, ScrollDebugLog, ScrollEventKind};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{DiagramJob, Document, MutationWatcher, PassReport, RenderOrchestrator, RenderScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePhase {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPhase {
    Before,
    After,
}

/// Everything the host can tell the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Content(ContentEvent),
    Removed(SourceId),
    /// A transport message is about to be, or has been, applied.
    StreamMessage(MessagePhase),
    /// The host scrolled the surface on the reader's behalf.
    UserScroll,
    /// The host replaced content outside the pipeline.
    Swap { phase: SwapPhase, target_id: Option<String> },
    FocusIn,
    DiagramResized { id: DiagramId, container: Size },
}

/// Locks are taken document first, then viewport, and never held across an
/// await.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Drives rendering for one document: collects events, runs at most one
/// render pass per frame, compiles diagrams off the frame and keeps the
/// scroll position where the reader expects it.
pub struct Pipeline {
    config: RenderConfig,
    document: Arc<Mutex<Document>>,
    viewport: Arc<Mutex<ViewportController>>,
    debug_log: Arc<Mutex<ScrollDebugLog>>,
    coordinator: Arc<DiagramCoordinator>,
    scheduler: RenderScheduler,
    watcher: MutationWatcher,
    orchestrator: RenderOrchestrator,
    anchor: ScrollAnchor,
    bottom_lock: BottomLock,
    pending_swap: Option<ScrollSnapshot>,
    tasks: JoinSet<()>,
}

impl Pipeline {
    pub fn new(
        config: RenderConfig,
        compiler: Arc<dyn DiagramCompiler>,
        surface: Arc<dyn ScrollSurface>,
    ) -> Self {
        let coordinator = DiagramCoordinator::new(compiler, config.diagram.cache_capacity);
        Self {
            document: Arc::new(Mutex::new(Document::new())),
            viewport: Arc::new(Mutex::new(ViewportController::new(config.viewport.clone()))),
            debug_log: Arc::new(Mutex::new(ScrollDebugLog::new(config.scroll.debug_log_capacity))),
            coordinator: Arc::new(coordinator),
            scheduler: RenderScheduler::new(),
            watcher: MutationWatcher::new(config.diagram.language.clone()),
            orchestrator: RenderOrchestrator::new(config.diagram.language.clone()),
            anchor: ScrollAnchor::new(surface, &config.scroll),
            bottom_lock: BottomLock::new(&config.scroll),
            pending_swap: None,
            tasks: JoinSet::new(),
            config,
        }
    }

    /// Replaces the default Markdown, math and highlighting collaborators.
    pub fn orchestrator(mut self, orchestrator: RenderOrchestrator) -> Self {
        self.orchestrator = orchestrator.language(self.config.diagram.language.clone());
        self
    }

    /// Processes events until the sender side closes, then renders whatever is
    /// still pending and waits for outstanding diagram work.
    pub async fn run(&mut self, mut events: mpsc::Receiver<PipelineEvent>) {
        let mut frames = tokio::time::interval(self.config.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
                _ = frames.tick() => {
                    self.frame();
                }
            }
        }

        self.frame();
        self.settle().await;
    }

    pub fn handle(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Content(event) => {
                let changed = self.watcher.observe(&mut lock(&self.document), event);
                if changed {
                    self.scheduler.request();
                }
            }
            PipelineEvent::Removed(id) => {
                let dropped = lock(&self.document).remove(&id);
                let mut viewport = lock(&self.viewport);
                for diagram in &dropped {
                    viewport.remove(*diagram);
                }
                tracing::debug!(source_id = %id, diagrams = dropped.len(), "Content source removed");
            }
            PipelineEvent::StreamMessage(phase) => {
                let kind = match phase {
                    MessagePhase::Before => ScrollEventKind::WsBeforeMessage,
                    MessagePhase::After => ScrollEventKind::WsAfterMessage,
                };
                self.record(kind, None);
                if let Some(metrics) = self.anchor.surface().metrics() {
                    self.bottom_lock.engage(Instant::now(), metrics);
                }
            }
            PipelineEvent::UserScroll => {
                if let Some(metrics) = self.anchor.surface().metrics() {
                    lock(&self.debug_log).record_scroll(metrics.scroll_top);
                    self.bottom_lock.user_scrolled(metrics);
                }
            }
            PipelineEvent::Swap { phase: SwapPhase::Before, target_id } => {
                self.record(ScrollEventKind::BeforeSwap, target_id);
                self.pending_swap = self.anchor.snapshot();
            }
            PipelineEvent::Swap { phase: SwapPhase::After, target_id } => {
                self.record(ScrollEventKind::AfterSwap, target_id);
                let snapshot = self.pending_swap.take();
                self.reconcile_scroll(snapshot);
            }
            PipelineEvent::FocusIn => self.record(ScrollEventKind::FocusIn, None),
            PipelineEvent::DiagramResized { id, container } => {
                let graphic = self.graphic_size_of(id);
                if let Some(graphic) = graphic {
                    lock(&self.viewport).fit_to_container(id, container, graphic);
                }
            }
        }
    }

    /// One frame: hold the bottom lock, reap finished diagram work and run the
    /// pending render pass, if any.
    pub fn frame(&mut self) -> Option<PassReport> {
        if self.bottom_lock.tick(Instant::now()) {
            self.anchor.pin_to_bottom();
        }
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(error) = joined {
                tracing::warn!(error = %error, "Diagram task failed");
            }
        }
        if !self.scheduler.take() {
            return None;
        }
        Some(self.render_pass())
    }

    /// Runs a render pass now, regardless of the scheduler.
    pub fn render_pass(&mut self) -> PassReport {
        let snapshot = self.anchor.snapshot();
        self.record(ScrollEventKind::BeforeSwap, None);

        let report = {
            let mut document = lock(&self.document);
            self.orchestrator.render_pass(&mut document, &self.coordinator)
        };

        if !report.dropped.is_empty() {
            let mut viewport = lock(&self.viewport);
            for id in &report.dropped {
                viewport.remove(*id);
            }
        }
        for id in &report.installed {
            self.fit_default(*id);
        }
        if !report.is_empty() {
            self.reconcile_scroll(snapshot);
        }
        self.record(ScrollEventKind::AfterSwap, None);

        if !report.jobs.is_empty() {
            self.spawn_diagrams(report.jobs.clone());
        }
        report
    }

    /// Waits for every spawned diagram batch and scroll settle.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(error) = joined {
                tracing::warn!(error = %error, "Diagram task failed");
            }
        }
    }

    pub fn html(&self, id: &SourceId) -> Option<String> {
        let document = lock(&self.document);
        let viewport = lock(&self.viewport);
        document.html_with(id, |diagram| viewport.transform(diagram))
    }

    /// Composed output of every source in display order.
    pub fn render_all(&self) -> Vec<(SourceId, String)> {
        let document = lock(&self.document);
        let viewport = lock(&self.viewport);
        document
            .source_ids()
            .filter_map(|id| {
                let html = document.html_with(id, |diagram| viewport.transform(diagram))?;
                Some((id.clone(), html))
            })
            .collect()
    }

    pub fn source_text(&self, id: &SourceId) -> Option<String> {
        lock(&self.document).source(id).map(|source| source.raw_text.clone())
    }

    pub fn status(&self, id: &SourceId) -> Option<RenderStatus> {
        lock(&self.document).source(id).map(|source| source.status)
    }

    pub fn diagram_state(&self, id: DiagramId) -> Option<DiagramState> {
        lock(&self.document).diagram(id).map(|instance| instance.state.clone())
    }

    /// Plain text behind the copy button numbered `index` in a source.
    pub fn code_block(&self, id: &SourceId, index: usize) -> Option<String> {
        let html = lock(&self.document).html(id)?;
        copy_block(&html, index)
    }

    /// Runs `f` against the pan/zoom state of every diagram.
    pub fn with_viewport<R>(&self, f: impl FnOnce(&mut ViewportController) -> R) -> R {
        f(&mut lock(&self.viewport))
    }

    pub fn transform(&self, id: DiagramId) -> Option<Transform> {
        lock(&self.viewport).transform(id)
    }

    pub fn coordinator(&self) -> &Arc<DiagramCoordinator> {
        &self.coordinator
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn dump_scroll_debug(&self) -> serde_json::Result<String> {
        lock(&self.debug_log).dump()
    }

    fn record(&self, kind: ScrollEventKind, target_id: Option<String>) {
        let scroll_top = self
            .anchor
            .surface()
            .metrics()
            .map_or(0.0, |metrics| metrics.scroll_top);
        lock(&self.debug_log).record(kind, scroll_top, target_id);
    }

    /// Restores the offset of a reader scrolled up right away. A pinned reader
    /// is pinned now and again while layout settles.
    fn reconcile_scroll(&mut self, snapshot: Option<ScrollSnapshot>) {
        let Some(snapshot) = snapshot else { return };
        self.anchor.restore(snapshot);
        if snapshot.at_bottom {
            let anchor = self.anchor.clone();
            self.tasks.spawn(async move { anchor.force_to_bottom().await });
        }
    }

    fn graphic_size_of(&self, id: DiagramId) -> Option<Size> {
        match &lock(&self.document).diagram(id)?.state {
            DiagramState::Rendered(graphic) => graphic_size(graphic),
            _ => None,
        }
    }

    fn fit_default(&self, id: DiagramId) {
        if let Some(graphic) = self.graphic_size_of(id) {
            let container = self.config.diagram.default_container;
            lock(&self.viewport).fit_to_container(id, container, graphic);
        }
    }

    fn spawn_diagrams(&mut self, jobs: Vec<DiagramJob>) {
        let batch = DiagramBatch {
            jobs,
            debounce: self.config.diagram.debounce(),
            container: self.config.diagram.default_container,
            document: self.document.clone(),
            viewport: self.viewport.clone(),
            coordinator: self.coordinator.clone(),
            anchor: self.anchor.clone(),
        };
        self.tasks.spawn(batch.run());
    }
}

/// Diagram compiles started by one render pass.
struct DiagramBatch {
    jobs: Vec<DiagramJob>,
    debounce: Duration,
    container: Size,
    document: Arc<Mutex<Document>>,
    viewport: Arc<Mutex<ViewportController>>,
    coordinator: Arc<DiagramCoordinator>,
    anchor: ScrollAnchor,
}

impl DiagramBatch {
    async fn run(self) {
        tokio::time::sleep(self.debounce).await;

        let pending: Vec<&DiagramJob> = {
            let document = lock(&self.document);
            self.jobs
                .iter()
                .filter(|job| document.diagram(job.id).is_some_and(|d| d.is_pending()))
                .collect()
        };
        if pending.is_empty() {
            return;
        }

        let snapshot = self.anchor.snapshot();
        let results = join_all(pending.iter().map(|job| self.coordinator.render(&job.code))).await;

        {
            let mut document = lock(&self.document);
            let mut viewport = lock(&self.viewport);
            for (job, result) in pending.iter().zip(results) {
                let size = result.as_ref().ok().and_then(|graphic| graphic_size(graphic));
                if document.apply_diagram(job.id, result)
                    && let Some(graphic) = size
                {
                    viewport.fit_to_container(job.id, self.container, graphic);
                }
            }
        }

        self.anchor.reconcile(snapshot).await;
    }
}
