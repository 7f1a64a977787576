use std::sync::Arc;

use derive_setters::Setters;
use quill_diagram::DiagramCoordinator;
use quill_domain::{
    CodeHighlighter, DiagramId, DiagramInstance, DiagramState, MarkdownEngine, MathRenderer,
    RenderStatus, Result, Segment, SourceId,
};
use quill_markup::{
    CmarkEngine, DelimiterMath, Piece, SyntectHighlighter, ToolStatusUpdate, add_copy_buttons,
    split_language_blocks, take_status_updates,
};
use quill_sanitize::{
    dedent_html, looks_like_html_block, repair_fences, restore_math_delimiters, sanitize,
    split_embedded_block,
};

use crate::Document;

/// A diagram instance still waiting for its graphic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramJob {
    pub id: DiagramId,
    pub code: String,
}

/// What one render pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    pub rendered: Vec<SourceId>,
    /// Sources held back by an unterminated diagram fence.
    pub deferred: Vec<SourceId>,
    pub failed: Vec<SourceId>,
    /// Diagrams installed straight from the cache.
    pub installed: Vec<DiagramId>,
    pub jobs: Vec<DiagramJob>,
    /// Instances replaced by this pass.
    pub dropped: Vec<DiagramId>,
    /// Running tool statuses this pass marked as done.
    pub completed: Vec<String>,
}

impl PassReport {
    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty() && self.failed.is_empty()
    }
}

/// Turns the raw text of every stale source into installed segments.
#[derive(Clone, Setters)]
#[setters(into)]
pub struct RenderOrchestrator {
    markdown: Arc<dyn MarkdownEngine>,
    math: Arc<dyn MathRenderer>,
    highlighter: Arc<dyn CodeHighlighter>,
    /// Fence language upgraded into diagrams.
    language: String,
}

impl RenderOrchestrator {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            markdown: Arc::new(CmarkEngine::default()),
            math: Arc::new(DelimiterMath),
            highlighter: Arc::new(SyntectHighlighter::default()),
            language: language.into(),
        }
    }

    pub fn diagram_language(&self) -> &str {
        &self.language
    }

    pub fn render_pass(&self, document: &mut Document, coordinator: &DiagramCoordinator) -> PassReport {
        let mut report = PassReport::default();
        let mut updates: Vec<ToolStatusUpdate> = Vec::new();
        let ids: Vec<SourceId> = document.source_ids().cloned().collect();

        for id in ids {
            let Some(source) = document.source(&id) else { continue };
            if !source.is_stale() {
                continue;
            }
            if source.is_dirty() {
                report.deferred.push(id);
                continue;
            }
            let raw_text = source.raw_text.clone();

            match self.render_markup(&raw_text) {
                Ok(markup) => {
                    let (markup, found) = take_status_updates(&markup);
                    updates.extend(found);
                    self.install(document, &id, &markup, coordinator, &mut report);
                    if let Some(source) = document.source_mut(&id) {
                        source.last_rendered = Some(raw_text);
                        source.status = RenderStatus::Rendered;
                    }
                    report.rendered.push(id);
                }
                Err(error) => {
                    tracing::warn!(source_id = %id, error = %error, "Render failed, keeping previous output");
                    if let Some(source) = document.source_mut(&id) {
                        source.status = RenderStatus::Failed;
                    }
                    report.failed.push(id);
                }
            }
        }

        for update in updates {
            if document.complete_tool_status(&update.target_id, &update.label) {
                report.completed.push(update.target_id);
            }
        }

        if !report.is_empty() || !report.deferred.is_empty() {
            tracing::debug!(
                rendered = report.rendered.len(),
                deferred = report.deferred.len(),
                failed = report.failed.len(),
                jobs = report.jobs.len(),
                "Render pass finished"
            );
        }
        report
    }

    /// Raw text to decorated markup, before diagram upgrade.
    pub fn render_markup(&self, text: &str) -> Result<String> {
        let text = repair_fences(&dedent_html(text));

        let markup = if let Some(embedded) = split_embedded_block(&text) {
            let mut markup = self.to_markup(embedded.prefix)?;
            markup.push_str(embedded.block);
            markup.push_str(&self.to_markup(embedded.suffix)?);
            markup
        } else if looks_like_html_block(&text) {
            return Ok(text);
        } else {
            self.to_markup(&text)?
        };

        let markup = self.math.render(&markup)?;
        let markup = restore_math_delimiters(&markup);
        let markup = self.highlighter.highlight(&markup)?;
        Ok(add_copy_buttons(&markup))
    }

    fn to_markup(&self, text: &str) -> Result<String> {
        self.markdown.render(&sanitize(text))
    }

    /// Splits markup into segments, replacing the source's previous diagram
    /// instances with fresh ones.
    fn install(
        &self,
        document: &mut Document,
        id: &SourceId,
        markup: &str,
        coordinator: &DiagramCoordinator,
        report: &mut PassReport,
    ) {
        let mut segments: Vec<Segment> = Vec::new();

        for piece in split_language_blocks(markup, &self.language) {
            match piece {
                Piece::Code { code, markup } if code.trim().is_empty() => {
                    push_markup(&mut segments, markup)
                }
                Piece::Markup(markup) => push_markup(&mut segments, markup),
                Piece::Code { code, .. } => {
                    let diagram = document.next_diagram_id();
                    let mut instance = DiagramInstance::new(diagram, id.clone(), code);
                    match coordinator.cached(&instance.code) {
                        Some(graphic) => {
                            instance.state = DiagramState::Rendered(graphic);
                            report.installed.push(diagram);
                        }
                        None => report
                            .jobs
                            .push(DiagramJob { id: diagram, code: instance.code.clone() }),
                    }
                    document.register_diagram(instance);
                    segments.push(Segment::Diagram(diagram));
                }
            }
        }

        let previous: Vec<DiagramId> = document
            .source(id)
            .map(|source| source.diagram_ids().collect())
            .unwrap_or_default();
        document.drop_diagrams(&previous);
        report.dropped.extend(previous);
        if let Some(source) = document.source_mut(id) {
            source.segments = segments;
        }
    }
}

fn push_markup(segments: &mut Vec<Segment>, markup: &str) {
    if markup.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(Segment::Markup(last)) => last.push_str(markup),
        _ => segments.push(Segment::Markup(markup.to_string())),
    }
}
