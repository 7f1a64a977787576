use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use quill_diagram::{DiagramError, Transform};
use quill_domain::{
    ContentSource, DiagramId, DiagramInstance, DiagramState, Segment, SourceId,
};
use quill_markup::{escape_html, has_element, mark_done};

/// Every content source in display order plus the diagram instances their
/// segments point at.
#[derive(Debug, Default)]
pub struct Document {
    sources: IndexMap<SourceId, ContentSource>,
    diagrams: HashMap<DiagramId, DiagramInstance>,
    next_diagram: u64,
    /// Finished tool statuses, keyed by the id of the running element.
    tool_status: IndexMap<String, String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the source with `id`, appending an empty one if it is new.
    pub fn upsert(&mut self, id: &SourceId) -> &mut ContentSource {
        self.sources
            .entry(id.clone())
            .or_insert_with(|| ContentSource::new(id.clone()))
    }

    pub fn source(&self, id: &SourceId) -> Option<&ContentSource> {
        self.sources.get(id)
    }

    pub fn source_mut(&mut self, id: &SourceId) -> Option<&mut ContentSource> {
        self.sources.get_mut(id)
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &SourceId> {
        self.sources.keys()
    }

    pub fn sources(&self) -> impl Iterator<Item = &ContentSource> {
        self.sources.values()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Removes a source and its diagram instances, returning the ids of the
    /// dropped instances.
    pub fn remove(&mut self, id: &SourceId) -> Vec<DiagramId> {
        let Some(source) = self.sources.shift_remove(id) else {
            return Vec::new();
        };
        let ids: Vec<DiagramId> = source.diagram_ids().collect();
        self.drop_diagrams(&ids);

        let orphaned: Vec<String> = self
            .tool_status
            .keys()
            .filter(|target| !self.has_element(target))
            .cloned()
            .collect();
        for target in orphaned {
            self.tool_status.shift_remove(&target);
        }
        ids
    }

    /// Whether any installed markup holds an element with `id`.
    pub fn has_element(&self, id: &str) -> bool {
        self.sources.values().flat_map(|source| &source.segments).any(|segment| match segment {
            Segment::Markup(markup) => has_element(markup, id),
            Segment::Diagram(_) => false,
        })
    }

    /// Marks the running tool status `target_id` as done. Returns `false`, and
    /// records nothing, when no element carries that id.
    pub fn complete_tool_status(&mut self, target_id: &str, label: &str) -> bool {
        if !self.has_element(target_id) {
            tracing::debug!(target_id = %target_id, "Dropping tool status update without a target");
            return false;
        }
        self.tool_status.insert(target_id.to_string(), label.to_string());
        true
    }

    pub fn tool_status(&self, target_id: &str) -> Option<&str> {
        self.tool_status.get(target_id).map(String::as_str)
    }

    pub fn next_diagram_id(&mut self) -> DiagramId {
        self.next_diagram += 1;
        DiagramId::new(self.next_diagram)
    }

    pub fn register_diagram(&mut self, instance: DiagramInstance) {
        self.diagrams.insert(instance.id, instance);
    }

    pub fn drop_diagrams(&mut self, ids: &[DiagramId]) {
        for id in ids {
            self.diagrams.remove(id);
        }
    }

    pub fn diagram(&self, id: DiagramId) -> Option<&DiagramInstance> {
        self.diagrams.get(&id)
    }

    pub fn diagrams(&self) -> impl Iterator<Item = &DiagramInstance> {
        self.diagrams.values()
    }

    /// Installs a compile outcome. Returns `false` when the instance no longer
    /// exists, in which case nothing changes.
    pub fn apply_diagram(
        &mut self,
        id: DiagramId,
        result: std::result::Result<Arc<str>, DiagramError>,
    ) -> bool {
        let Some(instance) = self.diagrams.get_mut(&id) else {
            tracing::debug!(diagram = %id, "Discarding result for removed diagram");
            return false;
        };
        instance.state = match result {
            Ok(graphic) => DiagramState::Rendered(graphic),
            Err(error) => {
                tracing::warn!(diagram = %id, source_id = %instance.source_id, error = %error, "Diagram compile failed");
                DiagramState::Failed(error.to_string())
            }
        };
        true
    }

    pub fn html(&self, id: &SourceId) -> Option<String> {
        self.html_with(id, |_| None)
    }

    /// Composes the installed output of a source. `transform` supplies the
    /// pan/zoom transform of each rendered diagram.
    pub fn html_with(
        &self,
        id: &SourceId,
        transform: impl Fn(DiagramId) -> Option<Transform>,
    ) -> Option<String> {
        let source = self.sources.get(id)?;
        let mut html = String::new();
        for segment in &source.segments {
            match segment {
                Segment::Markup(markup) if self.tool_status.is_empty() => html.push_str(markup),
                Segment::Markup(markup) => html.push_str(&mark_done(markup, |target| {
                    self.tool_status.get(target).cloned()
                })),
                Segment::Diagram(diagram) => match self.diagrams.get(diagram) {
                    Some(instance) => push_diagram(&mut html, instance, transform(*diagram)),
                    None => tracing::debug!(diagram = %diagram, "Segment points at a missing diagram"),
                },
            }
        }
        Some(html)
    }
}

fn push_diagram(html: &mut String, instance: &DiagramInstance, transform: Option<Transform>) {
    let id = instance.id;
    match &instance.state {
        DiagramState::Pending => html.push_str(&format!(
            r#"<div class="diagram diagram-pending" id="{id}"><pre>{}</pre></div>"#,
            escape_html(&instance.code)
        )),
        DiagramState::Rendered(graphic) => {
            let style = transform
                .map(|t| format!(r#" style="transform: {t}; transform-origin: center center""#))
                .unwrap_or_default();
            html.push_str(&format!(
                r#"<div class="diagram" id="{id}"><div class="diagram-graphic"{style}>{graphic}</div></div>"#
            ));
        }
        DiagramState::Failed(_) => html.push_str(&format!(
            r#"<div class="diagram" id="{id}"><div class="diagram-error">Invalid diagram</div></div>"#
        )),
    }
}
