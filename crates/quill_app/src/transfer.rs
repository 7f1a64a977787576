use chrono::{DateTime, SecondsFormat, Utc};
use quill_domain::{Clipboard, Result};

pub const EXPORT_MIME: &str = "application/json";
pub const IMPORT_PREFIX: &str = "__QUILL_IMPORT__:";
const DEFAULT_SLUG: &str = "quill-conversation";

/// Which clipboard path accepted the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Modern,
    Legacy,
}

/// Writes `text` through the modern clipboard, falling back to the legacy
/// path when that fails.
pub async fn copy_text(clipboard: &dyn Clipboard, text: &str) -> Result<CopyOutcome> {
    match clipboard.write_text(text).await {
        Ok(()) => Ok(CopyOutcome::Modern),
        Err(error) => {
            tracing::debug!(error = %error, "Clipboard write failed, trying legacy copy");
            clipboard.write_text_legacy(text)?;
            Ok(CopyOutcome::Legacy)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub mime: &'static str,
    pub body: String,
}

/// Packages a conversation for download as `<slug>-<timestamp>.json`.
pub fn export_file(conversation_json: &str, title: Option<&str>, at: DateTime<Utc>) -> ExportFile {
    let slug = title.map(slugify).filter(|slug| !slug.is_empty());
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let body = if conversation_json.trim().is_empty() {
        "[]".to_string()
    } else {
        conversation_json.to_string()
    };

    ExportFile {
        name: format!("{}-{stamp}.json", slug.as_deref().unwrap_or(DEFAULT_SLUG)),
        mime: EXPORT_MIME,
        body,
    }
}

/// Validates an uploaded conversation and tags it for the host. Anything that
/// is not JSON is ignored.
pub fn import_payload(text: &str) -> Option<String> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => Some(format!("{IMPORT_PREFIX}{value}")),
        Err(error) => {
            tracing::debug!(error = %error, "Ignoring import that is not valid JSON");
            None
        }
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
