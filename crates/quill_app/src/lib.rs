mod document;
mod orchestrator;
mod pipeline;
mod scheduler;
mod transfer;
mod watcher;

pub use document::Document;
pub use orchestrator::{DiagramJob, PassReport, RenderOrchestrator};
pub use pipeline::{MessagePhase, Pipeline, PipelineEvent, SwapPhase};
pub use scheduler::RenderScheduler;
pub use transfer::{CopyOutcome, EXPORT_MIME, ExportFile, IMPORT_PREFIX, copy_text, export_file, import_payload};
pub use watcher::{MutationWatcher, decode_raw_text};
