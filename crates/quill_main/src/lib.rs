mod cli;
mod compiler;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
pub use cli::{Cli, Command};
pub use compiler::{CommandCompiler, NoCompiler};
use quill_app::{Pipeline, PipelineEvent};
use quill_config::{ConfigReader, RenderConfig};
use quill_domain::{ContentEvent, DiagramCompiler, SourceId};
use quill_scroll::MemorySurface;
use tokio::sync::mpsc;

/// Runs one CLI invocation, writing rendered markup to stdout.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = read_config(&cli)?;
    let compiler = compiler(cli.diagram_command.as_deref());
    let pipeline = Pipeline::new(config.clone(), compiler, Arc::new(MemorySurface::new(0.0, 0.0)));

    match cli.command {
        Command::Render { path } => {
            let html = render_file(pipeline, &path).await?;
            println!("{html}");
        }
        Command::Replay { path, debug_log } => {
            let (html, dump) = replay_file(pipeline, &config, &path).await?;
            println!("{html}");
            if debug_log {
                eprintln!("{dump}");
            }
        }
    }
    Ok(())
}

fn read_config(cli: &Cli) -> anyhow::Result<RenderConfig> {
    let reader = match &cli.config {
        Some(path) => ConfigReader::new().path(path),
        None => ConfigReader::new(),
    };
    reader.read().context("Failed to read configuration")
}

fn compiler(command_line: Option<&str>) -> Arc<dyn DiagramCompiler> {
    match command_line.and_then(CommandCompiler::parse) {
        Some(compiler) => Arc::new(compiler),
        None => {
            tracing::info!("No diagram command configured, diagrams will show as errors");
            Arc::new(NoCompiler)
        }
    }
}

/// Renders a whole Markdown file as a single region named after the file.
pub async fn render_file(mut pipeline: Pipeline, path: &Path) -> anyhow::Result<String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let id = path
        .file_stem()
        .map(|stem| SourceId::new(stem.to_string_lossy()))
        .unwrap_or_else(|| SourceId::from("document"));

    pipeline.handle(PipelineEvent::Content(ContentEvent::plain(id.clone(), text)));
    pipeline.frame();
    pipeline.settle().await;

    pipeline
        .html(&id)
        .with_context(|| format!("Nothing rendered for {}", path.display()))
}

/// Streams a JSON-lines transcript through the pipeline, one event per frame.
/// Returns every region's markup and the scroll debug log.
pub async fn replay_file(
    mut pipeline: Pipeline,
    config: &RenderConfig,
    path: &Path,
) -> anyhow::Result<(String, String)> {
    let transcript = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let events = parse_transcript(&transcript)?;
    tracing::debug!(events = events.len(), "Replaying transcript");

    let (tx, rx) = mpsc::channel(events.len().max(1));
    let interval = config.frame_interval();
    let producer = tokio::spawn(async move {
        for event in events {
            if tx.send(PipelineEvent::Content(event)).await.is_err() {
                break;
            }
            tokio::time::sleep(interval).await;
        }
    });

    pipeline.run(rx).await;
    producer.await.context("Transcript producer panicked")?;

    let html = pipeline
        .render_all()
        .into_iter()
        .map(|(id, html)| format!("<div class=\"message\" id=\"{id}\">{html}</div>"))
        .collect::<Vec<_>>()
        .join("\n");
    let dump = pipeline.dump_scroll_debug().context("Failed to serialize scroll log")?;
    Ok((html, dump))
}

fn parse_transcript(transcript: &str) -> anyhow::Result<Vec<ContentEvent>> {
    transcript
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid event on line {}", index + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pipeline() -> Pipeline {
        Pipeline::new(
            RenderConfig::default(),
            Arc::new(NoCompiler),
            Arc::new(MemorySurface::new(0.0, 0.0)),
        )
    }

    #[test]
    fn test_parse_transcript_skips_blank_lines() {
        let fixture = "{\"id\":\"m1\",\"text\":\"Hi\"}\n\n{\"id\":\"m2\",\"text_b64\":\"SGk=\"}\n";

        let actual = parse_transcript(fixture).unwrap();
        let expected = vec![ContentEvent::plain("m1", "Hi"), ContentEvent::base64("m2", "SGk=")];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_parse_transcript_reports_line() {
        let fixture = "{\"id\":\"m1\",\"text\":\"Hi\"}\nnot json";

        let actual = parse_transcript(fixture).unwrap_err();

        assert_eq!(actual.to_string(), "Invalid event on line 2");
    }

    #[tokio::test]
    async fn test_render_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Title\n\nCost: \\$3").unwrap();

        let actual = render_file(pipeline(), &path).await.unwrap();
        let expected = "<h1>Title</h1>\n<p>Cost: $3</p>\n";

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_render_file_without_compiler_shows_error_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.md");
        std::fs::write(&path, "```mermaid\ngraph TD\n```").unwrap();

        let actual = render_file(pipeline(), &path).await.unwrap();

        assert!(actual.contains("Invalid diagram"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.jsonl");
        std::fs::write(
            &path,
            "{\"id\":\"m1\",\"text\":\"Hel\"}\n{\"id\":\"m1\",\"text\":\"Hello\"}\n{\"id\":\"m2\",\"text_b64\":\"SGk=\"}\n",
        )
        .unwrap();

        let (actual, dump) = replay_file(pipeline(), &RenderConfig::default(), &path).await.unwrap();
        let expected = "<div class=\"message\" id=\"m1\"><p>Hello</p>\n</div>\n<div class=\"message\" id=\"m2\"><p>Hi</p>\n</div>";

        assert_eq!(actual, expected);
        assert!(dump.starts_with('['));
    }
}
