use std::process::Stdio;

use anyhow::{Context, bail};
use async_trait::async_trait;
use quill_domain::{DiagramCompiler, Error, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Compiles diagrams by piping their source through an external command.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
}

impl CommandCompiler {
    /// Splits a command line on whitespace. Returns `None` for a blank line.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self { program, args: parts.collect() })
    }

    async fn execute(&self, code: &str) -> anyhow::Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn diagram command '{}'", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes()).await.context("Failed to write diagram source")?;
        }

        let output = child.wait_with_output().await.context("Diagram command did not finish")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{}", stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl DiagramCompiler for CommandCompiler {
    async fn compile(&self, code: &str) -> Result<String> {
        self.execute(code)
            .await
            .map_err(|error| Error::DiagramCompile(format!("{error:#}")))
    }
}

/// Used when no diagram command is configured; every diagram fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompiler;

#[async_trait]
impl DiagramCompiler for NoCompiler {
    async fn compile(&self, _code: &str) -> Result<String> {
        Err(Error::DiagramCompile("no diagram compiler configured".to_string()))
    }
}
