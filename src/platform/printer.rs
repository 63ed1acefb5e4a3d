//! Print launch.
//!
//! The strip is handed to an operator-configured shell command with a
//! `{filename}` placeholder. The process is detached; whatever the spooler
//! does afterwards is invisible to the booth.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::info;

pub trait Printer {
    fn print(&self, strip: &Path) -> Result<()>;
}

pub struct CommandPrinter {
    template: String,
}

impl CommandPrinter {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Printer for CommandPrinter {
    fn print(&self, strip: &Path) -> Result<()> {
        let command = self
            .template
            .replace("{filename}", &strip.display().to_string());
        info!(%command, "launching print command");
        Command::new("sh")
            .arg("-c")
            .arg(&command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to launch print command: {command}"))?;
        Ok(())
    }
}
