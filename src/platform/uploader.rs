//! Background upload.
//!
//! Captures are handed to a helper command on a detached thread, one
//! invocation per photo, fire-and-forget: the booth neither waits for nor
//! learns about the outcome. The thread owns its own copy of the capture
//! list, so the next booth run mutating the controller's list cannot touch
//! it; the upload may still outlive the run that started it.

use std::path::PathBuf;
use std::process::Command;
use std::thread;

use tracing::{info, warn};

pub trait Uploader {
    /// Upload the photos without blocking the caller.
    fn upload_in_background(&self, photos: Vec<PathBuf>, caption: String);
}

/// Uploader invoking a shell command template with `{filename}` and
/// `{caption}` placeholders for each photo.
pub struct CommandUploader {
    template: String,
}

impl CommandUploader {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Uploader for CommandUploader {
    fn upload_in_background(&self, photos: Vec<PathBuf>, caption: String) {
        let template = self.template.clone();
        thread::spawn(move || {
            info!(count = photos.len(), "upload started");
            for photo in &photos {
                let command = template
                    .replace("{filename}", &photo.display().to_string())
                    .replace("{caption}", &caption);
                match Command::new("sh").arg("-c").arg(&command).status() {
                    Ok(status) if status.success() => {}
                    Ok(status) => warn!(%command, "upload command exited with status {status}"),
                    Err(err) => warn!(%command, "failed to launch upload command: {err}"),
                }
            }
            info!(count = photos.len(), "upload finished");
        });
    }
}
