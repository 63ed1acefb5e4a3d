//! Camera collaborator.
//!
//! The controller only needs preview start, single-shot capture into a
//! working directory, and workdir cleanup. The shipped implementation shells
//! out to the Raspberry Pi camera tools; tests substitute their own.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use anyhow::{Context, Result, bail};
use chrono::Local;
use tracing::{debug, info, warn};

use crate::geometry::Rect;

pub trait Camera {
    /// Start the live preview inside the given screen rectangle.
    fn start_preview(&mut self, window: Rect) -> Result<()>;

    /// Capture one photo and return the file it was written to.
    fn capture_photo(&mut self) -> Result<PathBuf>;

    /// Delete leftover captures from previous runs.
    fn clear_workdir(&mut self) -> Result<()>;
}

/// Camera backed by the `rpicam-vid`/`rpicam-still` command line tools.
pub struct RpicamCamera {
    workdir: PathBuf,
    resolution: (u32, u32),
    preview: Option<Child>,
}

impl RpicamCamera {
    pub fn new(workdir: impl Into<PathBuf>, resolution: (u32, u32)) -> Result<Self> {
        let workdir = workdir.into();
        fs::create_dir_all(&workdir)
            .with_context(|| format!("failed to create workdir {}", workdir.display()))?;
        Ok(Self {
            workdir,
            resolution,
            preview: None,
        })
    }

    fn capture_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d-%H%M%S%.3f");
        self.workdir.join(format!("capture-{stamp}.jpg"))
    }
}

impl Camera for RpicamCamera {
    fn start_preview(&mut self, window: Rect) -> Result<()> {
        info!(?window, "starting camera preview");
        let child = Command::new("rpicam-vid")
            .arg("--timeout")
            .arg("0")
            .arg("--nopreview=0")
            .arg("--preview")
            .arg(format!(
                "{},{},{},{}",
                window.x, window.y, window.width, window.height
            ))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn rpicam-vid preview")?;
        self.preview = Some(child);
        Ok(())
    }

    fn capture_photo(&mut self) -> Result<PathBuf> {
        let path = self.capture_path();
        debug!(path = %path.display(), "capturing photo");
        let status = Command::new("rpicam-still")
            .arg("--immediate")
            .arg("--nopreview")
            .arg("--width")
            .arg(self.resolution.0.to_string())
            .arg("--height")
            .arg(self.resolution.1.to_string())
            .arg("-o")
            .arg(&path)
            .status()
            .context("failed to spawn rpicam-still")?;
        if !status.success() {
            bail!("rpicam-still exited with status {status}");
        }
        Ok(path)
    }

    fn clear_workdir(&mut self) -> Result<()> {
        clear_dir(&self.workdir)
    }
}

impl Drop for RpicamCamera {
    fn drop(&mut self) {
        if let Some(mut child) = self.preview.take() {
            if let Err(err) = child.kill() {
                warn!("failed to stop camera preview: {err}");
            }
            let _ = child.wait();
        }
    }
}

fn clear_dir(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)
        .with_context(|| format!("failed to read workdir {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::remove_file(entry.path())
                .with_context(|| format!("failed to remove {}", entry.path().display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::clear_dir;
    use std::fs;

    #[test]
    fn clear_dir_removes_files_but_not_subdirs() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.jpg"), b"x")?;
        fs::create_dir(dir.path().join("keep"))?;

        clear_dir(dir.path())?;

        assert!(!dir.path().join("a.jpg").exists());
        assert!(dir.path().join("keep").exists());
        Ok(())
    }
}
