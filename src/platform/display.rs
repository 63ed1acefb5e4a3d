//! Screen output.
//!
//! The UI frame is pushed as a whole into the framebuffer device sitting
//! above the camera preview. Opening waits up to ten seconds for the device
//! to appear; a display that never shows up is a fatal startup failure.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use image::RgbaImage;
use tracing::{info, warn};

use crate::error::Error;

/// Resolution assumed when the display cannot report one.
pub const FALLBACK_RESOLUTION: (u32, u32) = (1280, 720);

const READY_POLL: Duration = Duration::from_millis(100);

pub trait Display {
    /// Native screen resolution, before hardware alignment.
    fn resolution(&self) -> (u32, u32);

    /// Push a full frame to the screen overlay.
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<()>;
}

/// Display writing BGRA frames straight into a Linux framebuffer device.
#[derive(Debug)]
pub struct FramebufferDisplay {
    device: File,
    resolution: (u32, u32),
}

impl FramebufferDisplay {
    /// Open the framebuffer, polling until it is ready or `timeout` passes.
    pub fn open(path: &Path, timeout: Duration) -> Result<Self, Error> {
        let start = Instant::now();
        loop {
            match OpenOptions::new().write(true).open(path) {
                Ok(device) => {
                    let resolution = probe_resolution(path).unwrap_or_else(|| {
                        warn!(
                            "display resolution unavailable; assuming {}x{}",
                            FALLBACK_RESOLUTION.0, FALLBACK_RESOLUTION.1
                        );
                        FALLBACK_RESOLUTION
                    });
                    info!(
                        device = %path.display(),
                        width = resolution.0,
                        height = resolution.1,
                        "framebuffer ready"
                    );
                    return Ok(Self { device, resolution });
                }
                Err(err) => {
                    let waited = start.elapsed();
                    if waited >= timeout {
                        warn!("framebuffer never became ready: {err}");
                        return Err(Error::HardwareTimeout {
                            what: "framebuffer",
                            waited,
                        });
                    }
                    thread::sleep(READY_POLL);
                }
            }
        }
    }
}

impl Display for FramebufferDisplay {
    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn push_frame(&mut self, frame: &RgbaImage) -> Result<()> {
        use std::os::unix::fs::FileExt;

        let mut out = Vec::with_capacity(frame.as_raw().len());
        for pixel in frame.pixels() {
            // Framebuffer expects BGRA byte order.
            out.extend_from_slice(&[pixel.0[2], pixel.0[1], pixel.0[0], pixel.0[3]]);
        }
        self.device.write_all_at(&out, 0)?;
        Ok(())
    }
}

/// Read `<w>,<h>` from the sysfs size node that pairs with the device.
fn probe_resolution(device: &Path) -> Option<(u32, u32)> {
    let name = device.file_name()?.to_str()?;
    let sysfs = PathBuf::from(format!("/sys/class/graphics/{name}/virtual_size"));
    let raw = fs::read_to_string(sysfs).ok()?;
    parse_virtual_size(&raw)
}

fn parse_virtual_size(raw: &str) -> Option<(u32, u32)> {
    let mut parts = raw.trim().split(',');
    let width = parts.next()?.trim().parse().ok()?;
    let height = parts.next()?.trim().parse().ok()?;
    Some((width, height))
}
