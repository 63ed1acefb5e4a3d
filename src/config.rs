use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::booth::{BoothSettings, StateDurations};

/// Load and parse the YAML configuration file.
pub fn from_yaml_file(path: &Path) -> Result<Configuration> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let cfg: Configuration = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    Ok(cfg)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    /// Photos captured per booth run.
    #[serde(default = "Configuration::default_photo_count")]
    pub photo_count: usize,

    /// Capture resolution, `[width, height]`.
    #[serde(default = "Configuration::default_photo_resolution")]
    pub photo_resolution: [u32; 2],

    /// Scale applied to each photo when placed on the strip.
    #[serde(default = "Configuration::default_strip_ratio")]
    pub strip_ratio: f32,

    /// When set, the "no" button can never leave the kiosk.
    #[serde(default)]
    pub disable_quit: bool,

    /// Directory captures are written into (cleared per run).
    #[serde(default = "Configuration::default_workdir")]
    pub workdir: PathBuf,

    /// Directory composed strips are written into.
    #[serde(default = "Configuration::default_strip_dir")]
    pub strip_dir: PathBuf,

    /// Shell command launched per strip; `{filename}` is substituted.
    #[serde(default = "Configuration::default_print_command")]
    pub print_command: String,

    /// Optional upload helper; omit to disable uploads.
    #[serde(default)]
    pub upload: Option<UploadConfig>,

    #[serde(default)]
    pub buttons: ButtonConfig,

    /// Framebuffer device the UI frame is pushed to.
    #[serde(default = "Configuration::default_framebuffer")]
    pub framebuffer: PathBuf,

    /// Font family for the status label.
    #[serde(default = "Configuration::default_font")]
    pub font: String,

    #[serde(default)]
    pub durations: DurationsConfig,
}

impl Configuration {
    fn default_photo_count() -> usize {
        4
    }

    fn default_photo_resolution() -> [u32; 2] {
        [1640, 1232]
    }

    fn default_strip_ratio() -> f32 {
        0.75
    }

    fn default_workdir() -> PathBuf {
        PathBuf::from("/var/lib/photo-booth/captures")
    }

    fn default_strip_dir() -> PathBuf {
        PathBuf::from("/var/lib/photo-booth/strips")
    }

    fn default_print_command() -> String {
        "lp {filename}".to_string()
    }

    fn default_framebuffer() -> PathBuf {
        PathBuf::from("/dev/fb0")
    }

    fn default_font() -> String {
        crate::ui::font::DEFAULT_FONT.to_string()
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.photo_count >= 1, "photo-count must be at least 1");
        ensure!(
            self.photo_resolution[0] > 0 && self.photo_resolution[1] > 0,
            "photo-resolution must be non-zero"
        );
        ensure!(
            self.strip_ratio > 0.0 && self.strip_ratio <= 1.0,
            "strip-ratio must be in (0, 1]"
        );
        ensure!(
            self.print_command.contains("{filename}"),
            "print-command must contain a {{filename}} placeholder"
        );
        if let Some(upload) = &self.upload {
            ensure!(
                upload.command.contains("{filename}"),
                "upload command must contain a {{filename}} placeholder"
            );
        }
        ensure!(!self.font.is_empty(), "font must not be empty");
        Ok(())
    }

    /// Project the runtime settings the controller consumes.
    #[must_use]
    pub fn booth_settings(&self) -> BoothSettings {
        BoothSettings {
            photo_count: self.photo_count,
            photo_resolution: (self.photo_resolution[0], self.photo_resolution[1]),
            strip_ratio: self.strip_ratio,
            quit_enabled: !self.disable_quit,
            caption: self
                .upload
                .as_ref()
                .map(|u| u.caption.clone())
                .unwrap_or_default(),
            strip_dir: self.strip_dir.clone(),
            durations: self.durations.to_state_durations(),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        serde_yaml::from_str("{}").expect("default configuration must deserialize")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct UploadConfig {
    /// Shell command launched per photo; `{filename}` and `{caption}` are
    /// substituted.
    pub command: String,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ButtonConfig {
    /// evdev input device both buttons are wired through.
    #[serde(default = "ButtonConfig::default_device")]
    pub device: PathBuf,
    #[serde(default = "ButtonConfig::default_yes_key")]
    pub yes_key: String,
    #[serde(default = "ButtonConfig::default_no_key")]
    pub no_key: String,
}

impl ButtonConfig {
    fn default_device() -> PathBuf {
        PathBuf::from("/dev/input/event0")
    }

    fn default_yes_key() -> String {
        "KEY_ENTER".to_string()
    }

    fn default_no_key() -> String {
        "KEY_ESC".to_string()
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            device: Self::default_device(),
            yes_key: Self::default_yes_key(),
            no_key: Self::default_no_key(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DurationsConfig {
    #[serde(default = "DurationsConfig::default_prepare", with = "humantime_serde")]
    pub prepare: Duration,
    #[serde(default = "DurationsConfig::default_countdown", with = "humantime_serde")]
    pub countdown: Duration,
    #[serde(default = "DurationsConfig::default_photo_taken", with = "humantime_serde")]
    pub photo_taken: Duration,
    #[serde(default = "DurationsConfig::default_completed", with = "humantime_serde")]
    pub completed: Duration,
}

impl DurationsConfig {
    fn default_prepare() -> Duration {
        Duration::from_secs(3)
    }

    fn default_countdown() -> Duration {
        Duration::from_secs(5)
    }

    fn default_photo_taken() -> Duration {
        Duration::from_secs(3)
    }

    fn default_completed() -> Duration {
        Duration::from_secs(5)
    }

    #[must_use]
    pub fn to_state_durations(&self) -> StateDurations {
        StateDurations {
            prepare: self.prepare,
            countdown: self.countdown,
            photo_taken: self.photo_taken,
            completed: self.completed,
        }
    }
}

impl Default for DurationsConfig {
    fn default() -> Self {
        Self {
            prepare: Self::default_prepare(),
            countdown: Self::default_countdown(),
            photo_taken: Self::default_photo_taken(),
            completed: Self::default_completed(),
        }
    }
}
