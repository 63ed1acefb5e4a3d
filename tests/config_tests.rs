use std::path::PathBuf;
use std::time::Duration;

use rust_photo_booth::config::Configuration;

#[test]
fn empty_config_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.photo_count, 4);
    assert_eq!(cfg.photo_resolution, [1640, 1232]);
    assert!((cfg.strip_ratio - 0.75).abs() < f32::EPSILON);
    assert!(!cfg.disable_quit);
    assert!(cfg.upload.is_none());
    assert_eq!(cfg.buttons.yes_key, "KEY_ENTER");
    assert_eq!(cfg.framebuffer, PathBuf::from("/dev/fb0"));
    assert_eq!(cfg.durations.countdown, Duration::from_secs(5));
    cfg.validate().unwrap();
}

#[test]
fn parse_kebab_case_fields() {
    let yaml = r#"
photo-count: 6
photo-resolution: [1280, 720]
strip-ratio: 0.5
disable-quit: true
print-command: "lpr -P booth {filename}"
buttons:
  device: /dev/input/event3
  yes-key: KEY_A
  no-key: KEY_B
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.photo_count, 6);
    assert_eq!(cfg.photo_resolution, [1280, 720]);
    assert!(cfg.disable_quit);
    assert_eq!(cfg.buttons.device, PathBuf::from("/dev/input/event3"));
    assert_eq!(cfg.buttons.no_key, "KEY_B");
    cfg.validate().unwrap();
}

#[test]
fn parse_humantime_durations() {
    let yaml = r#"
durations:
  prepare: 2s
  countdown: 10s
  photo-taken: 1500ms
  completed: 8s
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.durations.prepare, Duration::from_secs(2));
    assert_eq!(cfg.durations.countdown, Duration::from_secs(10));
    assert_eq!(cfg.durations.photo_taken, Duration::from_millis(1500));
    assert_eq!(cfg.durations.completed, Duration::from_secs(8));
}

#[test]
fn parse_upload_section() {
    let yaml = r#"
upload:
  command: "booth-upload {filename} --caption {caption}"
  caption: "From the booth"
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let upload = cfg.upload.as_ref().unwrap();
    assert_eq!(upload.caption, "From the booth");
    cfg.validate().unwrap();

    let settings = cfg.booth_settings();
    assert_eq!(settings.caption, "From the booth");
}

#[test]
fn unknown_fields_are_rejected() {
    let err = serde_yaml::from_str::<Configuration>("frobnicate: 1").unwrap_err();
    assert!(err.to_string().contains("frobnicate"));
}

#[test]
fn validate_rejects_zero_photo_count() {
    let cfg: Configuration = serde_yaml::from_str("photo-count: 0").unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn validate_rejects_out_of_range_strip_ratio() {
    let cfg: Configuration = serde_yaml::from_str("strip-ratio: 1.5").unwrap();
    assert!(cfg.validate().is_err());
    let cfg: Configuration = serde_yaml::from_str("strip-ratio: 0.0").unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn validate_requires_filename_placeholder() {
    let cfg: Configuration = serde_yaml::from_str(r#"print-command: "lp strip.png""#).unwrap();
    assert!(cfg.validate().is_err());

    let yaml = r#"
upload:
  command: "booth-upload --caption {caption}"
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn booth_settings_projects_quit_gate() {
    let cfg: Configuration = serde_yaml::from_str("disable-quit: true").unwrap();
    assert!(!cfg.booth_settings().quit_enabled);
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert!(cfg.booth_settings().quit_enabled);
}

#[test]
fn from_yaml_file_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "photo-count: 3\n")?;

    let cfg = rust_photo_booth::config::from_yaml_file(&path)?;
    assert_eq!(cfg.photo_count, 3);

    assert!(rust_photo_booth::config::from_yaml_file(&dir.path().join("missing.yaml")).is_err());
    Ok(())
}
