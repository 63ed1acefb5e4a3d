//! The booth controller: a fixed-tick state machine tying button input,
//! countdown timers, camera capture, strip printing, and the status label
//! together.
//!
//! State transitions are a pure function of the current state and the
//! tick's inputs; all side effects run in the on-enter step that follows a
//! transition. The controller also owns the 100 ms cadence that pushes the
//! drawn frame to the display overlay, which is deliberately independent of
//! the widget tree's dirty-driven redraws.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use image::Rgba;
use tracing::{debug, info, warn};

use crate::platform::buttons::{BoothButton, ButtonInput};
use crate::platform::camera::Camera;
use crate::platform::display::Display;
use crate::platform::printer::Printer;
use crate::platform::uploader::Uploader;
use crate::strip::compose_strip;
use crate::timer::Timer;
use crate::ui::{Control, WidgetId, WidgetTree};

/// Period of the framebuffer push cadence.
pub const RENDER_PERIOD: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoothState {
    /// Waiting for a visitor.
    Idle,
    /// "Really quit?" confirmation.
    ExitPrompt,
    /// Short get-ready pause before the first countdown.
    Prepare,
    /// Counting down to the next capture.
    Countdown,
    /// A capture was just recorded; brief review pause.
    PhotoTaken,
    /// "Print your strip?" confirmation.
    PrintPrompt,
    /// Composing and launching the print; passes through on the same tick.
    Printing,
    /// Run finished; thank-you dwell before returning to idle.
    Completed,
}

/// One tick's worth of observed inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inputs {
    pub yes: bool,
    pub no: bool,
    pub countdown_finished: bool,
    pub all_photos_taken: bool,
}

/// Outcome of evaluating one tick's transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Enter(BoothState),
    Quit,
}

/// Pure transition rules. `quit_enabled` gates the idle → exit-prompt edge.
#[must_use]
pub fn next_state(state: BoothState, quit_enabled: bool, inputs: &Inputs) -> Transition {
    use BoothState::*;
    match state {
        Idle => {
            if inputs.yes {
                Transition::Enter(Prepare)
            } else if inputs.no && quit_enabled {
                Transition::Enter(ExitPrompt)
            } else {
                Transition::Stay
            }
        }
        ExitPrompt => {
            if inputs.yes {
                Transition::Quit
            } else if inputs.no {
                Transition::Enter(Idle)
            } else {
                Transition::Stay
            }
        }
        Prepare => {
            if inputs.no {
                Transition::Enter(Idle)
            } else if inputs.countdown_finished {
                Transition::Enter(Countdown)
            } else {
                Transition::Stay
            }
        }
        Countdown => {
            if inputs.no {
                Transition::Enter(Idle)
            } else if inputs.countdown_finished {
                Transition::Enter(PhotoTaken)
            } else {
                Transition::Stay
            }
        }
        PhotoTaken => {
            if inputs.no {
                Transition::Enter(Idle)
            } else if inputs.countdown_finished {
                if inputs.all_photos_taken {
                    Transition::Enter(PrintPrompt)
                } else {
                    Transition::Enter(Countdown)
                }
            } else {
                Transition::Stay
            }
        }
        PrintPrompt => {
            if inputs.yes {
                Transition::Enter(Printing)
            } else if inputs.no {
                Transition::Enter(Idle)
            } else {
                Transition::Stay
            }
        }
        // Printing never waits for input. The on-enter step re-enters
        // completed (or idle on failure) on the same tick, so a tick never
        // actually observes this state; the arm states the passthrough rule.
        Printing => Transition::Enter(Completed),
        Completed => {
            if inputs.yes || inputs.countdown_finished {
                Transition::Enter(Idle)
            } else {
                Transition::Stay
            }
        }
    }
}

/// State-entry countdown durations.
#[derive(Debug, Clone, Copy)]
pub struct StateDurations {
    pub prepare: Duration,
    pub countdown: Duration,
    pub photo_taken: Duration,
    pub completed: Duration,
}

impl Default for StateDurations {
    fn default() -> Self {
        Self {
            prepare: Duration::from_secs(3),
            countdown: Duration::from_secs(5),
            photo_taken: Duration::from_secs(3),
            completed: Duration::from_secs(5),
        }
    }
}

/// Runtime settings the controller needs, decoupled from the config file.
#[derive(Debug, Clone)]
pub struct BoothSettings {
    pub photo_count: usize,
    pub photo_resolution: (u32, u32),
    pub strip_ratio: f32,
    pub quit_enabled: bool,
    pub caption: String,
    pub strip_dir: PathBuf,
    pub durations: StateDurations,
}

/// Hardware collaborators, behind traits so tests can substitute fakes.
pub struct Services {
    pub camera: Box<dyn Camera>,
    pub display: Box<dyn Display>,
    pub printer: Box<dyn Printer>,
    pub uploader: Option<Box<dyn Uploader>>,
    pub buttons: Box<dyn ButtonInput>,
}

pub struct Booth {
    settings: BoothSettings,
    services: Services,
    status: WidgetId,
    state: BoothState,
    render_timer: Timer,
    countdown: Timer,
    captures: Vec<PathBuf>,
    upload_launched: bool,
}

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const AMBER: Rgba<u8> = Rgba([255, 196, 0, 255]);

impl Booth {
    #[must_use]
    pub fn new(settings: BoothSettings, services: Services, status: WidgetId) -> Self {
        Self {
            settings,
            services,
            status,
            state: BoothState::Idle,
            render_timer: Timer::new(RENDER_PERIOD),
            countdown: Timer::new(Duration::ZERO),
            captures: Vec::new(),
            upload_launched: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> BoothState {
        self.state
    }

    #[must_use]
    pub fn captures(&self) -> &[PathBuf] {
        &self.captures
    }

    /// Apply the idle-state entry actions before the first tick so the
    /// screen shows the welcome prompt immediately.
    pub fn prime(&mut self, tree: &mut WidgetTree, now: Instant) {
        self.enter(BoothState::Idle, tree, now);
    }

    /// Advance one tick. Pushes the frame on the render cadence, reads the
    /// buttons, evaluates the transition rules, and runs entry actions.
    pub fn update(
        &mut self,
        tree: &mut WidgetTree,
        frame: &image::RgbaImage,
        now: Instant,
    ) -> Control {
        // Frame push happens every tick before state logic, on its own
        // cadence; it is not tied to whether the tree redrew.
        if self.render_timer.finished_at(now) {
            if let Err(err) = self.services.display.push_frame(frame) {
                warn!("frame push failed: {err:?}");
            }
            self.render_timer.start(now);
        }

        self.services.buttons.pump();
        // Drain the latches every tick so a press observed while the button
        // was already held is not replayed after release.
        let yes_pressed = self.services.buttons.take_pressed(BoothButton::Yes);
        let no_pressed = self.services.buttons.take_pressed(BoothButton::No);
        let yes = self.services.buttons.held(BoothButton::Yes) || yes_pressed;
        let no = self.services.buttons.held(BoothButton::No) || no_pressed;
        let inputs = Inputs {
            yes,
            no,
            countdown_finished: self.countdown.finished_at(now),
            all_photos_taken: self.captures.len() >= self.settings.photo_count,
        };

        if self.state == BoothState::Countdown {
            self.refresh_countdown_label(tree, now);
        }

        match next_state(self.state, self.settings.quit_enabled, &inputs) {
            Transition::Stay => Control::Continue,
            Transition::Quit => {
                info!("exit confirmed; stopping");
                Control::Quit
            }
            Transition::Enter(state) => {
                self.enter(state, tree, now);
                Control::Continue
            }
        }
    }

    /// Entry actions, run once, atomically with the state change.
    fn enter(&mut self, state: BoothState, tree: &mut WidgetTree, now: Instant) {
        debug!(from = ?self.state, to = ?state, "state change");
        self.state = state;
        match state {
            BoothState::Idle => {
                self.countdown.stop();
                self.set_status(tree, "Press YES\nto take photos", WHITE);
            }
            BoothState::ExitPrompt => {
                self.set_status(tree, "Quit the booth?\nYES quits, NO returns", AMBER);
            }
            BoothState::Prepare => {
                self.captures.clear();
                self.upload_launched = false;
                if let Err(err) = self.services.camera.clear_workdir() {
                    warn!("failed to clear capture workdir: {err:?}");
                }
                self.countdown.start_with(self.settings.durations.prepare, now);
                self.set_status(tree, "Get ready!", WHITE);
            }
            BoothState::Countdown => {
                self.countdown
                    .start_with(self.settings.durations.countdown, now);
                self.refresh_countdown_label(tree, now);
            }
            BoothState::PhotoTaken => {
                match self.services.camera.capture_photo() {
                    Ok(path) => {
                        info!(photo = %path.display(), "captured");
                        self.captures.push(path);
                    }
                    Err(err) => warn!("capture failed: {err:?}"),
                }
                self.countdown
                    .start_with(self.settings.durations.photo_taken, now);
                let text = format!(
                    "Nice!\n{} of {}",
                    self.captures.len(),
                    self.settings.photo_count
                );
                self.set_status(tree, &text, WHITE);
                self.maybe_launch_upload();
            }
            BoothState::PrintPrompt => {
                self.set_status(tree, "Print your strip?\nYES prints, NO finishes", WHITE);
            }
            BoothState::Printing => {
                self.set_status(tree, "Printing...", WHITE);
                match self.print_strip() {
                    Ok(()) => self.enter(BoothState::Completed, tree, now),
                    Err(err) => {
                        warn!("printing failed: {err:?}");
                        self.enter(BoothState::Idle, tree, now);
                    }
                }
            }
            BoothState::Completed => {
                self.countdown
                    .start_with(self.settings.durations.completed, now);
                self.set_status(tree, "Thank you!\nCome back soon", WHITE);
            }
        }
    }

    /// Launch the background upload exactly once per run, at the moment the
    /// photo count is reached. The uploader gets its own copy of the list.
    fn maybe_launch_upload(&mut self) {
        if self.upload_launched || self.captures.len() < self.settings.photo_count {
            return;
        }
        if let Some(uploader) = &self.services.uploader {
            uploader.upload_in_background(self.captures.clone(), self.settings.caption.clone());
            self.upload_launched = true;
        }
    }

    fn print_strip(&mut self) -> anyhow::Result<()> {
        let mut photos = Vec::with_capacity(self.captures.len());
        for path in &self.captures {
            let photo = image::open(path)
                .map_err(|err| anyhow::anyhow!("failed to load {}: {err}", path.display()))?;
            photos.push(photo.to_rgba8());
        }
        let strip = compose_strip(
            &photos,
            self.settings.photo_resolution,
            self.settings.strip_ratio,
        );

        std::fs::create_dir_all(&self.settings.strip_dir)?;
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let path = self.settings.strip_dir.join(format!("strip-{stamp}.png"));
        strip.save(&path)?;
        info!(strip = %path.display(), "strip composed");

        self.services.printer.print(&path)
    }

    fn refresh_countdown_label(&mut self, tree: &mut WidgetTree, now: Instant) {
        let seconds = (self.countdown.remaining_at(now).floor() as i64 + 1).max(1);
        let text = format!(
            "{} of {}\n{}",
            self.captures.len() + 1,
            self.settings.photo_count,
            seconds
        );
        self.set_status(tree, &text, WHITE);
    }

    fn set_status(&self, tree: &mut WidgetTree, text: &str, color: Rgba<u8>) {
        let status = self.status;
        tree.update_label(status, |label| {
            let changed = label.set_text(text);
            label.set_font_color(color) || changed
        });
    }
}
