//! Physical button input.
//!
//! The booth reads two logical buttons, "yes" and "no". Each exposes the
//! current held level plus an edge latch: once a press is observed the latch
//! stays set until a `take_pressed` read clears it, so short taps between
//! ticks are never lost.

use std::os::fd::AsFd;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use evdev::{Device, EventSummary, KeyCode};
use nix::fcntl::{FcntlArg, OFlag, fcntl};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoothButton {
    Yes,
    No,
}

/// Per-tick button source used by the booth controller.
pub trait ButtonInput {
    /// Drain pending hardware events; called once per tick.
    fn pump(&mut self);

    /// Current held level of the button.
    fn held(&self, button: BoothButton) -> bool;

    /// Whether the button was pressed since the last read; reading clears
    /// the latch.
    fn take_pressed(&mut self, button: BoothButton) -> bool;
}

/// Held level plus the read-clears edge latch for one button.
#[derive(Debug, Default, Clone, Copy)]
pub struct ButtonState {
    held: bool,
    latched: bool,
}

impl ButtonState {
    pub fn update(&mut self, pressed: bool) {
        if pressed && !self.held {
            self.latched = true;
        }
        self.held = pressed;
    }

    #[must_use]
    pub const fn held(&self) -> bool {
        self.held
    }

    pub fn take_pressed(&mut self) -> bool {
        let latched = self.latched;
        self.latched = false;
        latched
    }
}

/// Buttons wired through a Linux input device, read non-blocking.
pub struct EvdevButtons {
    device: Device,
    yes_key: KeyCode,
    no_key: KeyCode,
    yes: ButtonState,
    no: ButtonState,
}

impl EvdevButtons {
    pub fn open(path: &std::path::Path, yes_key: &str, no_key: &str) -> Result<Self> {
        let device =
            Device::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        set_nonblocking(&device)
            .with_context(|| format!("failed to set {} non-blocking", path.display()))?;
        Ok(Self {
            device,
            yes_key: parse_key(yes_key)?,
            no_key: parse_key(no_key)?,
            yes: ButtonState::default(),
            no: ButtonState::default(),
        })
    }
}

impl ButtonInput for EvdevButtons {
    fn pump(&mut self) {
        let events = match self.device.fetch_events() {
            Ok(events) => events,
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => return,
            Err(err) => {
                warn!("failed reading button events: {err}");
                return;
            }
        };
        for event in events {
            if let EventSummary::Key(_, key, value) = event.destructure() {
                // value 2 is key repeat; the level has not changed.
                let pressed = match value {
                    0 => false,
                    1 => true,
                    _ => continue,
                };
                if key == self.yes_key {
                    debug!(pressed, "yes button event");
                    self.yes.update(pressed);
                } else if key == self.no_key {
                    debug!(pressed, "no button event");
                    self.no.update(pressed);
                }
            }
        }
    }

    fn held(&self, button: BoothButton) -> bool {
        match button {
            BoothButton::Yes => self.yes.held(),
            BoothButton::No => self.no.held(),
        }
    }

    fn take_pressed(&mut self, button: BoothButton) -> bool {
        match button {
            BoothButton::Yes => self.yes.take_pressed(),
            BoothButton::No => self.no.take_pressed(),
        }
    }
}

fn parse_key(code: &str) -> Result<KeyCode> {
    match KeyCode::from_str(code) {
        Ok(key) => Ok(key),
        Err(_) => bail!("unknown key code: {code}"),
    }
}

fn set_nonblocking(device: &Device) -> Result<()> {
    let current = fcntl(device.as_fd(), FcntlArg::F_GETFL).context("F_GETFL failed")?;
    let mut flags = OFlag::from_bits_retain(current);
    flags.insert(OFlag::O_NONBLOCK);
    fcntl(device.as_fd(), FcntlArg::F_SETFL(flags)).context("F_SETFL failed")?;
    Ok(())
}
