//! Cooperative render loop.
//!
//! One thread owns the widget tree and the frame buffer. Each tick runs the
//! update callback first; the callback mutates widgets and reads timers, and
//! its return value decides whether the loop keeps going. Layout and draw
//! only happen when the tree reports dirty, and always in that order.

use std::thread;
use std::time::Duration;

use image::RgbaImage;
use tracing::trace;

use crate::ui::font::FontLibrary;
use crate::ui::widget::{Canvas, WidgetTree};

/// Fixed tick interval of the render loop.
pub const TICK: Duration = Duration::from_millis(60);

/// Returned by the update callback to keep the loop running or stop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct UiContext {
    fonts: FontLibrary,
    frame: RgbaImage,
    tick: Duration,
}

impl UiContext {
    #[must_use]
    pub fn new(fonts: FontLibrary, frame_width: u32, frame_height: u32) -> Self {
        Self {
            fonts,
            frame: RgbaImage::new(frame_width, frame_height),
            tick: TICK,
        }
    }

    /// Override the tick interval; tests use a zero tick.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// The most recently drawn frame.
    #[must_use]
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// Run the loop until the callback returns [`Control::Quit`].
    ///
    /// The callback receives the tree and the frame as drawn by the
    /// previous tick, so anything it pushes to hardware reflects completed
    /// draw passes only.
    pub fn run(
        &mut self,
        tree: &mut WidgetTree,
        mut update: impl FnMut(&mut WidgetTree, &RgbaImage) -> Control,
    ) {
        loop {
            if update(tree, &self.frame) == Control::Quit {
                return;
            }
            if tree.is_dirty(tree.root()) {
                trace!("tree dirty; running layout and draw passes");
                let mut canvas = Canvas {
                    frame: &mut self.frame,
                    fonts: &self.fonts,
                };
                tree.layout(tree.root(), &mut canvas);
                tree.draw(tree.root(), &mut canvas);
            }
            thread::sleep(self.tick);
        }
    }
}
