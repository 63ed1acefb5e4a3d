//! Kiosk assembly: hardware bring-up, widget tree construction, and the
//! main loop.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use image::Rgba;
use tracing::info;

use crate::booth::{Booth, Services};
use crate::config::Configuration;
use crate::geometry::{Rect, normalize_rect, normalize_size};
use crate::platform::buttons::EvdevButtons;
use crate::platform::camera::{Camera, RpicamCamera};
use crate::platform::display::{Display, FramebufferDisplay};
use crate::platform::printer::CommandPrinter;
use crate::platform::uploader::{CommandUploader, Uploader};
use crate::ui::{Align, FontLibrary, Label, UiContext, Widget, WidgetId, WidgetTree};

/// How long hardware may take to come up before startup fails.
pub const STARTUP_WAIT: Duration = Duration::from_secs(10);

/// Name of the status label the controller drives.
pub const STATUS_LABEL: &str = "status";

/// Fraction of the screen width given to the camera preview.
const PREVIEW_FRACTION: f64 = 0.75;

const PANEL_PADDING: i32 = 20;

pub fn run(cfg: &Configuration) -> Result<()> {
    let display =
        FramebufferDisplay::open(&cfg.framebuffer, STARTUP_WAIT).context("opening display")?;
    let (screen_w, screen_h) = display.resolution();
    let (frame_w, frame_h) = normalize_size(screen_w as i32, screen_h as i32);
    info!(
        screen_w,
        screen_h, frame_w, frame_h, "display up; screen normalized"
    );

    let resolution = (cfg.photo_resolution[0], cfg.photo_resolution[1]);
    let mut camera = RpicamCamera::new(&cfg.workdir, resolution).context("preparing camera")?;
    let preview = normalize_rect(Rect::from_f64(
        0.0,
        0.0,
        f64::from(frame_w) * PREVIEW_FRACTION,
        f64::from(frame_h),
    ));
    camera
        .start_preview(preview)
        .context("starting camera preview")?;

    let (mut tree, status) = build_ui(frame_w, frame_h, preview, &cfg.font)?;

    let buttons = EvdevButtons::open(
        &cfg.buttons.device,
        &cfg.buttons.yes_key,
        &cfg.buttons.no_key,
    )
    .context("opening button input device")?;
    let uploader: Option<Box<dyn Uploader>> = cfg
        .upload
        .as_ref()
        .map(|u| Box::new(CommandUploader::new(&u.command)) as Box<dyn Uploader>);
    let services = Services {
        camera: Box::new(camera),
        display: Box::new(display),
        printer: Box::new(CommandPrinter::new(&cfg.print_command)),
        uploader,
        buttons: Box::new(buttons),
    };

    let mut booth = Booth::new(cfg.booth_settings(), services, status);
    booth.prime(&mut tree, Instant::now());

    let mut ctx = UiContext::new(FontLibrary::new(), frame_w as u32, frame_h as u32);
    info!("booth ready");
    ctx.run(&mut tree, |tree, frame| {
        booth.update(tree, frame, Instant::now())
    });
    info!("booth stopped");
    Ok(())
}

/// The screen layout: a black root the size of the normalized screen, the
/// preview hole on the left, and an interface panel with the status label
/// on the right.
pub fn build_ui(
    frame_w: i32,
    frame_h: i32,
    preview: Rect,
    font: &str,
) -> Result<(WidgetTree, WidgetId)> {
    let mut tree = WidgetTree::new(
        Widget::panel()
            .with_rect(Rect::new(0, 0, frame_w, frame_h))
            .with_background(Rgba([0, 0, 0, 255])),
    );

    let panel = tree.add_child(
        tree.root(),
        Widget::panel()
            .with_rect(Rect::new(
                preview.width,
                0,
                frame_w - preview.width,
                frame_h,
            ))
            .with_background(Rgba([16, 24, 40, 255])),
    );

    let panel_rect = tree.rect(panel);
    let mut label = Label::new("")
        .with_align(Align::Center)
        .with_font_color(Rgba([255, 255, 255, 255]));
    label.set_font_name(font)?;
    tree.add_child(
        panel,
        Widget::label(label).named(STATUS_LABEL).with_rect(Rect::new(
            PANEL_PADDING,
            PANEL_PADDING,
            panel_rect.width - 2 * PANEL_PADDING,
            panel_rect.height - 2 * PANEL_PADDING,
        )),
    );

    let status = tree
        .find_by_name(tree.root(), STATUS_LABEL)
        .context("status label missing from widget tree")?;
    Ok((tree, status))
}
