//! Label fitting against a real font. On hosts with no fonts installed the
//! measurement-dependent tests skip themselves rather than fail.

use image::RgbaImage;
use rust_photo_booth::error::Error;
use rust_photo_booth::geometry::Rect;
use rust_photo_booth::ui::{Canvas, FontLibrary, Label, Widget, WidgetTree};

fn system_fonts() -> Option<FontLibrary> {
    let fonts = FontLibrary::new();
    if fonts.is_empty() {
        eprintln!("no system fonts available; skipping");
        None
    } else {
        Some(fonts)
    }
}

#[test]
fn empty_font_name_is_rejected() {
    let mut label = Label::new("hello");
    assert!(matches!(label.set_font_name(""), Err(Error::EmptyFontName)));
    // The previous name survives the rejected set.
    assert!(!label.font_name().is_empty());
}

#[test]
fn text_change_invalidates_the_fit() {
    let Some(fonts) = system_fonts() else { return };
    let mut frame = RgbaImage::new(200, 100);
    let mut canvas = Canvas {
        frame: &mut frame,
        fonts: &fonts,
    };

    let mut label = Label::new("hi");
    label.do_layout(&mut canvas, Rect::new(0, 0, 200, 100));
    assert!(label.fitted_size().is_some());

    assert!(label.set_text("a much longer line of text"));
    assert!(label.fitted_size().is_none());

    // Setting the same text back is not a change.
    assert!(!label.set_text("a much longer line of text"));
}

#[test]
fn fit_is_idempotent_for_unchanged_text_and_box() {
    let Some(fonts) = system_fonts() else { return };
    let mut frame = RgbaImage::new(300, 120);
    let mut canvas = Canvas {
        frame: &mut frame,
        fonts: &fonts,
    };
    let rect = Rect::new(0, 0, 300, 120);

    let mut label = Label::new("Smile!");
    label.do_layout(&mut canvas, rect);
    let first_size = label.fitted_size().expect("fitted");
    let first_box = label.fitted_box().expect("measured");

    label.do_layout(&mut canvas, rect);
    assert_eq!(label.fitted_size(), Some(first_size));
    assert_eq!(label.fitted_box(), Some(first_box));
}

#[test]
fn fitted_text_stays_inside_the_box() {
    let Some(fonts) = system_fonts() else { return };
    let mut frame = RgbaImage::new(400, 200);
    let mut canvas = Canvas {
        frame: &mut frame,
        fonts: &fonts,
    };

    let mut label = Label::new("3 of 4\n5");
    label.do_layout(&mut canvas, Rect::new(0, 0, 160, 90));
    let (w, h) = label.fitted_box().expect("measured");
    assert!(w <= 160.0, "width {w} exceeds box");
    assert!(h <= 90.0, "height {h} exceeds box");
    assert!(label.fitted_size().unwrap() >= 1);
}

#[test]
fn draw_without_layout_refits_lazily() {
    let Some(fonts) = system_fonts() else { return };
    let mut frame = RgbaImage::new(120, 60);

    let mut tree = WidgetTree::new(Widget::panel().with_rect(Rect::new(0, 0, 120, 60)));
    let id = tree.add_child(
        tree.root(),
        Widget::label(Label::new("Go")).with_rect(Rect::new(0, 0, 120, 60)),
    );

    // Draw directly, with no layout pass in between.
    let mut canvas = Canvas {
        frame: &mut frame,
        fonts: &fonts,
    };
    tree.draw(tree.root(), &mut canvas);

    assert!(tree.label(id).unwrap().fitted_size().is_some());
    // Something was rasterized: the frame is no longer fully blank.
    assert!(frame.pixels().any(|p| p.0[3] != 0));
}

#[test]
fn shrinking_the_widget_box_refits_smaller() {
    let Some(fonts) = system_fonts() else { return };
    let mut frame = RgbaImage::new(400, 200);
    let mut canvas = Canvas {
        frame: &mut frame,
        fonts: &fonts,
    };

    let mut label = Label::new("Smile!");
    label.do_layout(&mut canvas, Rect::new(0, 0, 400, 200));
    let large = label.fitted_size().expect("fitted");

    label.invalidate_fit();
    label.do_layout(&mut canvas, Rect::new(0, 0, 100, 50));
    let small = label.fitted_size().expect("fitted");

    assert!(small < large, "expected {small} < {large}");
}
