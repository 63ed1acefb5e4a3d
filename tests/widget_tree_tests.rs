use image::{Rgba, RgbaImage};
use rust_photo_booth::error::Error;
use rust_photo_booth::geometry::Rect;
use rust_photo_booth::ui::{Canvas, FontLibrary, Widget, WidgetTree};

fn empty_fonts() -> FontLibrary {
    let dir = tempfile::tempdir().expect("tempdir");
    FontLibrary::with_fonts_dir(dir.path())
}

#[test]
fn attach_rejects_child_with_a_parent() {
    let mut tree = WidgetTree::new(Widget::panel());
    let a = tree.add_child(tree.root(), Widget::panel());
    let b = tree.add_child(tree.root(), Widget::panel());

    let child = tree.add_child(a, Widget::panel());
    assert!(matches!(
        tree.attach(b, child),
        Err(Error::AlreadyAttached)
    ));

    // Detaching first makes the move legal.
    tree.remove_child(a, child).unwrap();
    tree.attach(b, child).unwrap();
    assert_eq!(tree.parent(child), Some(b));
    assert!(tree.children(a).is_empty());
}

#[test]
fn remove_child_signals_absent_child() {
    let mut tree = WidgetTree::new(Widget::panel());
    let a = tree.add_child(tree.root(), Widget::panel());
    let stranger = tree.insert(Widget::panel());

    assert!(matches!(
        tree.remove_child(a, stranger),
        Err(Error::ChildNotFound)
    ));
}

#[test]
fn find_by_name_checks_siblings_before_descending() {
    let mut tree = WidgetTree::new(Widget::panel().named("root"));
    let first = tree.add_child(tree.root(), Widget::panel());
    // A grandchild named "target" under the first child...
    let deep = tree.add_child(first, Widget::panel().named("target"));
    // ...and a direct child named "target" added later.
    let shallow = tree.add_child(tree.root(), Widget::panel().named("target"));

    // The immediate-children phase wins over the depth-first phase.
    assert_eq!(tree.find_by_name(tree.root(), "target"), Some(shallow));
    // From the first child, only the grandchild is reachable.
    assert_eq!(tree.find_by_name(first, "target"), Some(deep));
    // The starting widget itself is considered.
    assert_eq!(tree.find_by_name(tree.root(), "root"), Some(tree.root()));
    assert_eq!(tree.find_by_name(tree.root(), "absent"), None);
}

#[test]
fn find_by_name_is_stable_across_calls() {
    let mut tree = WidgetTree::new(Widget::panel());
    for _ in 0..3 {
        let child = tree.add_child(tree.root(), Widget::panel().named("dup"));
        tree.add_child(child, Widget::panel().named("dup"));
    }

    let first = tree.find_by_name(tree.root(), "dup");
    for _ in 0..10 {
        assert_eq!(tree.find_by_name(tree.root(), "dup"), first);
    }
}

#[test]
fn screen_rect_accumulates_ancestor_offsets() {
    let mut tree = WidgetTree::new(Widget::panel().with_rect(Rect::new(100, 10, 500, 400)));
    let mid = tree.add_child(
        tree.root(),
        Widget::panel().with_rect(Rect::new(30, 40, 200, 200)),
    );
    let leaf = tree.add_child(mid, Widget::panel().with_rect(Rect::new(5, 6, 50, 50)));

    assert_eq!(tree.screen_rect(leaf), Rect::new(135, 56, 50, 50));
}

#[test]
fn screen_rect_round_trips_through_setter() {
    let mut tree = WidgetTree::new(Widget::panel().with_rect(Rect::new(7, 11, 800, 600)));
    let mid = tree.add_child(
        tree.root(),
        Widget::panel().with_rect(Rect::new(13, 17, 400, 300)),
    );
    let leaf = tree.add_child(mid, Widget::panel());

    let target = Rect::new(123, 45, 60, 70);
    tree.set_screen_rect(leaf, target);
    assert_eq!(tree.screen_rect(leaf), target);
    // Local coordinates were back-computed against the ancestor chain.
    assert_eq!(tree.rect(leaf), Rect::new(123 - 7 - 13, 45 - 11 - 17, 60, 70));
}

#[test]
fn leaf_dirtiness_is_visible_at_the_root() {
    let fonts = empty_fonts();
    let mut frame = RgbaImage::new(64, 64);
    let mut tree = WidgetTree::new(Widget::panel().with_rect(Rect::new(0, 0, 64, 64)));
    let mid = tree.add_child(tree.root(), Widget::panel());
    let leaf = tree.add_child(mid, Widget::panel());

    // Freshly built trees start dirty; a layout pass settles them.
    let mut canvas = Canvas {
        frame: &mut frame,
        fonts: &fonts,
    };
    tree.layout(tree.root(), &mut canvas);
    assert!(!tree.is_dirty(tree.root()));

    tree.invalidate(leaf);
    assert!(tree.is_dirty(tree.root()));

    let mut canvas = Canvas {
        frame: &mut frame,
        fonts: &fonts,
    };
    tree.layout(tree.root(), &mut canvas);
    assert!(!tree.is_dirty(tree.root()));
}

#[test]
fn invisible_subtrees_are_skipped_by_layout() {
    let fonts = empty_fonts();
    let mut frame = RgbaImage::new(32, 32);
    let mut tree = WidgetTree::new(Widget::panel().with_rect(Rect::new(0, 0, 32, 32)));
    let hidden = tree.add_child(tree.root(), Widget::panel());
    tree.set_visible(hidden, false);

    let mut canvas = Canvas {
        frame: &mut frame,
        fonts: &fonts,
    };
    tree.layout(tree.root(), &mut canvas);

    // The hidden widget keeps its dirty flag: layout never visited it.
    assert!(tree.is_dirty(hidden));
}

#[test]
fn setter_noops_do_not_dirty_the_tree() {
    let fonts = empty_fonts();
    let mut frame = RgbaImage::new(32, 32);
    let mut tree = WidgetTree::new(Widget::panel().with_rect(Rect::new(0, 0, 32, 32)));
    let child = tree.add_child(
        tree.root(),
        Widget::panel().with_rect(Rect::new(1, 2, 3, 4)),
    );
    let mut canvas = Canvas {
        frame: &mut frame,
        fonts: &fonts,
    };
    tree.layout(tree.root(), &mut canvas);

    tree.set_rect(child, Rect::new(1, 2, 3, 4));
    tree.set_visible(child, true);
    assert!(!tree.is_dirty(tree.root()));

    tree.set_rect(child, Rect::new(9, 2, 3, 4));
    assert!(tree.is_dirty(tree.root()));
}

#[test]
fn draw_fills_background_in_screen_space() {
    let fonts = empty_fonts();
    let mut frame = RgbaImage::new(16, 16);
    let red = Rgba([255, 0, 0, 255]);
    let mut tree = WidgetTree::new(Widget::panel().with_rect(Rect::new(4, 4, 8, 8)));
    let child = tree.add_child(
        tree.root(),
        Widget::panel()
            .with_rect(Rect::new(2, 2, 4, 4))
            .with_background(red),
    );
    assert_eq!(tree.screen_rect(child), Rect::new(6, 6, 4, 4));

    let mut canvas = Canvas {
        frame: &mut frame,
        fonts: &fonts,
    };
    tree.draw(tree.root(), &mut canvas);

    assert_eq!(frame.get_pixel(6, 6), &red);
    assert_eq!(frame.get_pixel(9, 9), &red);
    assert_eq!(frame.get_pixel(5, 5), &Rgba([0, 0, 0, 0]));
    assert_eq!(frame.get_pixel(10, 10), &Rgba([0, 0, 0, 0]));
}
