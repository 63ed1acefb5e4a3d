//! Retained-mode widget tree.
//!
//! Widgets live in an arena owned by [`WidgetTree`]; the parent holds the
//! owning, ordered child list and each child carries its parent's id as a
//! plain back-reference. Coordinates are integer pixels relative to the
//! parent; `screen_rect` folds in the ancestor offsets.
//!
//! Dirtiness is per-node and deliberately not cached upward: `is_dirty`
//! recurses, and a layout pass clears each visited node's own flag.

use image::{Rgba, RgbaImage};

use crate::error::Error;
use crate::geometry::Rect;
use crate::ui::font::FontLibrary;
use crate::ui::label::Label;

/// Index of a widget inside its tree. Ids stay valid for the tree's
/// lifetime; detaching a widget unlinks it but never invalidates ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(usize);

/// Drawing target handed down the layout and draw passes.
pub struct Canvas<'a> {
    pub frame: &'a mut RgbaImage,
    pub fonts: &'a FontLibrary,
}

impl Canvas<'_> {
    /// Fill a screen-space rectangle, clipped to the frame.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = (rect.x + rect.width).min(self.frame.width() as i32);
        let y1 = (rect.y + rect.height).min(self.frame.height() as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                self.frame.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Widget payload; panels only paint their background, labels render text.
#[derive(Debug)]
pub enum WidgetKind {
    Panel,
    Label(Label),
}

/// Description of a widget prior to insertion into a tree.
#[derive(Debug)]
pub struct Widget {
    name: Option<String>,
    rect: Rect,
    visible: bool,
    background: Option<Rgba<u8>>,
    kind: WidgetKind,
}

impl Widget {
    #[must_use]
    pub fn panel() -> Self {
        Self {
            name: None,
            rect: Rect::default(),
            visible: true,
            background: None,
            kind: WidgetKind::Panel,
        }
    }

    #[must_use]
    pub fn label(label: Label) -> Self {
        Self {
            kind: WidgetKind::Label(label),
            ..Self::panel()
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    #[must_use]
    pub fn with_background(mut self, color: Rgba<u8>) -> Self {
        self.background = Some(color);
        self
    }
}

#[derive(Debug)]
struct Node {
    name: Option<String>,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    rect: Rect,
    visible: bool,
    background: Option<Rgba<u8>>,
    dirty: bool,
    kind: WidgetKind,
}

#[derive(Debug)]
pub struct WidgetTree {
    nodes: Vec<Node>,
    root: WidgetId,
}

impl WidgetTree {
    /// Create a tree whose root is the given widget.
    #[must_use]
    pub fn new(root: Widget) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: WidgetId(0),
        };
        tree.root = tree.insert(root);
        tree
    }

    /// Insert a detached widget; attach it with [`WidgetTree::attach`].
    pub fn insert(&mut self, widget: Widget) -> WidgetId {
        let id = WidgetId(self.nodes.len());
        self.nodes.push(Node {
            name: widget.name,
            parent: None,
            children: Vec::new(),
            rect: widget.rect,
            visible: widget.visible,
            background: widget.background,
            dirty: true,
            kind: widget.kind,
        });
        id
    }

    /// Insert a widget and attach it to `parent` in one step.
    pub fn add_child(&mut self, parent: WidgetId, widget: Widget) -> WidgetId {
        let id = self.insert(widget);
        self.attach(parent, id)
            .expect("freshly inserted widget has no parent");
        id
    }

    #[must_use]
    pub const fn root(&self) -> WidgetId {
        self.root
    }

    /// Append `child` to `parent`'s child list.
    ///
    /// # Errors
    /// [`Error::AlreadyAttached`] if the child already has a parent; it must
    /// be detached from that parent first.
    pub fn attach(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), Error> {
        if self.nodes[child.0].parent.is_some() {
            return Err(Error::AlreadyAttached);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].dirty = true;
        Ok(())
    }

    /// Remove `child` from `parent`'s child list.
    ///
    /// # Errors
    /// [`Error::ChildNotFound`] if `child` is not currently a child of
    /// `parent`.
    pub fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), Error> {
        let children = &mut self.nodes[parent.0].children;
        let pos = children
            .iter()
            .position(|c| *c == child)
            .ok_or(Error::ChildNotFound)?;
        children.remove(pos);
        self.nodes[child.0].parent = None;
        self.nodes[parent.0].dirty = true;
        Ok(())
    }

    /// Find the first widget named `name`, starting at `from`.
    ///
    /// The search is two-phase and deterministic: the starting widget
    /// itself, then its immediate children in insertion order, then each
    /// child's subtree depth-first in the same order.
    #[must_use]
    pub fn find_by_name(&self, from: WidgetId, name: &str) -> Option<WidgetId> {
        if self.nodes[from.0].name.as_deref() == Some(name) {
            return Some(from);
        }
        for &child in &self.nodes[from.0].children {
            if self.nodes[child.0].name.as_deref() == Some(name) {
                return Some(child);
            }
        }
        for &child in &self.nodes[from.0].children {
            if let Some(found) = self.find_by_name(child, name) {
                return Some(found);
            }
        }
        None
    }

    #[must_use]
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        &self.nodes[id.0].children
    }

    #[must_use]
    pub fn name(&self, id: WidgetId) -> Option<&str> {
        self.nodes[id.0].name.as_deref()
    }

    #[must_use]
    pub fn rect(&self, id: WidgetId) -> Rect {
        self.nodes[id.0].rect
    }

    pub fn set_rect(&mut self, id: WidgetId, rect: Rect) {
        if self.nodes[id.0].rect == rect {
            return;
        }
        self.nodes[id.0].rect = rect;
        if let WidgetKind::Label(label) = &mut self.nodes[id.0].kind {
            label.invalidate_fit();
        }
        self.nodes[id.0].dirty = true;
    }

    /// Cumulative offset contributed by the ancestors of `id`.
    fn ancestor_offset(&self, id: WidgetId) -> (i32, i32) {
        let mut dx = 0;
        let mut dy = 0;
        let mut cursor = self.nodes[id.0].parent;
        while let Some(p) = cursor {
            dx += self.nodes[p.0].rect.x;
            dy += self.nodes[p.0].rect.y;
            cursor = self.nodes[p.0].parent;
        }
        (dx, dy)
    }

    /// The widget's rectangle relative to the root.
    #[must_use]
    pub fn screen_rect(&self, id: WidgetId) -> Rect {
        let (dx, dy) = self.ancestor_offset(id);
        self.nodes[id.0].rect.offset(dx, dy)
    }

    /// Position a widget by screen coordinates; the stored local rectangle
    /// is back-computed against the ancestor offsets.
    pub fn set_screen_rect(&mut self, id: WidgetId, rect: Rect) {
        let (dx, dy) = self.ancestor_offset(id);
        self.set_rect(id, rect.offset(-dx, -dy));
    }

    #[must_use]
    pub fn visible(&self, id: WidgetId) -> bool {
        self.nodes[id.0].visible
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        if self.nodes[id.0].visible == visible {
            return;
        }
        self.nodes[id.0].visible = visible;
        self.nodes[id.0].dirty = true;
    }

    pub fn set_background(&mut self, id: WidgetId, color: Option<Rgba<u8>>) {
        if self.nodes[id.0].background == color {
            return;
        }
        self.nodes[id.0].background = color;
        self.nodes[id.0].dirty = true;
    }

    /// Mark a widget as needing relayout and redraw.
    pub fn invalidate(&mut self, id: WidgetId) {
        self.nodes[id.0].dirty = true;
    }

    /// Whether the widget or any of its descendants is dirty.
    #[must_use]
    pub fn is_dirty(&self, id: WidgetId) -> bool {
        if self.nodes[id.0].dirty {
            return true;
        }
        self.nodes[id.0]
            .children
            .iter()
            .any(|&child| self.is_dirty(child))
    }

    #[must_use]
    pub fn label(&self, id: WidgetId) -> Option<&Label> {
        match &self.nodes[id.0].kind {
            WidgetKind::Label(label) => Some(label),
            WidgetKind::Panel => None,
        }
    }

    /// Mutate a label through `f`; the widget is invalidated when `f`
    /// reports a change.
    pub fn update_label<T>(&mut self, id: WidgetId, f: impl FnOnce(&mut Label) -> T) -> T
    where
        T: ChangeFlag,
    {
        let out = match &mut self.nodes[id.0].kind {
            WidgetKind::Label(label) => f(label),
            WidgetKind::Panel => panic!("widget {id:?} is not a label"),
        };
        if out.changed() {
            self.nodes[id.0].dirty = true;
        }
        out
    }

    /// Lay out the subtree rooted at `id`.
    ///
    /// Invisible widgets are skipped entirely. A visible widget runs its
    /// kind-specific layout hook, clears its own dirty flag, and recurses
    /// into every child whether or not that child is dirty.
    pub fn layout(&mut self, id: WidgetId, canvas: &mut Canvas<'_>) {
        if !self.nodes[id.0].visible {
            return;
        }
        let rect = self.nodes[id.0].rect;
        if let WidgetKind::Label(label) = &mut self.nodes[id.0].kind {
            label.do_layout(canvas, rect);
        }
        self.nodes[id.0].dirty = false;
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.layout(child, canvas);
        }
    }

    /// Draw the subtree rooted at `id` in tree order: background fill,
    /// kind-specific draw hook, then children.
    pub fn draw(&mut self, id: WidgetId, canvas: &mut Canvas<'_>) {
        if !self.nodes[id.0].visible {
            return;
        }
        let screen = self.screen_rect(id);
        if let Some(color) = self.nodes[id.0].background {
            canvas.fill_rect(screen, color);
        }
        if let WidgetKind::Label(label) = &mut self.nodes[id.0].kind {
            label.do_draw(canvas, screen);
        }
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.draw(child, canvas);
        }
    }
}

/// Lets [`WidgetTree::update_label`] decide whether to invalidate based on
/// the closure's return value.
pub trait ChangeFlag {
    fn changed(&self) -> bool;
}

impl ChangeFlag for bool {
    fn changed(&self) -> bool {
        *self
    }
}

impl ChangeFlag for Result<bool, Error> {
    fn changed(&self) -> bool {
        matches!(self, Ok(true))
    }
}
