//! Pixel rectangles and the display alignment rules the videocore overlay
//! hardware imposes: widths rounded up to a multiple of 32, heights to a
//! multiple of 16.

/// An axis-aligned pixel rectangle. `x`/`y` are relative to some parent
/// origin; widget code decides which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Construct from possibly fractional coordinates; fractions truncate.
    #[must_use]
    pub fn from_f64(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x as i32, y as i32, width as i32, height as i32)
    }

    #[must_use]
    pub const fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Translate by an offset, keeping the size.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Round `value` up to the next multiple of `align`.
#[must_use]
pub const fn align_up(value: i32, align: i32) -> i32 {
    (value + align - 1) / align * align
}

/// Normalize a size to the overlay hardware grid (width to 32, height to 16).
#[must_use]
pub const fn normalize_size(width: i32, height: i32) -> (i32, i32) {
    (align_up(width, 32), align_up(height, 16))
}

/// Normalize a rectangle's size in place; the origin is left alone.
#[must_use]
pub const fn normalize_rect(rect: Rect) -> Rect {
    let (width, height) = normalize_size(rect.width, rect.height);
    Rect::new(rect.x, rect.y, width, height)
}
