//! Text label widget: fits its text to the widget box by binary-searching a
//! font size, then renders the block centered.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use image::Rgba;
use tracing::warn;

use crate::error::Error;
use crate::geometry::Rect;
use crate::ui::font::DEFAULT_FONT;
use crate::ui::widget::Canvas;

/// Upper bound of the font-size search, in pixels.
pub const MAX_FONT_SIZE: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Result of a completed fit: the chosen size and the measured text block.
#[derive(Debug, Clone)]
struct Fitted {
    font: FontArc,
    size: u32,
    box_width: f32,
    box_height: f32,
}

#[derive(Debug)]
pub struct Label {
    text: String,
    font_name: String,
    font_color: Rgba<u8>,
    align: Align,
    // None means the fit is stale and must be recomputed before drawing.
    fitted: Option<Fitted>,
}

impl Label {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_name: DEFAULT_FONT.to_string(),
            font_color: Rgba([0, 0, 0, 255]),
            align: Align::Left,
            fitted: None,
        }
    }

    #[must_use]
    pub fn with_font_color(mut self, color: Rgba<u8>) -> Self {
        self.font_color = color;
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true when the text actually changed.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.text {
            return false;
        }
        self.text = text;
        self.fitted = None;
        true
    }

    #[must_use]
    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    /// # Errors
    /// [`Error::EmptyFontName`] when `font_name` is empty.
    pub fn set_font_name(&mut self, font_name: impl Into<String>) -> Result<bool, Error> {
        let font_name = font_name.into();
        if font_name.is_empty() {
            return Err(Error::EmptyFontName);
        }
        if font_name == self.font_name {
            return Ok(false);
        }
        self.font_name = font_name;
        self.fitted = None;
        Ok(true)
    }

    #[must_use]
    pub const fn font_color(&self) -> Rgba<u8> {
        self.font_color
    }

    pub fn set_font_color(&mut self, color: Rgba<u8>) -> bool {
        if color == self.font_color {
            return false;
        }
        self.font_color = color;
        true
    }

    #[must_use]
    pub const fn align(&self) -> Align {
        self.align
    }

    pub fn set_align(&mut self, align: Align) -> bool {
        if align == self.align {
            return false;
        }
        self.align = align;
        true
    }

    /// Fitted font size, when current. Exposed for tests.
    #[must_use]
    pub fn fitted_size(&self) -> Option<u32> {
        self.fitted.as_ref().map(|f| f.size)
    }

    /// Measured text block for the current fit, when current.
    #[must_use]
    pub fn fitted_box(&self) -> Option<(f32, f32)> {
        self.fitted.as_ref().map(|f| (f.box_width, f.box_height))
    }

    /// Drop the cached fit; called when the widget box changes.
    pub fn invalidate_fit(&mut self) {
        self.fitted = None;
    }

    /// Fit the text to the widget box and cache the result.
    pub fn do_layout(&mut self, canvas: &mut Canvas<'_>, rect: Rect) {
        let font = match canvas.fonts.resolve(&self.font_name) {
            Ok(font) => font,
            Err(err) => {
                warn!(font = %self.font_name, "font resolution failed: {err:?}");
                return;
            }
        };

        let (max_w, max_h) = (rect.width as f32, rect.height as f32);
        let size = fit_size(MAX_FONT_SIZE, |candidate| {
            let (w, h) = measure_block(&self.text, &font, PxScale::from(candidate as f32));
            w <= max_w && h <= max_h
        });
        let (box_width, box_height) = measure_block(&self.text, &font, PxScale::from(size as f32));
        self.fitted = Some(Fitted {
            font,
            size,
            box_width,
            box_height,
        });
    }

    /// Draw the fitted text centered in `screen`. Runs the fit first when it
    /// is stale, so drawing never depends on an explicit layout pass.
    pub fn do_draw(&mut self, canvas: &mut Canvas<'_>, screen: Rect) {
        if self.fitted.is_none() {
            self.do_layout(canvas, Rect::new(0, 0, screen.width, screen.height));
        }
        let Some(fitted) = self.fitted.clone() else {
            return;
        };

        let scale = PxScale::from(fitted.size as f32);
        let metrics = line_metrics(&fitted.font, scale);
        let block_left = screen.x as f32 + (screen.width as f32 - fitted.box_width) / 2.0;
        let mut line_top = screen.y as f32 + (screen.height as f32 - fitted.box_height) / 2.0;

        for line in self.text.split('\n') {
            let line_width = measure_line(line, &fitted.font, scale);
            let left = match self.align {
                Align::Left => block_left,
                Align::Center => block_left + (fitted.box_width - line_width) / 2.0,
                Align::Right => block_left + fitted.box_width - line_width,
            };
            draw_line(
                canvas,
                &fitted.font,
                line,
                self.font_color,
                left,
                line_top + metrics.ascent,
                scale,
            );
            line_top += metrics.ascent + metrics.descent + metrics.line_gap;
        }
    }
}

/// Largest size in `[1, max_size]` accepted by `fits`, found the way the
/// booth has always found it: a midpoint search that stops once the midpoint
/// collides with a bound, keeping the last midpoint. Larger sizes win ties.
#[must_use]
pub fn fit_size(max_size: u32, fits: impl Fn(u32) -> bool) -> u32 {
    let mut lo = 1u32;
    let mut hi = max_size.max(1);
    let mut current = lo;
    while lo != hi {
        current = lo + (hi - lo) / 2;
        if current == lo || current == hi {
            break;
        }
        if fits(current) {
            lo = current;
        } else {
            hi = current;
        }
    }
    current
}

struct LineMetrics {
    ascent: f32,
    descent: f32,
    line_gap: f32,
}

fn line_metrics(font: &FontArc, scale: PxScale) -> LineMetrics {
    let scaled = font.as_scaled(scale);
    LineMetrics {
        ascent: scaled.ascent(),
        descent: scaled.descent().abs(),
        line_gap: scaled.line_gap(),
    }
}

/// Advance width of a single line, kerning included.
fn measure_line(line: &str, font: &FontArc, scale: PxScale) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut previous = None;
    for ch in line.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        previous = Some(glyph_id);
    }
    width.max(0.0)
}

/// Bounding box of a (possibly multi-line) text block.
fn measure_block(text: &str, font: &FontArc, scale: PxScale) -> (f32, f32) {
    let metrics = line_metrics(font, scale);
    let mut width = 0.0f32;
    let mut lines = 0usize;
    for line in text.split('\n') {
        width = width.max(measure_line(line, font, scale));
        lines += 1;
    }
    let lines = lines.max(1) as f32;
    let height = lines * (metrics.ascent + metrics.descent) + (lines - 1.0) * metrics.line_gap;
    (width, height)
}

fn draw_line(
    canvas: &mut Canvas<'_>,
    font: &FontArc,
    line: &str,
    color: Rgba<u8>,
    left: f32,
    baseline: f32,
    scale: PxScale,
) {
    let scaled = font.as_scaled(scale);
    let mut cursor_x = left;
    let mut previous = None;
    for ch in line.chars() {
        if ch.is_control() {
            continue;
        }
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        let advance = scaled.h_advance(glyph_id);
        let mut positioned = scaled.scaled_glyph(ch);
        positioned.position = point(cursor_x, baseline);
        if let Some(outline) = font.outline_glyph(positioned) {
            let bounds = outline.px_bounds();
            outline.draw(|x, y, coverage| {
                blend_pixel(
                    canvas,
                    bounds.min.x + x as f32,
                    bounds.min.y + y as f32,
                    color,
                    coverage,
                );
            });
        }
        cursor_x += advance;
        previous = Some(glyph_id);
    }
}

fn blend_pixel(canvas: &mut Canvas<'_>, x: f32, y: f32, color: Rgba<u8>, coverage: f32) {
    if x < 0.0 || y < 0.0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= canvas.frame.width() || y >= canvas.frame.height() {
        return;
    }
    let alpha = (coverage * color.0[3] as f32 / 255.0).clamp(0.0, 1.0);
    let dest = canvas.frame.get_pixel_mut(x, y);
    for channel in 0..3 {
        let src = color.0[channel] as f32;
        let dst = dest.0[channel] as f32;
        dest.0[channel] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
    }
    dest.0[3] = dest.0[3].max((alpha * 255.0).round() as u8);
}

#[cfg(test)]
mod tests {
    use super::fit_size;

    #[test]
    fn fit_search_converges_on_threshold() {
        let size = fit_size(1024, |s| s <= 100);
        assert_eq!(size, 100);
    }

    #[test]
    fn fit_search_handles_tiny_bounds() {
        assert_eq!(fit_size(1, |_| true), 1);
        assert_eq!(fit_size(2, |_| true), 1);
        assert_eq!(fit_size(0, |_| true), 1);
    }

    #[test]
    fn fit_search_never_reaches_the_exclusive_upper_bound() {
        // The source search cannot return the upper bound itself; 1023 is
        // the ceiling even when everything fits. Pinned on purpose.
        let size = fit_size(1024, |_| true);
        assert_eq!(size, 1023);
    }

    #[test]
    fn fit_search_bottoms_out_at_one() {
        let size = fit_size(1024, |_| false);
        assert_eq!(size, 1);
    }
}
