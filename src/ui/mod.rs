pub mod context;
pub mod font;
pub mod label;
pub mod widget;

pub use context::{Control, TICK, UiContext};
pub use font::FontLibrary;
pub use label::{Align, Label};
pub use widget::{Canvas, Widget, WidgetId, WidgetTree};
