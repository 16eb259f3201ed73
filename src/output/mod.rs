//! Display model: segments, outputs, click bindings and the composite line.

mod click;
mod line;
mod segment;

pub use click::{ActionFuture, ActionRef, Button, Click, ClickContext, ClickEvent, SegmentRef};
pub use line::{CompositeLine, LineEntry};
pub use segment::{Color, Output, Segment};
