//! # Segments and module outputs.
//!
//! A [`Segment`] is the smallest unit the bar paints: text, an optional
//! semantic [`Color`], padding and an optional [`Click`] binding. An
//! [`Output`] is what one module emits per tick: zero, one or many segments.
//!
//! ## Rules
//! - Segments are immutable once built; a module emits new ones to change the display.
//! - Equality is by value over `(text, color, padding)`. Click bindings are
//!   closures rebuilt every tick and never take part in equality, so an
//!   otherwise identical segment does not trigger a repaint.
//! - An empty [`Output`] hides the module.

use std::fmt;

use super::click::Click;

/// Semantic color tag, resolved to a concrete color by the renderer's palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Good,
    Bad,
    Degraded,
}

/// Styled unit of bar text with an optional click binding.
#[derive(Clone, Default)]
pub struct Segment {
    text: String,
    color: Option<Color>,
    padding: u32,
    click: Option<Click>,
}

impl Segment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets or clears the color; `None` leaves the text in the default color.
    #[inline]
    pub fn with_color_opt(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    #[inline]
    pub fn with_click(mut self, click: Click) -> Self {
        self.click = Some(click);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    pub fn click(&self) -> Option<&Click> {
        self.click.as_ref()
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.color == other.color && self.padding == other.padding
    }
}

impl Eq for Segment {}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("text", &self.text)
            .field("color", &self.color)
            .field("padding", &self.padding)
            .field("click", &self.click)
            .finish()
    }
}

/// Ordered segments emitted by one module for one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Output(Vec<Segment>);

impl Output {
    /// The "hidden this tick" output.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn one(segment: Segment) -> Self {
        Self(vec![segment])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }
}

impl From<Segment> for Output {
    fn from(segment: Segment) -> Self {
        Self::one(segment)
    }
}

impl From<Option<Segment>> for Output {
    fn from(segment: Option<Segment>) -> Self {
        segment.map(Self::one).unwrap_or_default()
    }
}

impl From<Vec<Segment>> for Output {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<Segment> for Output {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Output {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_click_binding() {
        let plain = Segment::new("W: home (80%)").with_color(Color::Good);
        let clickable = plain
            .clone()
            .with_click(Click::left(|_ctx| async { Ok(()) }));
        assert_eq!(plain, clickable);
    }

    #[test]
    fn equality_tracks_style() {
        let a = Segment::new("E: down").with_color(Color::Bad).with_padding(25);
        assert_ne!(a, a.clone().with_padding(0));
        assert_ne!(a, a.clone().with_color(Color::Degraded));
        assert_ne!(a, Segment::new("E: up").with_color(Color::Bad).with_padding(25));
    }

    #[test]
    fn color_opt_sets_and_clears() {
        let warned = Segment::new("/: 1.2 GiB").with_color_opt(Some(Color::Bad));
        assert_eq!(warned.color(), Some(Color::Bad));
        assert_eq!(warned.with_color_opt(None).color(), None);
    }

    #[test]
    fn output_from_option() {
        assert!(Output::from(None::<Segment>).is_empty());
        assert_eq!(Output::from(Some(Segment::new("x"))).len(), 1);
    }
}
