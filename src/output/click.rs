//! # Click events and bindings.
//!
//! A [`Click`] maps mouse buttons to async actions. Actions are
//! function-backed: each invocation creates a fresh future, so a binding can
//! be fired any number of times and cloned freely into new segments.
//!
//! ```rust
//! use barvisor::{Button, Click, Segment};
//!
//! let seg = Segment::new("W: down").with_click(
//!     Click::left(|ctx| async move {
//!         // restart something, then ask the module for a fresh tick
//!         ctx.refresh.now();
//!         Ok(())
//!     }),
//! );
//! assert!(seg.click().unwrap().is_bound(Button::Left));
//! assert!(!seg.click().unwrap().is_bound(Button::Right));
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::ModuleError;
use crate::module::Refresh;

/// Mouse buttons reported by the bar host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    Back,
    Forward,
}

impl Button {
    /// Maps an X11 button number (as sent by i3bar/swaybar) to a [`Button`].
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => Button::Left,
            2 => Button::Middle,
            3 => Button::Right,
            4 => Button::ScrollUp,
            5 => Button::ScrollDown,
            6 => Button::ScrollLeft,
            7 => Button::ScrollRight,
            8 => Button::Back,
            9 => Button::Forward,
            _ => return None,
        })
    }
}

/// Addresses one segment of the composite line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentRef {
    /// Position in the composite line (0-based).
    Position(usize),
    /// Segment `segment` of the module registered at index `module`.
    Module { module: usize, segment: usize },
}

/// A click reported by the bar host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickEvent {
    pub button: Button,
    pub target: SegmentRef,
}

impl ClickEvent {
    pub fn at(position: usize, button: Button) -> Self {
        Self {
            button,
            target: SegmentRef::Position(position),
        }
    }
}

/// What an action receives when it runs.
#[derive(Clone, Debug)]
pub struct ClickContext {
    pub button: Button,
    /// Refresh handle of the module that owns the clicked segment.
    pub refresh: Refresh,
}

/// Boxed future returned by an action.
pub type ActionFuture = BoxFuture<'static, Result<(), ModuleError>>;

/// Shared, re-invocable click action.
pub type ActionRef = Arc<dyn Fn(ClickContext) -> ActionFuture + Send + Sync>;

/// Button → action bindings of one segment.
///
/// Lookup prefers an exact button binding over a catch-all one.
#[derive(Clone, Default)]
pub struct Click {
    bindings: Vec<(Option<Button>, ActionRef)>,
}

impl Click {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `f` to `button`.
    pub fn on<F, Fut>(mut self, button: Button, f: F) -> Self
    where
        F: Fn(ClickContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ModuleError>> + Send + 'static,
    {
        self.bindings.push((Some(button), boxed(f)));
        self
    }

    /// Binds `f` to every button not bound explicitly.
    pub fn on_any<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ClickContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ModuleError>> + Send + 'static,
    {
        self.bindings.push((None, boxed(f)));
        self
    }

    pub fn left<F, Fut>(f: F) -> Self
    where
        F: Fn(ClickContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ModuleError>> + Send + 'static,
    {
        Self::new().on(Button::Left, f)
    }

    pub fn right<F, Fut>(f: F) -> Self
    where
        F: Fn(ClickContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ModuleError>> + Send + 'static,
    {
        Self::new().on(Button::Right, f)
    }

    pub fn any<F, Fut>(f: F) -> Self
    where
        F: Fn(ClickContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ModuleError>> + Send + 'static,
    {
        Self::new().on_any(f)
    }

    /// Returns the action bound to `button`, if any.
    pub fn action_for(&self, button: Button) -> Option<&ActionRef> {
        self.bindings
            .iter()
            .find(|(b, _)| *b == Some(button))
            .or_else(|| self.bindings.iter().find(|(b, _)| b.is_none()))
            .map(|(_, action)| action)
    }

    pub fn is_bound(&self, button: Button) -> bool {
        self.action_for(button).is_some()
    }
}

fn boxed<F, Fut>(f: F) -> ActionRef
where
    F: Fn(ClickContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ModuleError>> + Send + 'static,
{
    Arc::new(move |ctx: ClickContext| Box::pin(f(ctx)) as ActionFuture)
}

impl fmt::Debug for Click {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buttons: Vec<String> = self
            .bindings
            .iter()
            .map(|(b, _)| match b {
                Some(b) => format!("{b:?}"),
                None => "Any".to_string(),
            })
            .collect();
        f.debug_tuple("Click").field(&buttons).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_binding_wins_over_catch_all() {
        let click = Click::any(|_ctx| async { Err(ModuleError::fail("catch-all")) })
            .on(Button::Right, |_ctx| async { Ok(()) });
        assert!(click.is_bound(Button::Left));
        assert!(click.is_bound(Button::Right));
        assert_eq!(format!("{click:?}"), r#"Click(["Any", "Right"])"#);
    }

    #[tokio::test]
    async fn action_runs_with_context_button() {
        let click = Click::any(|ctx: ClickContext| async move {
            if ctx.button == Button::Middle {
                Ok(())
            } else {
                Err(ModuleError::fail("wrong button"))
            }
        });
        let action = click.action_for(Button::Middle).unwrap();
        let ctx = ClickContext {
            button: Button::Middle,
            refresh: Refresh::new(),
        };
        assert!(action(ctx).await.is_ok());
    }

    #[test]
    fn button_codes() {
        assert_eq!(Button::from_code(1), Some(Button::Left));
        assert_eq!(Button::from_code(3), Some(Button::Right));
        assert_eq!(Button::from_code(5), Some(Button::ScrollDown));
        assert_eq!(Button::from_code(42), None);
    }
}
