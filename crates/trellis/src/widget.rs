//! The leaf widget backend trait.

use std::any::type_name;

use crate::{
    error::Result,
    geom::Rect,
    layout::{Constraints, Measurement, SizeMode},
};

/// What a widget wants after receiving its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Applied {
    /// Nothing further.
    #[default]
    Settled,
    /// The widget's preferred size changed as a result of the new rectangle.
    Resize,
}

/// A leaf widget backend: a native control that can report its preferred
/// size and accept a final rectangle. Containers are built into the engine;
/// everything else is a `Widget`.
pub trait Widget: 'static {
    /// Report the (minimum, natural) size of the control for a constraint
    /// pair. Margins and explicit size overrides are applied by the engine.
    fn measure(&self, c: Constraints) -> Result<Measurement>;

    /// Apply a final rectangle, in window coordinates, to the native control.
    /// Returning [`Applied::Resize`] queues the widget for another size check,
    /// which the running batch picks up.
    fn apply(&mut self, _rect: Rect) -> Result<Applied> {
        Ok(Applied::Settled)
    }

    /// Which axis this widget's natural size depends on.
    fn size_mode(&self) -> SizeMode {
        SizeMode::HeightForWidth
    }

    /// Name used in dumps and logs.
    fn name(&self) -> String {
        let name = type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name).to_string()
    }
}

/// Convert widgets into boxed trait objects.
impl<W> From<W> for Box<dyn Widget>
where
    W: Widget,
{
    fn from(widget: W) -> Self {
        Box::new(widget)
    }
}
