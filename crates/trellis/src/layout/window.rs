use crate::{
    core::{id::NodeId, pass::LayoutPass},
    geom::{Expanse, Orientation, Rect},
    layout::{Constraints, Container, Measurement, SizeRequest},
};

/// State of a top-level window: its single content child and the size
/// negotiated for it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowState {
    /// The content child.
    pub(crate) content: Option<NodeId>,
    /// Size to use in place of the content's natural size.
    pub(crate) default_size: Option<Expanse>,
    /// Size last requested by the host, which takes precedence over the
    /// default.
    pub(crate) user_size: Option<Expanse>,
    /// The negotiated size.
    pub(crate) size: Expanse,
}

impl WindowState {
    /// The content child.
    pub fn content(&self) -> Option<NodeId> {
        self.content
    }

    /// The default size, if set.
    pub fn default_size(&self) -> Option<Expanse> {
        self.default_size
    }

    /// The size last reported by the host, if any.
    pub fn user_size(&self) -> Option<Expanse> {
        self.user_size
    }

    /// The negotiated size.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// The rectangle the window lays its content out in.
    pub fn area(&self) -> Rect {
        self.size.rect()
    }

    /// Preferred extent along an axis: host size, then default, then the
    /// natural size, never below the minimum.
    fn preferred(&self, o: Orientation, request: SizeRequest) -> u32 {
        self.user_size
            .or(self.default_size)
            .map_or(request.natural, |s| s.along(o))
            .max(request.minimum)
    }

    /// Renegotiate the window size against its content. Returns true if the
    /// size changed.
    pub(crate) fn adjust(&mut self, pass: &mut LayoutPass<'_>) -> bool {
        let m = self.measure(pass, Constraints::UNBOUNDED);
        let w = self.preferred(Orientation::Horizontal, m.width);
        let m = self.measure(pass, Constraints::for_width(w));
        let h = self.preferred(Orientation::Vertical, m.height);
        let size = Expanse::new(w, h);
        let changed = size != self.size;
        self.size = size;
        changed
    }
}

impl Container for WindowState {
    fn measure(&self, pass: &mut LayoutPass<'_>, c: Constraints) -> Measurement {
        self.content
            .filter(|id| pass.visible(*id))
            .map_or(Measurement::ZERO, |id| pass.measure(id, c))
    }

    fn allocate(&mut self, pass: &mut LayoutPass<'_>, rect: Rect) {
        if let Some(id) = self.content {
            pass.allocate(id, rect);
        }
    }
}
