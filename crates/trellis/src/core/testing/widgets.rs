use std::{cell::RefCell, rc::Rc};

use crate::{
    core::error::{Error, Result},
    geom::Rect,
    layout::{Constraints, Measurement, SizeMode, SizeRequest},
    widget::{Applied, Widget},
};

/// Shared state between a test and a widget it has handed to the core.
#[derive(Debug, Default)]
struct ProbeState {
    /// Measurement the widget reports.
    measurement: Measurement,
    /// Number of times the widget was measured.
    measures: usize,
    /// Rectangles applied, in order.
    applied: Vec<Rect>,
    /// Fail the next measurements.
    fail_measure: bool,
    /// Ask for a resize on the next apply.
    resize_on_apply: bool,
}

/// A handle onto a test widget after it has moved into the arena. Clones
/// share state.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    /// Shared state.
    inner: Rc<RefCell<ProbeState>>,
}

impl Probe {
    /// Change what the widget reports. Callers must still queue a resize.
    pub fn set_measurement(&self, m: Measurement) {
        self.inner.borrow_mut().measurement = m;
    }

    /// Change the reported size to a fixed width and height.
    pub fn set_size(&self, w: u32, h: u32) {
        self.set_measurement(Measurement::fixed(w, h));
    }

    /// The measurement the widget reports.
    pub fn measurement(&self) -> Measurement {
        self.inner.borrow().measurement
    }

    /// How many times the widget has been measured.
    pub fn measure_count(&self) -> usize {
        self.inner.borrow().measures
    }

    /// Every rectangle applied to the widget, in order.
    pub fn applied(&self) -> Vec<Rect> {
        self.inner.borrow().applied.clone()
    }

    /// Number of rectangles applied.
    pub fn apply_count(&self) -> usize {
        self.inner.borrow().applied.len()
    }

    /// The last rectangle applied.
    pub fn last_applied(&self) -> Option<Rect> {
        self.inner.borrow().applied.last().copied()
    }

    /// Make measurement fail until reset.
    pub fn set_failing(&self, fail: bool) {
        self.inner.borrow_mut().fail_measure = fail;
    }

    /// Ask for another size check the next time a rectangle is applied.
    pub fn resize_on_next_apply(&self) {
        self.inner.borrow_mut().resize_on_apply = true;
    }

    /// Record a measurement and return the scripted one.
    fn measured(&self) -> Result<Measurement> {
        let mut s = self.inner.borrow_mut();
        s.measures += 1;
        if s.fail_measure {
            return Err(Error::Backend("scripted measure failure".into()));
        }
        Ok(s.measurement)
    }

    /// Record an applied rectangle.
    fn record(&self, rect: Rect) -> Applied {
        let mut s = self.inner.borrow_mut();
        s.applied.push(rect);
        if s.resize_on_apply {
            s.resize_on_apply = false;
            Applied::Resize
        } else {
            Applied::Settled
        }
    }
}

/// A widget whose size does not depend on its constraints.
#[derive(Debug, Clone, Default)]
pub struct FixedWidget {
    /// Shared state.
    probe: Probe,
}

impl FixedWidget {
    /// A widget with equal minimum and natural size.
    pub fn new(w: u32, h: u32) -> Self {
        Self::with_request(SizeRequest::fixed(w), SizeRequest::fixed(h))
    }

    /// A widget with separate minimum and natural sizes.
    pub fn with_request(width: SizeRequest, height: SizeRequest) -> Self {
        let probe = Probe::default();
        probe.set_measurement(Measurement::new(width, height));
        Self { probe }
    }

    /// A handle for observing the widget after it moves into the arena.
    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }
}

impl Widget for FixedWidget {
    fn measure(&self, _c: Constraints) -> Result<Measurement> {
        self.probe.measured()
    }

    fn apply(&mut self, rect: Rect) -> Result<Applied> {
        Ok(self.probe.record(rect))
    }
}

/// A text-like widget that wraps `len` units of content into lines of the
/// allocated width. Its height depends on its width.
#[derive(Debug, Clone, Default)]
pub struct WrapWidget {
    /// Content length in units.
    len: u32,
    /// Widest unbreakable run: the minimum width.
    word: u32,
    /// Height of one line.
    line: u32,
    /// Shared state.
    probe: Probe,
}

impl WrapWidget {
    /// Construct a wrapping widget.
    pub fn new(len: u32, word: u32, line: u32) -> Self {
        Self {
            len,
            word: word.min(len),
            line,
            probe: Probe::default(),
        }
    }

    /// A handle for observing the widget after it moves into the arena.
    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }

    /// Number of lines at a given width.
    fn lines(&self, width: u32) -> u32 {
        let width = width.max(self.word).max(1);
        self.len.div_ceil(width).max(1)
    }
}

impl Widget for WrapWidget {
    fn measure(&self, c: Constraints) -> Result<Measurement> {
        self.probe.measured()?;
        let width = SizeRequest::new(self.word, self.len);
        let lines = c.width.exact().map_or(1, |w| self.lines(w));
        let height = SizeRequest::fixed(lines * self.line);
        Ok(Measurement::new(width, height))
    }

    fn apply(&mut self, rect: Rect) -> Result<Applied> {
        Ok(self.probe.record(rect))
    }

    fn size_mode(&self) -> SizeMode {
        SizeMode::HeightForWidth
    }
}

/// A widget whose backend always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingWidget;

impl Widget for FailingWidget {
    fn measure(&self, _c: Constraints) -> Result<Measurement> {
        Err(Error::Backend("measure failed".into()))
    }

    fn apply(&mut self, _rect: Rect) -> Result<Applied> {
        Err(Error::Backend("apply failed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_height_follows_width() -> Result<()> {
        let w = WrapWidget::new(100, 10, 2);
        assert_eq!(w.measure(Constraints::UNBOUNDED)?.height.natural, 2);
        assert_eq!(w.measure(Constraints::for_width(50))?.height.natural, 4);
        assert_eq!(w.measure(Constraints::for_width(30))?.height.natural, 8);
        // Narrower than the widest word: clamps to the word.
        assert_eq!(w.measure(Constraints::for_width(1))?.height.natural, 20);
        assert_eq!(w.probe().measure_count(), 4);
        Ok(())
    }

    #[test]
    fn probe_scripts_failures_and_resizes() {
        let w = FixedWidget::new(3, 4);
        let probe = w.probe();
        probe.set_failing(true);
        assert!(w.measure(Constraints::UNBOUNDED).is_err());
        probe.set_failing(false);
        probe.resize_on_next_apply();
        assert_eq!(probe.record(Rect::new(0, 0, 3, 4)), Applied::Resize);
        assert_eq!(probe.record(Rect::new(0, 0, 3, 4)), Applied::Settled);
        assert_eq!(probe.apply_count(), 2);
    }
}
