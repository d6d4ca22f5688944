//! Integration tests for the size query protocol.

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trellis::{
        Core, Widget,
        error::{Error, Result},
        geom::{Edges, Expanse, Orientation, Rect},
        layout::{Align, Constraint, Constraints, Measurement, PackMode, SizeMode, SizeRequest},
        testing::{FixedWidget, ManualLoop, WrapWidget},
    };

    /// Text set on its side: the width depends on the allocated height.
    struct VerticalText {
        /// Content length in units.
        len: u32,
        /// Width of one column.
        column: u32,
    }

    impl Widget for VerticalText {
        fn measure(&self, c: Constraints) -> Result<Measurement> {
            let columns = c
                .height
                .exact()
                .map_or(1, |h| self.len.div_ceil(h.max(10)));
            Ok(Measurement::new(
                SizeRequest::fixed(columns * self.column),
                SizeRequest::new(10, self.len),
            ))
        }

        fn size_mode(&self) -> SizeMode {
            SizeMode::WidthForHeight
        }
    }

    #[test]
    fn cache_holds_one_constraint_pair() -> Result<()> {
        let mut core = Core::new(ManualLoop::new());
        let text = WrapWidget::new(100, 10, 2);
        let probe = text.probe();
        let id = core.add_leaf(text);

        assert_eq!(core.preferred_width(id)?, SizeRequest::new(10, 100));
        assert_eq!(core.preferred_width(id)?, SizeRequest::new(10, 100));
        assert_eq!(probe.measure_count(), 1);

        assert_eq!(core.preferred_height_for_width(id, 25)?, SizeRequest::fixed(8));
        assert_eq!(core.preferred_height_for_width(id, 25)?, SizeRequest::fixed(8));
        assert_eq!(probe.measure_count(), 2);

        core.preferred_width(id)?;
        assert_eq!(probe.measure_count(), 3);
        Ok(())
    }

    #[test]
    fn invalidation_drops_cached_size() -> Result<()> {
        let mut core = Core::new(ManualLoop::new());
        let widget = FixedWidget::new(4, 2);
        let probe = widget.probe();
        let id = core.add_leaf(widget);

        assert_eq!(core.preferred_width(id)?, SizeRequest::fixed(4));
        probe.set_size(9, 2);
        assert_eq!(core.preferred_width(id)?, SizeRequest::fixed(4));
        core.queue_resize(id)?;
        assert_eq!(core.preferred_width(id)?, SizeRequest::fixed(9));
        Ok(())
    }

    #[test]
    fn ancestors_are_invalidated_with_the_child() -> Result<()> {
        let mut core = Core::new(ManualLoop::new());
        let boxed = core.add_box(Orientation::Vertical, 1);
        let widget = FixedWidget::new(4, 2);
        let probe = widget.probe();
        let leaf = core.add_leaf(widget);
        core.pack_start(boxed, leaf, PackMode::Natural, 0)?;
        let other = core.add_leaf(FixedWidget::new(6, 3));
        core.pack_start(boxed, other, PackMode::Natural, 0)?;

        assert_eq!(core.preferred_width(boxed)?, SizeRequest::fixed(6));
        assert_eq!(core.preferred_height(boxed)?, SizeRequest::fixed(6));
        probe.set_size(8, 5);
        core.queue_resize(leaf)?;
        assert_eq!(core.preferred_width(boxed)?, SizeRequest::fixed(8));
        assert_eq!(core.preferred_height(boxed)?, SizeRequest::fixed(9));
        Ok(())
    }

    #[test]
    fn margins_surround_the_request() -> Result<()> {
        let mut core = Core::new(ManualLoop::new());
        let id = core.add_leaf(WrapWidget::new(100, 10, 2));
        core.set_margin(id, Edges::symmetric(2, 1))?;

        assert_eq!(core.preferred_width(id)?, SizeRequest::new(14, 104));
        assert_eq!(core.preferred_height_for_width(id, 29)?, SizeRequest::fixed(10));
        assert_eq!(
            core.measure(
                id,
                Constraints::new(Constraint::Exact(54), Constraint::Unbounded)
            )?,
            Measurement::new(SizeRequest::new(14, 104), SizeRequest::fixed(6))
        );
        Ok(())
    }

    #[test]
    fn explicit_sizes_override_content() -> Result<()> {
        let mut core = Core::new(ManualLoop::new());
        let id = core.add_leaf(FixedWidget::with_request(
            SizeRequest::new(5, 30),
            SizeRequest::fixed(2),
        ));

        core.set_min_size(id, Some(20), None)?;
        assert_eq!(core.preferred_width(id)?, SizeRequest::new(20, 30));

        core.set_natural_size(id, Some(5), Some(7))?;
        assert_eq!(core.preferred_width(id)?, SizeRequest::fixed(20));
        assert_eq!(core.preferred_height(id)?, SizeRequest::new(2, 7));

        core.set_min_size(id, Some(1), None)?;
        assert_eq!(core.preferred_width(id)?, SizeRequest::new(5, 5));
        Ok(())
    }

    #[test]
    fn size_modes() -> Result<()> {
        let mut core = Core::new(ManualLoop::new());
        let text = core.add_leaf(WrapWidget::new(10, 2, 1));
        let side = core.add_leaf(VerticalText { len: 100, column: 2 });
        let boxed = core.add_box(Orientation::Horizontal, 0);
        let table = core.add_table(0, 0);

        assert_eq!(core.size_mode(text)?, SizeMode::HeightForWidth);
        assert_eq!(core.size_mode(side)?, SizeMode::WidthForHeight);
        assert_eq!(core.size_mode(boxed)?, SizeMode::HeightForWidth);
        assert_eq!(core.size_mode(table)?, SizeMode::HeightForWidth);
        Ok(())
    }

    #[test]
    fn width_for_height_resolves_height_first() -> Result<()> {
        let mut core = Core::new(ManualLoop::new());
        let side = core.add_leaf(VerticalText { len: 100, column: 2 });
        assert_eq!(core.preferred_width_for_height(side, 25)?, SizeRequest::fixed(8));
        assert_eq!(core.preferred_width(side)?, SizeRequest::fixed(2));

        core.set_halign(side, Align::Start)?;
        core.allocate(side, Rect::new(0, 0, 50, 25))?;
        assert_eq!(core.rect(side)?, Rect::new(0, 0, 8, 25));
        Ok(())
    }

    #[test]
    fn allocation_satisfies_height_for_width() -> Result<()> {
        let mut core = Core::new(ManualLoop::new());
        let window = core.add_window();
        let column = core.add_box(Orientation::Vertical, 0);
        let text = core.add_leaf(WrapWidget::new(100, 10, 2));
        core.set_content(window, column)?;
        core.pack_start(column, text, PackMode::Natural, 0)?;
        core.set_default_size(window, Some(Expanse::new(30, 0)))?;
        core.run_checkpoint();

        let r = core.rect(text)?;
        assert_eq!(r, Rect::new(0, 0, 30, 8));
        assert!(core.preferred_height_for_width(text, r.w)?.minimum <= r.h);
        assert_eq!(core.window_state(window)?.size(), Expanse::new(30, 8));
        Ok(())
    }

    #[test]
    fn missing_nodes_are_reported() -> Result<()> {
        let mut core = Core::new(ManualLoop::new());
        let id = core.add_leaf(FixedWidget::new(1, 1));
        core.remove_subtree(id)?;

        assert_eq!(core.preferred_width(id), Err(Error::NodeNotFound(id)));
        assert_eq!(core.size_mode(id), Err(Error::NodeNotFound(id)));
        assert_eq!(core.queue_resize(id), Err(Error::NodeNotFound(id)));
        assert!(core.scheduler().is_empty());
        Ok(())
    }
}
