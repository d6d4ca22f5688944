//! Integration tests for table packing.

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trellis::{
        Core, NodeId,
        error::{Error, Result},
        geom::{Expanse, Orientation, Rect},
        layout::{Align, AttachOptions, Cells, SizeRequest},
        testing::{FixedWidget, ManualLoop, WrapWidget},
    };

    /// A window whose content is a single table.
    struct Fixture {
        /// The arena.
        core: Core,
        /// The table.
        table: NodeId,
    }

    fn fixture(column_spacing: u32, row_spacing: u32, size: Option<Expanse>) -> Result<Fixture> {
        let mut core = Core::new(ManualLoop::new());
        let window = core.add_window();
        let table = core.add_table(column_spacing, row_spacing);
        core.set_content(window, table)?;
        core.set_default_size(window, size)?;
        Ok(Fixture { core, table })
    }

    impl Fixture {
        fn put(&mut self, w: u32, h: u32, cells: Cells, options: AttachOptions) -> Result<NodeId> {
            let id = self.core.add_leaf(FixedWidget::new(w, h));
            self.core.attach(self.table, id, cells, options)?;
            Ok(id)
        }
    }

    #[test]
    fn span_need_lands_on_free_column() -> Result<()> {
        let mut f = fixture(4, 0, None)?;
        let single = f.put(80, 10, Cells::at(0, 0), AttachOptions::default())?;
        let span = f.put(150, 10, Cells::new(0, 2, 1, 2), AttachOptions::default())?;
        f.core.run_checkpoint();

        assert_eq!(f.core.preferred_width(f.table)?, SizeRequest::fixed(150));
        assert_eq!(f.core.rect(single)?, Rect::new(0, 0, 80, 10));
        assert_eq!(f.core.rect(span)?, Rect::new(0, 10, 150, 10));

        let layout = f.core.table_layout(f.table)?;
        assert_eq!(
            layout.placement(span).map(|p| p.slot()),
            Some(Rect::new(0, 10, 150, 10))
        );
        Ok(())
    }

    #[test]
    fn column_width_is_widest_single_cell() -> Result<()> {
        let mut f = fixture(2, 1, None)?;
        let a = f.put(10, 3, Cells::at(0, 0), AttachOptions::default())?;
        let b = f.put(30, 3, Cells::at(0, 1), AttachOptions::default())?;
        let c = f.put(20, 3, Cells::at(0, 2), AttachOptions::default())?;
        let d = f.put(5, 3, Cells::at(1, 0), AttachOptions::default())?;
        f.core.run_checkpoint();

        assert_eq!(f.core.preferred_width(f.table)?, SizeRequest::fixed(37));
        assert_eq!(f.core.preferred_height(f.table)?, SizeRequest::fixed(11));
        for id in [a, b, c] {
            assert_eq!(f.core.rect(id)?.w, 30);
        }
        assert_eq!(f.core.rect(c)?.tl.y, 8);
        assert_eq!(f.core.rect(d)?, Rect::new(32, 0, 5, 3));
        let layout = f.core.table_layout(f.table)?;
        assert_eq!((layout.columns(), layout.rows()), (2, 3));
        Ok(())
    }

    #[test]
    fn expanding_column_takes_surplus() -> Result<()> {
        let mut f = fixture(0, 0, Some(Expanse::new(100, 5)))?;
        let a = f.put(20, 5, Cells::at(0, 0), AttachOptions::default())?;
        let b = f.put(
            20,
            5,
            Cells::at(1, 0),
            AttachOptions::default().expand(true, false),
        )?;
        f.core.run_checkpoint();
        assert_eq!(f.core.rect(a)?, Rect::new(0, 0, 20, 5));
        assert_eq!(f.core.rect(b)?, Rect::new(20, 0, 80, 5));
        Ok(())
    }

    #[test]
    fn surplus_spread_when_nothing_expands() -> Result<()> {
        let mut f = fixture(0, 0, Some(Expanse::new(101, 5)))?;
        let a = f.put(20, 5, Cells::at(0, 0), AttachOptions::default())?;
        let b = f.put(20, 5, Cells::at(1, 0), AttachOptions::default())?;
        f.core.run_checkpoint();
        assert_eq!(f.core.rect(a)?, Rect::new(0, 0, 51, 5));
        assert_eq!(f.core.rect(b)?, Rect::new(51, 0, 50, 5));
        Ok(())
    }

    #[test]
    fn unfilled_child_is_aligned_in_span() -> Result<()> {
        let mut f = fixture(0, 0, Some(Expanse::new(100, 5)))?;
        let a = f.put(
            20,
            5,
            Cells::at(0, 0),
            AttachOptions::default().expand(true, false).fill(false, true),
        )?;
        f.core.set_halign(a, Align::End)?;
        f.core.run_checkpoint();
        assert_eq!(f.core.rect(a)?, Rect::new(80, 0, 20, 5));

        f.core.set_halign(a, Align::Center)?;
        f.core.run_checkpoint();
        assert_eq!(f.core.rect(a)?, Rect::new(40, 0, 20, 5));
        let layout = f.core.table_layout(f.table)?;
        assert_eq!(
            layout.placement(a).map(|p| p.slot()),
            Some(Rect::new(40, 0, 20, 5))
        );
        Ok(())
    }

    #[test]
    fn attach_margins_inset_the_span() -> Result<()> {
        let mut f = fixture(0, 0, None)?;
        let a = f.put(10, 4, Cells::at(0, 0), AttachOptions::default().margin(2, 1))?;
        f.core.run_checkpoint();
        assert_eq!(f.core.preferred_width(f.table)?, SizeRequest::fixed(14));
        assert_eq!(f.core.rect(a)?, Rect::new(2, 1, 10, 4));
        Ok(())
    }

    #[test]
    fn deficit_shrinks_the_wide_column() -> Result<()> {
        let mut f = fixture(0, 0, Some(Expanse::new(80, 5)))?;
        let a = f.core.add_leaf(FixedWidget::with_request(
            SizeRequest::new(10, 100),
            SizeRequest::fixed(5),
        ));
        let b = f.core.add_leaf(FixedWidget::with_request(
            SizeRequest::new(10, 20),
            SizeRequest::fixed(5),
        ));
        f.core.attach(f.table, a, Cells::at(0, 0), AttachOptions::default())?;
        f.core.attach(f.table, b, Cells::at(1, 0), AttachOptions::default())?;
        f.core.run_checkpoint();

        assert_eq!(f.core.preferred_width(f.table)?, SizeRequest::new(20, 120));
        assert_eq!(f.core.rect(a)?, Rect::new(0, 0, 60, 5));
        assert_eq!(f.core.rect(b)?, Rect::new(60, 0, 20, 5));
        Ok(())
    }

    #[test]
    fn rows_follow_resolved_column_widths() -> Result<()> {
        let mut f = fixture(0, 0, Some(Expanse::new(50, 0)))?;
        let text = WrapWidget::new(100, 10, 2);
        let probe = text.probe();
        let text = f.core.add_leaf(text);
        f.core.attach(f.table, text, Cells::at(0, 0), AttachOptions::default())?;
        let below = f.put(5, 3, Cells::at(0, 1), AttachOptions::default())?;
        f.core.run_checkpoint();

        assert_eq!(probe.last_applied(), Some(Rect::new(0, 0, 50, 4)));
        assert_eq!(f.core.rect(below)?, Rect::new(0, 4, 50, 3));
        assert_eq!(
            f.core.preferred_height_for_width(f.table, 25)?,
            SizeRequest::fixed(11)
        );
        Ok(())
    }

    #[test]
    fn hidden_children_are_excluded() -> Result<()> {
        let mut f = fixture(3, 0, None)?;
        let a = f.put(10, 2, Cells::at(0, 0), AttachOptions::default())?;
        let b = f.put(50, 2, Cells::new(0, 2, 0, 1), AttachOptions::default())?;
        f.core.set_visible(b, false)?;
        f.core.run_checkpoint();
        assert_eq!(f.core.preferred_width(f.table)?, SizeRequest::fixed(10));
        assert_eq!(f.core.rect(a)?, Rect::new(0, 0, 10, 2));
        Ok(())
    }

    #[test]
    fn moving_a_child_relayouts() -> Result<()> {
        let mut f = fixture(0, 0, None)?;
        let a = f.put(10, 2, Cells::at(0, 0), AttachOptions::default())?;
        let b = f.put(10, 2, Cells::at(1, 0), AttachOptions::default())?;
        f.core.run_checkpoint();
        assert_eq!(f.core.rect(b)?.tl.x, 10);

        f.core.set_attach(f.table, b, Cells::at(0, 1))?;
        f.core.run_checkpoint();
        assert_eq!(f.core.rect(a)?, Rect::new(0, 0, 10, 2));
        assert_eq!(f.core.rect(b)?, Rect::new(0, 2, 10, 2));
        Ok(())
    }

    #[test]
    fn attach_validates_before_queueing() -> Result<()> {
        let mut f = fixture(0, 0, None)?;
        f.core.run_checkpoint();
        let leaf = f.core.add_leaf(FixedWidget::new(1, 1));
        assert!(matches!(
            f.core.attach(f.table, leaf, Cells::new(0, 1, 2, 1), AttachOptions::default()),
            Err(Error::InvalidSpan { start: 2, end: 1 })
        ));
        let other = f.core.add_leaf(FixedWidget::new(1, 1));
        assert!(matches!(
            f.core.set_attach(f.table, other, Cells::at(0, 0)),
            Err(Error::NotAChild { .. })
        ));
        assert!(f.core.scheduler().is_empty());
        Ok(())
    }

    #[test]
    fn child_options_change_one_axis() -> Result<()> {
        let mut f = fixture(0, 0, Some(Expanse::new(100, 5)))?;
        let a = f.put(20, 5, Cells::at(0, 0), AttachOptions::default())?;
        let b = f.put(20, 5, Cells::at(1, 0), AttachOptions::default().margin(1, 0))?;
        f.core.run_checkpoint();
        assert_eq!(f.core.rect(a)?.w, 49);

        f.core
            .set_child_options(f.table, b, Orientation::Horizontal, true, false)?;
        assert!(!f.core.scheduler().is_empty());
        f.core.run_checkpoint();
        assert_eq!(f.core.rect(a)?, Rect::new(0, 0, 20, 5));
        assert_eq!(f.core.rect(b)?.w, 20);
        let layout = f.core.table_layout(f.table)?;
        assert_eq!(
            layout.placement(b).map(|p| p.options()),
            Some(
                AttachOptions::default()
                    .expand(true, false)
                    .fill(false, true)
                    .margin(1, 0)
            )
        );

        f.core
            .set_child_options(f.table, b, Orientation::Horizontal, true, false)?;
        assert!(f.core.scheduler().is_empty());

        let other = f.core.add_leaf(FixedWidget::new(1, 1));
        assert!(matches!(
            f.core
                .set_child_options(f.table, other, Orientation::Vertical, true, true),
            Err(Error::NotAChild { .. })
        ));
        Ok(())
    }

    #[test]
    fn out_of_range_spans_are_rejected() -> Result<()> {
        let mut f = fixture(0, 0, None)?;
        f.core.run_checkpoint();
        let leaf = f.core.add_leaf(FixedWidget::new(10, 10));
        assert!(matches!(
            f.core.attach(
                f.table,
                leaf,
                Cells::new(0, 20_000_000, 0, 1),
                AttachOptions::default()
            ),
            Err(Error::CellOutOfRange {
                end: 20_000_000,
                limit: Cells::LIMIT
            })
        ));
        assert!(matches!(
            f.core
                .attach(f.table, leaf, Cells::at(u32::MAX, 0), AttachOptions::default()),
            Err(Error::InvalidSpan { .. })
        ));
        assert!(f.core.scheduler().is_empty());

        f.core.attach(
            f.table,
            leaf,
            Cells::new(0, Cells::LIMIT, 0, 1),
            AttachOptions::default(),
        )?;
        f.core.run_checkpoint();
        assert_eq!(f.core.preferred_width(f.table)?, SizeRequest::fixed(10));
        assert!(matches!(
            f.core.set_attach(f.table, leaf, Cells::new(0, 1, 0, Cells::LIMIT + 1)),
            Err(Error::CellOutOfRange { .. })
        ));
        Ok(())
    }
}
