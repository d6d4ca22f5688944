//! Lay out a small settings form and print the resulting geometry.

use std::io;

use clap::Parser;
use tracing::Level;
use trellis::{
    Core, NodeId,
    dump::{dump, dump_json},
    error::Result,
    geom::{Edges, Expanse, Orientation},
    layout::{Align, AttachOptions, Cells, PackMode},
    testing::{FixedWidget, ManualLoop, WrapWidget},
};

/// Field labels, each paired with a wrapping input.
const FIELDS: [(&str, u32); 4] = [("Name", 24), ("Email", 32), ("Address", 70), ("Notes", 120)];

/// CLI flags for the form demo.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Window width (columns). Defaults to the natural width.
    #[clap(long, value_name = "COLUMNS")]
    width: Option<u32>,

    /// Window height (rows). Defaults to the natural height.
    #[clap(long, value_name = "ROWS")]
    height: Option<u32>,

    /// Emit a JSON snapshot instead of the tree dump.
    #[clap(long)]
    json: bool,

    /// Log layout decisions to stderr.
    #[clap(short, long)]
    verbose: bool,
}

/// Add a named fixed-size leaf.
fn label(core: &mut Core, name: &str, w: u32) -> Result<NodeId> {
    let id = core.add_leaf(FixedWidget::new(w, 1));
    core.set_name(id, name)?;
    Ok(id)
}

/// Build the form: a table of labelled fields above a row of buttons.
fn build(core: &mut Core) -> Result<NodeId> {
    let window = core.add_window();
    let column = core.add_box(Orientation::Vertical, 1);
    core.set_content(window, column)?;
    core.set_margin(column, Edges::symmetric(2, 1))?;

    let table = core.add_table(2, 0);
    core.pack_start(column, table, PackMode::FillExpand, 0)?;
    for (row, (name, len)) in (0u32..).zip(FIELDS) {
        let l = label(core, name, u32::try_from(name.len()).unwrap_or(0))?;
        core.set_halign(l, Align::End)?;
        core.attach(
            table,
            l,
            Cells::at(0, row),
            AttachOptions::default().fill(false, true),
        )?;
        let field = core.add_leaf(WrapWidget::new(len, 8, 1));
        core.set_name(field, format!("{} field", name.to_lowercase()))?;
        core.attach(
            table,
            field,
            Cells::at(1, row),
            AttachOptions::default().expand(true, false),
        )?;
    }

    let buttons = core.add_box(Orientation::Horizontal, 1);
    core.pack_start(column, buttons, PackMode::Fill, 0)?;
    let ok = label(core, "ok", 6)?;
    let cancel = label(core, "cancel", 10)?;
    let help = label(core, "help", 8)?;
    core.pack_start(buttons, help, PackMode::Natural, 0)?;
    core.pack_end(buttons, ok, PackMode::Natural, 0)?;
    core.pack_end(buttons, cancel, PackMode::Natural, 0)?;
    Ok(window)
}

pub fn main() -> Result<()> {
    let args = Args::parse();
    if args.verbose {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_max_level(Level::TRACE)
            .init();
    }

    let mut core = Core::new(ManualLoop::new());
    let window = build(&mut core)?;
    core.run_checkpoint();

    if args.width.is_some() || args.height.is_some() {
        let natural = core.window_state(window)?.size();
        let size = Expanse::new(
            args.width.unwrap_or(natural.w),
            args.height.unwrap_or(natural.h),
        );
        core.resize_window(window, size)?;
        core.run_checkpoint();
    }

    if args.json {
        println!("{}", dump_json(&core, window)?);
    } else {
        print!("{}", dump(&core, window)?);
    }
    Ok(())
}
