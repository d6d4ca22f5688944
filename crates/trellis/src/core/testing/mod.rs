//! Instrumented widgets and run loops for exercising the engine without a
//! native backend.

/// A run loop that records checkpoint requests.
pub mod runloop;
/// Leaf widgets with scripted sizes.
pub mod widgets;

pub use runloop::ManualLoop;
use tracing::Level;
pub use widgets::{FailingWidget, FixedWidget, Probe, WrapWidget};

/// Install a `tracing` subscriber that writes through the test harness.
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::TRACE)
        .try_init()
        .ok();
}
