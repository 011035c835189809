mod config;

pub use config::*;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Target used by every event the collector emits.
pub const GC_TARGET: &str = "gc";

static START: Once = Once::new();

/// Installs the global subscriber at `INFO`, with collection phases at `DEBUG`. Only the
/// first call in a process has any effect.
pub fn init() {
	init_with(Level::INFO, Level::DEBUG);
}

/// Installs the global subscriber with `default` for everything and `gc` for the
/// collector's own target.
///
/// Later calls are ignored, so tests can call this freely.
pub fn init_with(default: Level, gc: Level) {
	START.call_once(|| {
		let layered = tracing_subscriber::registry()
			.with(tracing_subscriber::fmt::layer())
			.with(targets(default, gc));

		// Somebody else (a test harness, an embedding binary) may own the global default already.
		let _ = layered.try_init();
	});
}

fn targets(default: Level, gc: Level) -> filter::Targets {
	filter::Targets::new()
		.with_default(default)
		.with_target(GC_TARGET, gc)
}
