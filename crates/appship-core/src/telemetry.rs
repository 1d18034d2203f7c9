//! Log output for the `appship` binary.
//!
//! Lines go to stderr; stdout carries command results.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events pass the default filter at the requested level.
const APPSHIP_TARGETS: [&str; 5] = [
    "appship",
    "appship_core",
    "appship_provider",
    "appship_state",
    "appship_ingest",
];

/// Default directives: dependencies stay at `warn`, AppShip crates log at
/// `level`.
fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    APPSHIP_TARGETS
        .iter()
        .fold(String::from("warn"), |acc, target| format!("{acc},{target}={level}"))
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
///
/// Returns false when a subscriber was already installed.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let plain = (!json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));
    let structured = json.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .try_init()
        .is_ok()
}
