//! Log output for the CLI
//!
//! The libraries log through the `log` facade; the subscriber's `tracing-log`
//! bridge forwards those records so one `EnvFilter` governs everything.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Workspace crates that get debug output under `-v`
const OWN_CRATES: [&str; 3] = ["sn_core", "sn_db", "sn_refresh"];

/// Filter directives for the given verbosity. Dependencies stay at warn.
fn directives(verbose: bool) -> String {
    if !verbose {
        return "warn".to_string();
    }
    let mut directives = vec!["warn".to_string()];
    directives.extend(OWN_CRATES.iter().map(|krate| format!("{krate}=debug")));
    directives.join(",")
}

/// Install the stderr subscriber. `RUST_LOG` overrides the verbosity flag.
pub(crate) fn init(verbose: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(verbose)));

    // A second install (tests, embedding) leaves the first one in place
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
