use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

pub const LOG_ENV: &str = "KIRA_CKDRISK_LOG";

/// Installs the stderr subscriber for the CLI.
///
/// Filter comes from `KIRA_CKDRISK_LOG` (e.g. `kira_ckdrisk=debug`); falls back
/// to `kira_ckdrisk=info`. Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("kira_ckdrisk=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .try_init();
    });
}
