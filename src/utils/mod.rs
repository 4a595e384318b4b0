pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

/// Directive applied when neither `RUST_LOG` nor a configured filter is set.
pub const DEFAULT_LOG_FILTER: &str = "budget_sync=info,bsync_core=info";

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber once and logs the build metadata.
///
/// `RUST_LOG` wins over `filter`, which wins over [`DEFAULT_LOG_FILTER`]. An
/// unparsable `filter` falls back to the default.
pub fn init_tracing(filter: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            filter
                .and_then(|directives| EnvFilter::try_new(directives).ok())
                .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
        });

        // Another subscriber may already be installed by the host application.
        let _ = fmt().with_env_filter(env_filter).try_init();
        tracing::info!("{}", build_info::current());
    });
}
