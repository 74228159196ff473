//! Shared helpers for the vcf-batch test suites: config builders, a scripted
//! fake launcher, and a few runtime conveniences.

pub mod builders;
pub mod fake_launcher;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound on any single supervisor run in the test suites.
pub const RUN_LIMIT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a test-captured subscriber once per test binary.
///
/// Supervisor and launcher events from `vcf_batch` are shown at debug level
/// for failing tests; set `RUST_LOG` to override the filter.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,vcf_batch=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if it takes longer than [`RUN_LIMIT`].
///
/// A supervisor that never drains its active set shows up here as a timeout
/// instead of a hung test binary.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(RUN_LIMIT, f).await {
        Ok(value) => value,
        Err(_) => panic!("did not finish within {RUN_LIMIT:?}"),
    }
}
