//! Common test utilities

use dockit::Harness;

/// Test context that manages a fresh in-memory store behind the harness
pub struct TestContext {
    pub harness: Harness,
}

impl TestContext {
    /// Create a new test context with a fresh in-memory store
    pub fn new() -> Self {
        init_tracing();
        let harness = Harness::in_memory().expect("Failed to set up test store");
        TestContext { harness }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the log subscriber once; honors RUST_LOG
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
