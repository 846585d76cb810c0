use std::path::{Path, PathBuf};
use std::sync::Once;

use color_eyre::eyre;

pub mod prelude {
    pub use crate::matchers::*;
    pub use crate::{Builder, LogLevel, write_kubeconfig};
    pub use googletest::{assert_that, matcher::MatcherBase, matchers::*};
    pub use similar_asserts::assert_eq as sim_assert_eq;
}

/// Returns the workspace root directory via the `CARGO_WORKSPACE_DIR` env var
/// set in `.cargo/config.toml`.
///
/// # Panics
///
/// Panics if `CARGO_WORKSPACE_DIR` is not set.
#[must_use]
pub fn workspace_root() -> PathBuf {
    PathBuf::from(
        std::env::var("CARGO_WORKSPACE_DIR")
            .expect("CARGO_WORKSPACE_DIR must be set in .cargo/config.toml"),
    )
}

/// Returns the path to the workspace `testdata/` directory.
#[must_use]
pub fn workspace_testdata() -> PathBuf {
    workspace_root().join("testdata")
}

/// Reads a file relative to the workspace `testdata/` directory.
///
/// # Panics
///
/// Panics if the file cannot be read.
#[must_use]
pub fn read_testdata(relative_path: &str) -> String {
    let path = workspace_testdata().join(relative_path);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// Reads and parses a JSON file relative to the workspace `testdata/` directory.
///
/// # Panics
///
/// Panics if the file cannot be read or is not valid JSON.
#[must_use]
pub fn read_testdata_json(relative_path: &str) -> serde_json::Value {
    let content = read_testdata(relative_path);
    serde_json::from_str(&content).unwrap_or_else(|e| panic!("parse {relative_path}: {e}"))
}

/// Write a kubeconfig with a single context pointing at `server` into `dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_kubeconfig(dir: &Path, server: &str) -> eyre::Result<PathBuf> {
    let path = dir.join("config");
    let content = format!(
        "apiVersion: v1
kind: Config
current-context: test
clusters:
- name: test-cluster
  cluster:
    server: {server}
contexts:
- name: test
  context:
    cluster: test-cluster
    user: test-user
users:
- name: test-user
  user:
    token: secret-token
"
    );
    std::fs::write(&path, content)?;
    Ok(path)
}

/// A fresh temporary directory that is removed when dropped.
///
/// # Panics
///
/// Panics if the directory cannot be created.
#[must_use]
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}

pub type LogLevel = tracing::metadata::Level;

static INIT_EYRE: Once = Once::new();
static INIT_TRACING: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builder {
    setup_tracing: bool,
    install_eyre: bool,
    env_filter: Option<String>,
    log_level: LogLevel,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            setup_tracing: true,
            install_eyre: true,
            env_filter: None,
            log_level: LogLevel::DEBUG,
        }
    }
}

impl Builder {
    /// Initialize test.
    ///
    /// This ensures `color_eyre` and the test log writer are set up once.
    ///
    /// # Panics
    ///
    /// Panics if `color_eyre` installation fails.
    pub fn build(self) {
        if self.install_eyre {
            INIT_EYRE.call_once(|| {
                color_eyre::install().expect("failed to install eyre");
            });
        }
        if self.setup_tracing {
            let filter = self
                .env_filter
                .unwrap_or_else(|| self.log_level.to_string().to_lowercase());
            INIT_TRACING.call_once(move || {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
                    .with_test_writer()
                    .without_time()
                    .try_init();
            });
        }
    }

    /// Toggle setting up tracing inside the test.
    #[must_use]
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.setup_tracing = enabled;
        self
    }

    /// Toggle log level for tracing inside the test.
    #[must_use]
    pub fn with_log_level(mut self, log_level: impl Into<LogLevel>) -> Self {
        self.log_level = log_level.into();
        self
    }

    /// Toggle installation of `color_eyre`.
    #[must_use]
    pub fn with_eyre(mut self, enabled: bool) -> Self {
        self.install_eyre = enabled;
        self
    }

    /// Configure the tracing subscribers env filter.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

/// Create a new builder.
#[must_use]
pub fn builder() -> Builder {
    Builder::default()
}

pub mod matchers {
    use googletest::matcher::Matcher;
    use googletest::matchers::predicate;

    /// Matches a list of strings, e.g. a path given as segments or child names.
    #[must_use]
    pub fn strings_eq(expected: &[&str]) -> impl for<'a> Matcher<&'a Vec<String>> {
        let expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
        predicate(move |actual: &Vec<String>| *actual == expected)
    }
}
