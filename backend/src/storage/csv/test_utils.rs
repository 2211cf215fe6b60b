/// Test utilities module for automatic cleanup and consistent test infrastructure
///
/// Every test gets its own temporary directory which is removed on drop,
/// even if the test panics.
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// RAII test environment backed by a temporary directory
pub struct TestEnvironment {
    /// The temporary directory - kept alive to prevent auto-cleanup until drop
    _temp_dir: TempDir,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        init_logging();
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }

    /// Path of a file inside the environment (not created)
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.base_path.join(file_name)
    }

    /// Write a file inside the environment and return its path
    pub fn write_file(&self, file_name: &str, contents: &str) -> PathBuf {
        let path = self.path(file_name);
        fs::write(&path, contents).expect("failed to write test file");
        path
    }

    pub fn read_file(&self, file_name: &str) -> String {
        fs::read_to_string(self.path(file_name)).expect("failed to read test file")
    }
}

/// Route `log` output through the test harness; `RUST_LOG=debug` to see it
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        // TempDir cleans up on drop
        if std::env::var("ZENITH_DEBUG_TESTS").is_ok() {
            println!("🧹 Cleaning up test environment: {:?}", self.base_path);
        }
    }
}
