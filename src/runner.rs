use eyre::{Context, Result};
use ifdef_pp::{Definitions, Preprocessor};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of preprocessing one input
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub input: PathBuf,
    pub result: ifdef_pp::Result<String>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Reads inputs and runs them through a shared preprocessor
pub struct Runner {
    preprocessor: Preprocessor,
    defines: Definitions,
}

impl Runner {
    /// Create a new runner with the given definitions
    pub fn new(defines: Definitions) -> Self {
        Self {
            preprocessor: Preprocessor::new(),
            defines,
        }
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Preprocess a single file, or stdin for `-`
    pub fn process_path<P: AsRef<Path>>(&self, path: P) -> Result<Outcome> {
        let path = path.as_ref();
        let content = read_input(path)?;

        debug!(input = %path.display(), bytes = content.len(), "preprocessing");
        let result = self.preprocessor.process(&content, &self.defines);

        Ok(Outcome {
            input: path.to_path_buf(),
            result,
        })
    }

    /// Preprocess several files in parallel, keeping input order
    pub fn process_paths(&self, paths: &[PathBuf]) -> Result<Vec<Outcome>> {
        paths.par_iter().map(|path| self.process_path(path)).collect()
    }
}

/// Read a file, or stdin when the path is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if is_stdin(path) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        return Ok(content);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}
