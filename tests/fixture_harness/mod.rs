use eyre::{Context, Result};
use ifdef_pp::{Definitions, Preprocessor};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a fixture expects from preprocessing its input
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Byte-for-byte output
    Output(String),
    /// Name of the error variant, as reported by `Error::kind`
    Error(String),
}

/// One directory under `tests/fixtures`
#[derive(Debug, Clone)]
pub struct FixtureCase {
    pub name: String,
    pub input: String,
    pub defines: Definitions,
    pub expectation: Expectation,
}

impl FixtureCase {
    /// Load a fixture directory holding `input.*`, `defines.yaml` and
    /// either `expected.*` or `error.txt`
    pub fn load(dir: &Path) -> Result<Self> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| eyre::eyre!("Fixture has no name: {}", dir.display()))?;

        let input_path = find_prefixed(dir, "input.")?
            .ok_or_else(|| eyre::eyre!("Fixture '{}' has no input file", name))?;
        let input = read(&input_path)?;

        let defines_path = dir.join("defines.yaml");
        let defines = if defines_path.exists() {
            serde_yaml::from_str(&read(&defines_path)?)
                .with_context(|| format!("Failed to parse {}", defines_path.display()))?
        } else {
            Definitions::new()
        };

        let error_path = dir.join("error.txt");
        let expectation = if error_path.exists() {
            Expectation::Error(read(&error_path)?.trim().to_string())
        } else {
            let expected_path = find_prefixed(dir, "expected.")?
                .ok_or_else(|| eyre::eyre!("Fixture '{}' has no expected output", name))?;
            Expectation::Output(read(&expected_path)?)
        };

        Ok(Self {
            name,
            input,
            defines,
            expectation,
        })
    }

    /// Run the fixture; `Err` carries a description of the mismatch
    pub fn check(&self, preprocessor: &Preprocessor) -> std::result::Result<(), String> {
        let actual = preprocessor.process(&self.input, &self.defines);

        match (&self.expectation, actual) {
            (Expectation::Output(expected), Ok(output)) if *expected == output => Ok(()),
            (Expectation::Error(kind), Err(e)) if e.kind() == kind.as_str() => Ok(()),
            (expectation, actual) => Err(format!(
                "{}: expected {:?}, got {:?}",
                self.name, expectation, actual
            )),
        }
    }
}

/// Load every fixture directory below `root`, sorted by name
pub fn load_fixtures(root: &Path) -> Result<Vec<FixtureCase>> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect();
    dirs.sort();

    dirs.iter().map(|dir| FixtureCase::load(dir)).collect()
}

fn find_prefixed(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().starts_with(prefix) {
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
