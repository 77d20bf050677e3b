use clap::Parser;
use std::path::PathBuf;

/// Command-line interface for the ifdef-pp preprocessor
#[derive(Parser)]
#[command(
    name = "ifdef-pp",
    about = "Strip //@ifdef blocks from source files",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Directives: //@ifdef NAME, //@ifndef NAME, //@endif"
)]
pub struct Cli {
    /// Files to preprocess; reads stdin when empty or `-`
    #[arg(help = "Files to preprocess (stdin when omitted)")]
    pub files: Vec<PathBuf>,

    /// Output file for a single input
    #[arg(short, long, conflicts_with = "out_dir", help = "Write output to this file instead of stdout")]
    pub output: Option<PathBuf>,

    /// Output directory for several inputs
    #[arg(long, help = "Write each processed file into this directory")]
    pub out_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    /// Define names (format: NAME or NAME=VALUE)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]", help = "Define a name (NAME or NAME=VALUE)")]
    pub define: Vec<String>,

    /// Undefine names
    #[arg(short = 'U', long = "undefine", value_name = "NAME", help = "Remove a name defined by the configuration")]
    pub undefine: Vec<String>,

    /// Validate directive nesting without writing output
    #[arg(long, help = "Check directive nesting only, write nothing")]
    pub check: bool,

    /// Print directive lines and exit
    #[arg(long, help = "List directive lines of each input and exit")]
    pub list_directives: bool,

    /// Show configuration and exit
    #[arg(long, help = "Show effective configuration and exit")]
    pub show_config: bool,

    /// Enable verbose output
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Cli {
    /// Parse `-D` arguments into name/value pairs; a bare name gets `None`
    pub fn get_defines(&self) -> Vec<(String, Option<String>)> {
        self.define
            .iter()
            .filter_map(|s| {
                let (name, value) = match s.split_once('=') {
                    Some((name, value)) => (name.trim(), Some(value.trim().to_string())),
                    None => (s.trim(), None),
                };
                if name.is_empty() {
                    None
                } else {
                    Some((name.to_string(), value))
                }
            })
            .collect()
    }

    /// Parse `-U` arguments, allowing comma-separated lists
    pub fn get_undefines(&self) -> Vec<String> {
        self.undefine
            .iter()
            .flat_map(|s| s.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Inputs to process; `-` stands for stdin
    pub fn get_inputs(&self) -> Vec<PathBuf> {
        if self.files.is_empty() {
            vec![PathBuf::from("-")]
        } else {
            self.files.clone()
        }
    }
}

// Provide a default implementation for testing
impl Default for Cli {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            output: None,
            out_dir: None,
            config: None,
            define: Vec::new(),
            undefine: Vec::new(),
            check: false,
            list_directives: false,
            show_config: false,
            verbose: false,
        }
    }
}
