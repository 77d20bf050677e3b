use clap::Parser;
use eyre::{Context, Result};
use ifdef_pp::Definitions;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod runner;

use cli::Cli;
use config::Config;
use runner::{Runner, is_stdin, read_input};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load configuration
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Apply CLI overrides to configuration
    config.apply_overrides(&cli.get_defines(), &cli.get_undefines());

    // Handle special commands
    if cli.show_config {
        return show_config(&config);
    }

    if cli.verbose {
        for line in describe_definitions(&config.defines) {
            eprintln!("{}", line);
        }
    }

    let inputs = cli.get_inputs();
    let runner = Runner::new(config.defines);

    if cli.list_directives {
        return list_directives(&runner, &inputs);
    }

    let destinations = plan_destinations(&cli, &inputs)?;
    let outcomes = runner.process_paths(&inputs).context("Preprocessing failed")?;

    for (outcome, destination) in outcomes.iter().zip(&destinations) {
        match &outcome.result {
            Ok(output) => {
                if !cli.check {
                    write_output(destination.as_deref(), output)?;
                }
            }
            Err(e) => eprintln!("{}", format_failure(&outcome.input, e)),
        }
    }

    let failures = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();

    if cli.check {
        eprintln!("{}", check_summary(outcomes.len(), failures));
    } else if cli.verbose {
        eprintln!("Processed {} inputs", outcomes.len());
        if failures > 0 {
            eprintln!("{} inputs failed", failures);
        }
    }

    // Exit with error code if any input failed
    if failures > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Decide where each input's output goes; `None` means stdout
fn plan_destinations(cli: &Cli, inputs: &[PathBuf]) -> Result<Vec<Option<PathBuf>>> {
    if cli.check {
        return Ok(vec![None; inputs.len()]);
    }

    if let Some(out_dir) = &cli.out_dir {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

        // Destination -> first input planned to write it
        let mut planned: HashMap<PathBuf, &PathBuf> = HashMap::new();
        let mut destinations = Vec::with_capacity(inputs.len());

        for input in inputs {
            if is_stdin(input) {
                return Err(eyre::eyre!("Cannot use --out-dir with stdin input"));
            }
            let name = input
                .file_name()
                .ok_or_else(|| eyre::eyre!("Input has no file name: {}", input.display()))?;
            let destination = out_dir.join(name);

            if let Some(first) = planned.get(&destination) {
                return Err(eyre::eyre!(
                    "Inputs {} and {} both write to {}",
                    first.display(),
                    input.display(),
                    destination.display()
                ));
            }
            planned.insert(destination.clone(), input);
            destinations.push(Some(destination));
        }

        return Ok(destinations);
    }

    if inputs.len() > 1 {
        return Err(eyre::eyre!("--out-dir is required when processing several inputs"));
    }

    Ok(vec![cli.output.clone()])
}

fn write_output(destination: Option<&Path>, output: &str) -> Result<()> {
    match destination {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes()).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}

/// Print every directive line of each input
fn list_directives(runner: &Runner, inputs: &[PathBuf]) -> Result<()> {
    for input in inputs {
        let content = read_input(input)?;
        for located in runner.preprocessor().directives(&content) {
            println!("{}:{}: {}", display_input(input), located.line, located.directive);
        }
    }

    Ok(())
}

/// Show the effective configuration
fn show_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;

    println!("Effective configuration:");
    println!("{}", yaml);

    Ok(())
}

/// One `NAME = value` line per definition, sorted by name
fn describe_definitions(defines: &Definitions) -> Vec<String> {
    let mut lines: Vec<String> = defines
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect();
    lines.sort();
    lines
}

fn check_summary(total: usize, failures: usize) -> String {
    format!("Checked {} inputs, {} failed", total, failures)
}

/// Compiler-style `file:line: message` report for a failed input
fn format_failure(input: &Path, error: &ifdef_pp::Error) -> String {
    format!("{}:{}: {}", display_input(input), error.line(), error)
}

fn display_input(input: &Path) -> String {
    if is_stdin(input) {
        "<stdin>".to_string()
    } else {
        input.display().to_string()
    }
}
