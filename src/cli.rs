//! Command-line interface implementation for scaffold.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for scaffold.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "scaffold: pick a template, and scaffold a piece of code",
    long_about = None
)]
pub struct Args {
    /// Name of the template to render
    #[arg(value_name = "TEMPLATE", required_unless_present = "list")]
    pub template: Option<String>,

    /// Registry directory containing one folder per template.
    /// Defaults to $SCAFFOLD_REGISTRY_PATH or ~/.scaffold/upstream/registry
    #[arg(long, value_name = "DIR")]
    pub registry: Option<PathBuf>,

    /// Where to put the output files, defaults to the template's default path
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Template input as KEY=VALUE, may be repeated
    #[arg(
        short,
        long = "input",
        value_name = "KEY=VALUE",
        value_parser = parse_input
    )]
    pub inputs: Vec<(String, String)>,

    /// List the templates available in the registry and exit
    #[arg(short, long)]
    pub list: bool,

    /// Print where every file would be written and exit without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Overwrite existing files without asking for confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses a `KEY=VALUE` pair. Only the first `=` separates key and value.
pub fn parse_input(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid input '{raw}', expected KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid input '{raw}', the key is empty"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
