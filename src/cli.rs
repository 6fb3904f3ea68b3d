use crate::output::OutputFormat;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "classmap",
    version,
    about = "Class structure metrics for Python source trees",
    after_help = r#"Examples:
  classmap extract --repo ./psf-requests-e2af50b
  classmap extract --repo . --no-loops --format yaml
  classmap tree --repo . --title "requests by psf" --commit-number 42
  classmap tree --input output.json
  classmap diff before.json after.json
"#
)]
pub struct Args {
    /// Log debug diagnostics to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExtractArgs {
    /// Skip `for_loops` and per-class `loops`.
    #[arg(long)]
    pub no_loops: bool,
    /// Honor .gitignore and .ignore files.
    #[arg(long)]
    pub respect_ignore: bool,
    /// Source extensions to scan, comma separated.
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Option<String>,
    /// Commit message to carry in the output.
    #[arg(long)]
    pub commit_message: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract class metrics from a directory and print the report.
    Extract {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        #[command(flatten)]
        options: ExtractArgs,
        /// Output format: json|yaml.
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },
    /// Print the visualization tree for a directory or a saved report.
    Tree {
        #[arg(long, default_value = ".", conflicts_with = "input")]
        repo: PathBuf,
        /// Saved JSON report to reshape instead of scanning.
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,
        #[command(flatten)]
        options: ExtractArgs,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        commit_number: Option<String>,
        /// Output format: json|yaml.
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },
    /// Print the growth between two saved reports.
    Diff {
        /// Report of the earlier commit.
        old: PathBuf,
        /// Report of the later commit.
        new: PathBuf,
        /// Output format: json|yaml.
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },
    /// List supported languages and their extensions.
    Languages,
}
