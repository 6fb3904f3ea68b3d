use anyhow::{Context, Result};
use clap::Parser;
use classmap::config::{self, Config};
use classmap::model::AggregateReport;
use classmap::structure::{self, ExtractOptions};
use classmap::{cli, output, transform};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("CLASSMAP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn extract_options(args: &cli::ExtractArgs) -> ExtractOptions {
    let mut options = ExtractOptions::from_config(Config::get());
    if args.no_loops {
        options.track_loops = false;
    }
    if args.respect_ignore {
        options.scan.respect_ignore = true;
    }
    if let Some(raw) = &args.extensions {
        let extensions = config::parse_extensions(raw);
        if !extensions.is_empty() {
            options.scan.extensions = extensions;
        }
    }
    options.commit_message = args.commit_message.clone();
    options
}

fn extract(repo: &Path, args: &cli::ExtractArgs) -> Result<AggregateReport> {
    structure::extract_project(repo, extract_options(args))
        .with_context(|| format!("extract {}", repo.display()))
}

fn load_report(path: &Path) -> Result<AggregateReport> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse report {}", path.display()))
}

fn main() -> Result<()> {
    let args = cli::Args::parse();
    init_logging(args.verbose);

    match args.command {
        cli::Command::Extract {
            repo,
            options,
            format,
        } => {
            let report = extract(&repo, &options)?;
            println!("{}", output::render(&report, format)?);
            Ok(())
        }
        cli::Command::Tree {
            repo,
            input,
            options,
            title,
            commit_number,
            format,
        } => {
            let mut report = match input {
                Some(path) => load_report(&path)?,
                None => extract(&repo, &options)?,
            };
            if options.commit_message.is_some() {
                report.commit_message = options.commit_message.clone();
            }
            let tree = transform::to_tree(&report)
                .with_title(title)
                .with_commit_number(commit_number);
            println!("{}", output::render(&tree, format)?);
            Ok(())
        }
        cli::Command::Diff { old, new, format } => {
            let delta = load_report(&new)?.delta(&load_report(&old)?);
            println!("{}", output::render(&delta, format)?);
            Ok(())
        }
        cli::Command::Languages => {
            for spec in structure::scan::language_specs() {
                println!("{}\t{}", spec.name, spec.extensions.join(","));
            }
            Ok(())
        }
    }
}
