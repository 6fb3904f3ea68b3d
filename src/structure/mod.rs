use crate::config::Config;
use crate::error::{ExtractError, Result};
use crate::model::{AggregateReport, ReportBuilder};
use crate::util;
use extract::{AssignTarget, BodyItem, ClassDef, StructureParser, SyntaxError};
use python::PythonParser;
use scan::{ScanOptions, ScannedFile};
use std::path::Path;
use tracing::{debug, info, warn};

pub mod extract;
pub mod python;
pub mod scan;

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Count `for` statements in class bodies (`for_loops` / `loops`).
    pub track_loops: bool,
    pub scan: ScanOptions,
    /// Carried into the report untouched.
    pub commit_message: Option<String>,
}

impl ExtractOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            track_loops: config.track_loops,
            scan: ScanOptions::new(config.respect_ignore, config.extensions.clone()),
            commit_message: None,
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            track_loops: true,
            scan: ScanOptions::default(),
            commit_message: None,
        }
    }
}

/// Result of scanning one file. A syntax error is not fatal: the file's
/// lines are already counted, its classes are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Scanned { lines: u64, classes: usize },
    SyntaxError { lines: u64, error: SyntaxError },
}

pub struct Extractor<P = PythonParser> {
    parser: P,
    options: ExtractOptions,
}

impl Extractor<PythonParser> {
    pub fn new(options: ExtractOptions) -> Result<Self> {
        Ok(Self::with_parser(PythonParser::new()?, options))
    }
}

impl<P: StructureParser> Extractor<P> {
    pub fn with_parser(parser: P, options: ExtractOptions) -> Self {
        Self { parser, options }
    }

    pub fn extract(&mut self, root: &Path) -> Result<AggregateReport> {
        if !root.is_dir() {
            return Err(ExtractError::NotADirectory(root.to_path_buf()));
        }
        let mut scan_options = self.options.scan.clone();
        if scan_options.extensions.is_empty() {
            scan_options.extensions = self
                .parser
                .extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect();
        }
        let files = scan::scan_tree(root, &scan_options)?;
        let mut builder = ReportBuilder::new(self.options.track_loops)
            .with_commit_message(self.options.commit_message.clone());
        let mut skipped = 0usize;
        for file in &files {
            match self.scan_file(file, &mut builder)? {
                FileOutcome::Scanned { lines, classes } => {
                    debug!(path = %file.rel_path, lines, classes, "scanned");
                }
                FileOutcome::SyntaxError { error, .. } => {
                    skipped += 1;
                    warn!(
                        path = %file.rel_path,
                        line = error.line,
                        column = error.column,
                        "{} parse error: {}; skipping",
                        self.parser.language(),
                        error.message
                    );
                }
            }
        }
        let report = builder.finish();
        info!(
            root = %root.display(),
            files = files.len(),
            skipped,
            classes = report.class_count,
            lines = report.lines_of_code,
            "extraction complete"
        );
        Ok(report)
    }

    pub fn scan_file(
        &mut self,
        file: &ScannedFile,
        builder: &mut ReportBuilder,
    ) -> Result<FileOutcome> {
        let source = util::read_source(&file.abs_path)?;
        Ok(self.scan_source(&source, builder))
    }

    pub fn scan_source(&mut self, source: &str, builder: &mut ReportBuilder) -> FileOutcome {
        let source = util::normalize_newlines(source);
        let lines = util::count_lines(&source);
        builder.add_lines(lines);
        match self.parser.parse(&source) {
            Ok(module) => {
                for class in &module.classes {
                    record_class(builder, class);
                }
                FileOutcome::Scanned {
                    lines,
                    classes: module.classes.len(),
                }
            }
            Err(error) => FileOutcome::SyntaxError { lines, error },
        }
    }
}

fn record_class(builder: &mut ReportBuilder, class: &ClassDef) {
    let slot = builder.record_class(&class.name, &class.simple_bases());
    for item in &class.body {
        match item {
            BodyItem::Method(name) => builder.record_method(slot, name),
            BodyItem::Assignment(targets) => {
                for target in targets {
                    match target {
                        AssignTarget::Name(name) => builder.record_attribute(slot, name),
                        AssignTarget::Other => {}
                    }
                }
            }
            BodyItem::Loop => builder.record_loop(slot),
            BodyItem::Other => {}
        }
    }
}

/// Runs the Python extractor over `root` with the given options.
pub fn extract_project(root: &Path, options: ExtractOptions) -> Result<AggregateReport> {
    Extractor::new(options)?.extract(root)
}
