//! The rewrite command

use anyhow::{Context, Result};
use fuzzfix_core::cst::parse_c;
use fuzzfix_core::{
    ConfigLoader, Diagnostic, ErrorKind, FuzzfixError, LineEnding, ResultExt, formatter_for,
    generate_unified_diff,
};
use fuzzfix_rules::{RewriteEngine, RewriteOutcome};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::EmitFormat;
use crate::output::{Reporter, RunSummary};

/// Options of one `fuzzfix` invocation
#[derive(Debug, Clone)]
pub struct RewriteArgs {
    pub input: PathBuf,
    pub compiler_args: Vec<String>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub no_format: bool,
    pub prefix: Option<String>,
    pub no_macro_conditions: bool,
    pub emit: EmitFormat,
}

/// Rewrite one file and emit the result
///
/// Nothing is written before the whole unit has been rewritten and
/// formatted, so a failure never leaves a partial output file behind.
pub fn rewrite_command(args: RewriteArgs, reporter: &Reporter) -> Result<RunSummary> {
    let source = fs::read_to_string(&args.input)
        .map_err(|e| FuzzfixError::io_error(&args.input, e))?;
    debug!("Read {} bytes from {}", source.len(), args.input.display());

    let start_dir = config_start_dir(&args.input);
    let (config, config_path) = ConfigLoader::load(args.config.as_deref(), &start_dir)?;
    if let Some(path) = &config_path {
        info!("Using config {}", path.display());
    }

    let mut rewrite_config = config.rewrite_config();
    if let Some(prefix) = &args.prefix {
        rewrite_config.temp_prefix = Some(prefix.clone());
    }
    if args.no_macro_conditions {
        rewrite_config.macro_conditions = Some(false);
    }
    let settings = rewrite_config.resolve()?;

    let mut formatter_config = config.formatter_config();
    if args.no_format {
        formatter_config.enabled = Some(false);
    }
    let formatter = formatter_for(&formatter_config)?;

    let engine = RewriteEngine::new(settings)
        .with_macros(config.macro_names())
        .with_compiler_args(args.compiler_args.iter().cloned());

    let outcome = match engine.rewrite(&source, &args.input) {
        Ok(outcome) => outcome,
        Err(err) => {
            if err.kind() == ErrorKind::ParseFailure {
                report_parse_errors(reporter, &args.input, &source);
            }
            return Err(err).with_context(|| format!("Failed to rewrite {}", args.input.display()));
        }
    };
    reporter.print_diagnostics(&outcome.diagnostics);

    // A formatter failure keeps the unformatted rewrite
    let text = formatter
        .format_string(&outcome.text)
        .log_and_continue()
        .unwrap_or_else(|| outcome.text.clone());
    let text = LineEnding::detect(&source).apply(&text);
    let rendered = render(&outcome, &text, args.emit)?;
    let written_to = emit(&rendered, args.output.as_deref(), reporter)?;

    Ok(RunSummary {
        changes_applied: outcome.change_count(),
        warnings: outcome.diagnostics.len(),
        written_to,
    })
}

/// Directory the config search starts from: the input's directory
fn config_start_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn report_parse_errors(reporter: &Reporter, file: &Path, source: &str) {
    let parse = parse_c(source);
    let diagnostics = Diagnostic::from_parse_errors(file, source, parse.errors());
    reporter.print_diagnostics(&diagnostics);
}

fn render(outcome: &RewriteOutcome, text: &str, format: EmitFormat) -> Result<String> {
    let rendered = match format {
        EmitFormat::Source => text.to_string(),
        EmitFormat::Diff => generate_unified_diff(&outcome.original, text, &outcome.file),
        EmitFormat::Changes => {
            let report = serde_json::json!({
                "file": outcome.file.display().to_string(),
                "changes": outcome.changes,
                "diagnostics": outcome.diagnostics,
            });
            let mut json = serde_json::to_string_pretty(&report)?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}

/// Write to the output file, falling back to stdout when it cannot be written
fn emit(rendered: &str, output: Option<&Path>, reporter: &Reporter) -> Result<Option<PathBuf>> {
    if let Some(path) = output {
        match fs::write(path, rendered) {
            Ok(()) => {
                info!("Wrote {} bytes to {}", rendered.len(), path.display());
                return Ok(Some(path.to_path_buf()));
            }
            Err(err) => reporter.print_fallback(path, &err),
        }
    }

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .context("Failed to write to stdout")?;
    stdout.flush().context("Failed to write to stdout")?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_start_dir() {
        assert_eq!(config_start_dir(Path::new("main.c")), PathBuf::from("."));
        assert_eq!(
            config_start_dir(Path::new("src/main.c")),
            PathBuf::from("src")
        );
    }
}
