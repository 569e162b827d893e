//! fuzzfix CLI
//!
//! Rewrites the branch and loop conditions of one C source file into
//! temporaries evaluated right before the decision.

mod commands;
mod output;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{Shell, generate};
use fuzzfix_core::{LogFormat, init_tracing};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands::RewriteArgs;
use crate::output::Reporter;

#[derive(Parser)]
#[command(name = "fuzzfix")]
#[command(about = "fuzzfix: normalize C branch conditions into temporaries")]
#[command(version = fuzzfix_core::VERSION)]
#[command(
    long_about = "fuzzfix rewrites every non-trivial if, else-if, while and for condition of a C\n\
source file into an explicit temporary evaluated once, right before the decision.\n\
\n\
Examples:\n  \
fuzzfix main.c                      # Rewritten source on stdout\n  \
fuzzfix main.c -o main.fixed.c      # Write to a file\n  \
fuzzfix main.c --emit diff          # Show a unified diff\n  \
fuzzfix main.c -- -DDEBUG -Iinclude # Compiler arguments (-D/-U name macros)"
)]
struct Cli {
    /// C source file to rewrite
    #[arg(required_unless_present = "generate_completion")]
    input: Option<PathBuf>,

    /// Compiler arguments after `--`
    #[arg(last = true, help = "Compiler arguments; -D NAME and -U NAME feed the macro table")]
    compiler_args: Vec<String>,

    /// Output file
    #[arg(
        short,
        long,
        help = "Write the result to FILE (falls back to stdout if it cannot be written)"
    )]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(
        short,
        long,
        help = "Path to configuration file (.fuzzfixrc.json/.fuzzfixrc.toml)"
    )]
    config: Option<PathBuf>,

    /// Skip re-indenting the rewritten source
    #[arg(long)]
    no_format: bool,

    /// Prefix of generated temporaries
    #[arg(long, help = "Prefix of generated temporaries (default: __fuzzfix)")]
    prefix: Option<String>,

    /// Leave macro-spelled if conditions alone
    #[arg(long)]
    no_macro_conditions: bool,

    /// What to print
    #[arg(long, value_enum, default_value = "source")]
    emit: EmitFormat,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitFormat {
    /// Rewritten source
    Source,
    /// Unified diff against the input
    Diff,
    /// The change set as JSON
    Changes,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return ExitCode::SUCCESS;
    }

    let use_colors =
        !cli.no_color && std::env::var("NO_COLOR").is_err() && io::stderr().is_terminal();
    colored::control::set_override(use_colors);

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "fuzzfix=error", // Only errors by default
        1 => "fuzzfix=warn",  // Warnings on first -v
        2 => "fuzzfix=info",  // Info on -vv
        3 => "fuzzfix=debug", // Debug on -vvv
        _ => "fuzzfix=trace", // Trace on -vvvv+
    };
    let log_format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_tracing(log_level, log_format);

    let reporter = Reporter::new(use_colors);
    let Some(input) = cli.input else {
        reporter.print_error(&anyhow::anyhow!("no input file given"));
        return ExitCode::FAILURE;
    };

    let args = RewriteArgs {
        input,
        compiler_args: cli.compiler_args,
        output: cli.output,
        config: cli.config,
        no_format: cli.no_format,
        prefix: cli.prefix,
        no_macro_conditions: cli.no_macro_conditions,
        emit: cli.emit,
    };

    match commands::rewrite_command(args, &reporter) {
        Ok(summary) => {
            reporter.print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("fuzzfix failed: {:#}", e);
            reporter.print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
