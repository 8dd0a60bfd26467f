// fuxc: front end of the Fux compiler

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as ClapParser, ValueEnum};
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use tracing_subscriber::EnvFilter;

use fuxc::diagnostics::ReportFilter;
use fuxc::driver::{self, Compiled, Options};
use fuxc::parser::printer::print_ast;

/// Lex and parse Fux source files, printing diagnostics.
#[derive(Debug, ClapParser)]
#[command(name = "fuxc", version, about)]
struct Cli {
    /// Source files to compile
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print the token stream of every file
    #[arg(long)]
    tokens: bool,

    /// Print the syntax tree of every file
    #[arg(long)]
    ast: bool,

    /// When to colour diagnostics
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Do not print warnings
    #[arg(long)]
    no_warnings: bool,

    /// Do not print follow-up errors (e.g. unexpected end of file)
    #[arg(long)]
    no_aggressive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl Cli {
    fn options(&self) -> Options {
        let color = match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stderr().is_tty(),
        };
        Options {
            dump_tokens: self.tokens,
            dump_ast: self.ast,
            color,
            filter: ReportFilter {
                warnings: !self.no_warnings,
                aggressive: !self.no_aggressive,
            },
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FUXC_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let options = cli.options();
    let mut failed = false;
    let mut units = Vec::new();

    for result in driver::compile_files(&cli.files, &options) {
        match result {
            Ok(unit) => {
                dump(&unit, &options)?;
                failed |= unit.has_errors();
                units.push(unit);
            }
            Err(err) => {
                failed = true;
                let label = if options.color {
                    "error".red().bold().to_string()
                } else {
                    "error".to_string()
                };
                eprintln!("{}: {}", label, err);
            }
        }
    }

    let mut stderr = io::stderr().lock();
    let mut errors = 0;
    let mut warnings = 0;
    for mut diagnostic in driver::merge_diagnostics(units) {
        if diagnostic.is_warning() {
            warnings += 1;
        } else {
            errors += 1;
        }
        if options.filter.allows(&diagnostic) {
            diagnostic.report(&mut stderr, options.color)?;
        }
    }

    if errors + warnings > 0 {
        let summary = format!("{} error(s), {} warning(s)", errors, warnings);
        if !options.color {
            writeln!(stderr, "{}", summary)?;
        } else if errors > 0 {
            writeln!(stderr, "{}", summary.red().bold())?;
        } else {
            writeln!(stderr, "{}", summary.yellow().bold())?;
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Token and AST dumps go to stdout.
fn dump(unit: &Compiled, options: &Options) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    if let Some(tokens) = &unit.tokens {
        writeln!(stdout, "== tokens: {} ==", unit.file)?;
        for token in tokens {
            writeln!(stdout, "{}", token)?;
        }
    }
    if options.dump_ast {
        writeln!(stdout, "== ast: {} ==", unit.file)?;
        write!(stdout, "{}", print_ast(&unit.root))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "fuxc",
            "--tokens",
            "--color",
            "never",
            "--no-warnings",
            "a.fux",
            "b.fux",
        ]);
        let options = cli.options();

        assert_eq!(cli.files.len(), 2);
        assert!(options.dump_tokens);
        assert!(!options.dump_ast);
        assert!(!options.color);
        assert!(!options.filter.warnings);
        assert!(options.filter.aggressive);
    }

    #[test]
    fn test_files_required() {
        assert!(Cli::try_parse_from(["fuxc"]).is_err());
    }
}
