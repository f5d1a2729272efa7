//! fbsql CLI - Firebird SQL diagnostics for editor tooling

use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fbsql::cli::{discover_sql_files, Cli, Commands};
use fbsql::error::render_problem;
use fbsql::Severity;

fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check { files } => run_check(&files),
        Commands::Tokens { file } => run_tokens(&file),
    }
}

/// Check files: exit 0 when clean, 1 when diagnostics were reported, 2 on
/// unreadable input.
fn run_check(files: &[PathBuf]) -> ExitCode {
    let mut had_problems = false;
    let mut had_errors = false;

    for file in files {
        if file == Path::new("-") {
            let mut source = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut source) {
                eprintln!("Error reading stdin: {}", e);
                had_errors = true;
                continue;
            }
            had_problems |= check_source("<stdin>", &source);
            continue;
        }

        for entry in discover_sql_files(std::slice::from_ref(file)) {
            match std::fs::read_to_string(&entry) {
                Ok(source) => {
                    had_problems |= check_source(&entry.display().to_string(), &source);
                }
                Err(e) => {
                    eprintln!("{}: {}", entry.display(), e);
                    had_errors = true;
                }
            }
        }
    }

    if had_errors {
        ExitCode::from(2)
    } else if had_problems {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn check_source(name: &str, source: &str) -> bool {
    let analysis = fbsql::analyze(source);
    for problem in &analysis.problems {
        println!("{}\n", render_problem(name, source, problem));
    }
    let errors = analysis
        .problems
        .iter()
        .filter(|p| p.severity == Severity::Error)
        .count();
    let warnings = analysis.problems.len() - errors;
    if !analysis.problems.is_empty() {
        println!(
            "{}: {} error(s), {} other diagnostic(s)",
            name, errors, warnings
        );
    }
    !analysis.problems.is_empty()
}

/// Dump the token stream of one file.
fn run_tokens(file: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}: {}", file.display(), e);
            return ExitCode::from(2);
        }
    };

    let stream = fbsql::parser::lexer::lex(&source);
    for token in &stream.tokens {
        let mut flags = String::new();
        if token.is_reserved {
            flags.push_str(" reserved");
        } else if token.is_keyword {
            flags.push_str(" keyword");
        }
        println!(
            "{:>5}..{:<5} {:?}{} {:?}",
            token.start, token.end, token.kind, flags, token.text
        );
    }
    println!(
        "{} tokens, {} comments, {} whitespace runs",
        stream.tokens.len(),
        stream.comments.len(),
        stream.whitespace.len()
    );
    ExitCode::SUCCESS
}
