//! CLI argument parsing and file discovery

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// fbsql - Firebird SQL diagnostics for editor tooling
#[derive(Parser, Debug)]
#[command(name = "fbsql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lex and parse SQL files, printing diagnostics
    Check {
        /// Files or directories to check (use - for stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Dump the token stream of a single SQL file
    Tokens {
        /// File to tokenize
        file: PathBuf,
    },
}

/// Discover SQL files from the given paths (files, directories, or globs)
pub fn discover_sql_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        discover_one(path, &mut files);
    }
    files
}

fn discover_one(path: &Path, files: &mut Vec<PathBuf>) {
    if path.is_file() {
        files.push(path.to_path_buf());
        return;
    }

    if path.is_dir() {
        for entry in walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "sql") {
                files.push(path.to_path_buf());
            }
        }
        return;
    }

    // Handle glob patterns
    if let Ok(paths) = glob::glob(path.to_str().unwrap_or("")) {
        for p in paths.filter_map(|p| p.ok()) {
            if p.is_file() && p.extension().is_some_and(|ext| ext == "sql") {
                files.push(p);
            }
        }
    }
}
