//! Error types and diagnostic rendering for fbsql

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for fbsql operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fbsql
///
/// Recoverable parse diagnostics never use this channel; they are collected
/// as [`Problem`]s on the analysis result instead.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    #[diagnostic(code(fbsql::io_error))]
    IoError(#[from] std::io::Error),

    #[error("{message}")]
    #[diagnostic(code(fbsql::document_error))]
    DocumentError { message: String },
}

/// Diagnostic severity, numbered to match editor-protocol conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "info",
            Severity::Hint => "hint",
        };
        write!(f, "{}", name)
    }
}

/// A positioned diagnostic produced while lexing or parsing.
///
/// Spans are half-open byte offsets into the analyzed source. The problem
/// list is append-only and ordered by emission time, not by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub start: u32,
    pub end: u32,
    pub message: String,
    pub severity: Severity,
}

impl Problem {
    pub fn error(start: u32, end: u32, message: impl Into<String>) -> Self {
        Problem {
            start,
            end,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(start: u32, end: u32, message: impl Into<String>) -> Self {
        Problem {
            start,
            end,
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

/// Calculate line and column number from byte offset (1-indexed)
pub fn offset_to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in input.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Get the line content at a given line number (1-indexed)
pub fn get_line_content(input: &str, line_num: usize) -> Option<&str> {
    input.lines().nth(line_num.saturating_sub(1))
}

const RESET: &str = "\x1b[0m";
const FG_RED: &str = "\x1b[31m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";

fn severity_text(severity: Severity) -> String {
    match severity {
        Severity::Error => format!("{}error{}", FG_RED, RESET),
        Severity::Warning => format!("{}warning{}", FG_YELLOW, RESET),
        Severity::Information => format!("{}info{}", FG_BLUE, RESET),
        Severity::Hint => "hint".to_string(),
    }
}

/// Render a problem as `<file>:<line>:<col> - <severity>: <message>` followed
/// by the offending source line with the span underlined.
pub fn render_problem(file: &str, source: &str, problem: &Problem) -> String {
    let (line, col) = offset_to_line_col(source, problem.start as usize);
    let content = get_line_content(source, line).unwrap_or("");

    let span_len = problem.end.saturating_sub(problem.start) as usize;
    let avail = content.chars().count().saturating_sub(col - 1);
    let underline = "^".repeat(span_len.clamp(1, avail.max(1)));
    let pad = " ".repeat(col - 1);

    format!(
        "{}{}:{}:{}{} - {}: {}\n{:>4} | {}\n     | {}{}",
        FG_GREEN,
        file,
        line,
        col,
        RESET,
        severity_text(problem.severity),
        problem.message,
        line,
        content,
        pad,
        underline
    )
}
