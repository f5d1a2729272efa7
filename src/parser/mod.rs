//! Incremental SQL parser driven by a stack of resumable parse states
//!
//! The engine steps the top-of-stack state once per loop iteration. A step
//! either mutates the cursor, pushes a child state (the only suspension
//! point), or finishes by producing a node that is handed to the state
//! below it on the stack. Completed top-level statements re-seed statement
//! dispatch while tokens remain, so multi-statement documents parse in one
//! run.

pub(crate) mod expr;
pub mod firebird;
pub mod lexer;
pub(crate) mod stmt;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::ast::{Span, Statement};
use crate::error::Problem;
use expr::{ColumnState, ExprState, FunctionState, ParenState, QualifiedStarState};
use lexer::{Token, TokenStream};
use stmt::{
    statement, DerivedState, EmptyState, FirstSkipState, FromState, GroupByState, HavingState,
    JoinColumnsState, JoinState, SelectState, TableState, UnknownState, WhereState,
};

/// Steps tolerated without cursor movement before the engine declares an
/// infinite loop and aborts the parse.
const MAX_STALLED_STEPS: usize = 100;

/// The result of one parse run: completed statements plus every diagnostic
/// collected while lexing and parsing, in emission order.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub statements: Vec<Statement>,
    pub problems: Vec<Problem>,
}

/// Cooperative cancellation flag, polled once per engine-loop iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Parse a lexed token stream into statements and diagnostics. Infallible
/// from the caller's perspective: structural errors become diagnostics and
/// halt the run, keeping whatever already parsed.
pub fn parse(stream: TokenStream) -> Analysis {
    Parser::new(stream).run(None)
}

/// Like [`parse`], but stops early (returning the partial result) once
/// `cancel` is triggered.
pub fn parse_with_cancel(stream: TokenStream, cancel: &CancelToken) -> Analysis {
    Parser::new(stream).run(Some(cancel))
}

/// A structural parse error: the state machine hit a configuration it has no
/// local recovery for. Caught once by the engine loop, converted to a single
/// problem at the offending token, and the run halts.
#[derive(Debug)]
pub(crate) struct TokenError {
    pub token: Token,
    pub message: Option<String>,
}

impl TokenError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        TokenError {
            token,
            message: Some(message.into()),
        }
    }

    pub fn unexpected(token: Token) -> Self {
        TokenError {
            token,
            message: None,
        }
    }

    fn into_problem(self) -> Problem {
        let message = self
            .message
            .unwrap_or_else(|| format!("Unexpected Token: '{}'", self.token.text));
        Problem::error(self.token.start, self.token.end, message)
    }
}

/// Outcome of stepping a state once.
pub(crate) enum Step {
    /// Keep the state on the stack; it made progress or is waiting.
    Continue,
    /// Suspend: push a child state above this one.
    Push(State),
    /// The state is done; pop it and deliver the node to its parent.
    Finish(Finished),
}

/// A completed node travelling from a finished state to its parent.
pub(crate) enum Finished {
    Statement(Statement),
    FirstSkip(crate::ast::FirstSkipClause, stmt::FirstSkipSlot),
    Column {
        column: crate::ast::OutputColumn,
        trailing_comma: bool,
    },
    QualifiedStar(crate::ast::IdentifierStar),
    Expr(crate::ast::ExprNode),
    Paren(crate::ast::Parenthesis),
    From(crate::ast::FromClause),
    Join(crate::ast::JoinClause),
    JoinColumns(crate::ast::JoinColumnList),
    Where(crate::ast::WhereClause),
    GroupBy(crate::ast::GroupByClause),
    Having(crate::ast::HavingClause),
    Table(crate::ast::TableReference),
}

/// Every live parse state. The stack owns its states exclusively; a state
/// never holds a reference back into the parser.
pub(crate) enum State {
    Select(SelectState),
    Empty(EmptyState),
    Unknown(UnknownState),
    FirstSkip(FirstSkipState),
    From(FromState),
    Join(JoinState),
    JoinColumns(JoinColumnsState),
    Where(WhereState),
    GroupBy(GroupByState),
    Having(HavingState),
    Table(TableState),
    Derived(DerivedState),
    Column(ColumnState),
    QualifiedStar(QualifiedStarState),
    Expr(ExprState),
    Paren(ParenState),
    Function(FunctionState),
    #[cfg(test)]
    Stall(StallState),
}

impl State {
    fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        match self {
            State::Select(s) => s.step(p),
            State::Empty(s) => s.step(p),
            State::Unknown(s) => s.step(p),
            State::FirstSkip(s) => s.step(p),
            State::From(s) => s.step(p),
            State::Join(s) => s.step(p),
            State::JoinColumns(s) => s.step(p),
            State::Where(s) => s.step(p),
            State::GroupBy(s) => s.step(p),
            State::Having(s) => s.step(p),
            State::Table(s) => s.step(p),
            State::Derived(s) => s.step(p),
            State::Column(s) => s.step(p),
            State::QualifiedStar(s) => s.step(p),
            State::Expr(s) => s.step(p),
            State::Paren(s) => s.step(p),
            State::Function(s) => s.step(p),
            #[cfg(test)]
            State::Stall(_) => Ok(Step::Continue),
        }
    }

    /// Hand a finished child node to this state. May return a follow-up state
    /// to push (e.g. the next output column after a trailing comma).
    fn accept(&mut self, node: Finished, p: &mut Parser) -> Option<State> {
        match self {
            State::Select(s) => s.accept(node, p),
            State::FirstSkip(s) => s.accept(node),
            State::From(s) => s.accept(node),
            State::Join(s) => s.accept(node),
            State::GroupBy(s) => s.accept(node),
            State::Where(s) => s.accept(node),
            State::Having(s) => s.accept(node),
            State::Derived(s) => s.accept(node),
            State::Column(s) => s.accept(node),
            State::Expr(s) => s.accept(node),
            State::Paren(s) => s.accept(node),
            State::Function(s) => s.accept(node),
            _ => {
                debug!("dropped child node delivered to a leaf state");
                None
            }
        }
    }
}

/// The parser: token cursor, state stack, completed statements, diagnostics.
///
/// Only the currently-stepping state mutates the cursor; finished top-level
/// statements move into `parsed`.
pub(crate) struct Parser {
    pub stream: TokenStream,
    pub index: usize,
    stack: Vec<State>,
    parsed: Vec<Statement>,
    pub problems: Vec<Problem>,
}

impl Parser {
    pub fn new(mut stream: TokenStream) -> Self {
        let problems = std::mem::take(&mut stream.problems);
        Parser {
            stream,
            index: 0,
            stack: Vec::new(),
            parsed: Vec::new(),
            problems,
        }
    }

    pub fn source(&self) -> &str {
        &self.stream.text
    }

    pub fn span(&self, start: u32, end: u32) -> Span {
        Span::slice(&self.stream.text, start, end)
    }

    /// The token at the cursor, clamped to the trailing EOF token.
    pub fn curr(&self) -> &Token {
        self.token_at(self.index)
    }

    /// Lookahead/lookbehind by offset, clamped to the token array bounds.
    pub fn token_offset(&self, offset: isize) -> &Token {
        let at = self.index.saturating_add_signed(offset);
        self.token_at(at)
    }

    fn token_at(&self, at: usize) -> &Token {
        let last = self.stream.tokens.len().saturating_sub(1);
        &self.stream.tokens[at.min(last)]
    }

    pub fn advance(&mut self) {
        self.index += 1;
    }

    pub fn retreat(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Push a problem at the current token, substituting its text for `%s`.
    pub fn next_token_error(&mut self, message: &str) {
        let t = self.curr();
        let message = message.replace("%s", &t.text);
        self.problems.push(Problem::error(t.start, t.end, message));
    }

    fn run(mut self, cancel: Option<&CancelToken>) -> Analysis {
        if self.stream.tokens.is_empty() {
            return Analysis {
                statements: self.parsed,
                problems: self.problems,
            };
        }

        let seed = statement(&mut self);
        self.stack.push(seed);

        let mut last_index = usize::MAX;
        let mut stalled = 0usize;

        while let Some(mut state) = self.stack.pop() {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                debug!("parse cancelled at token index {}", self.index);
                break;
            }

            if self.index == last_index {
                stalled += 1;
                if stalled >= MAX_STALLED_STEPS {
                    let t = self.curr().clone();
                    self.problems
                        .push(Problem::error(t.start, t.end, "Infinite Loop encountered"));
                    warn!(offset = t.start, "parser stalled, aborting this run");
                    break;
                }
            } else {
                stalled = 0;
                last_index = self.index;
            }

            match state.step(&mut self) {
                Ok(Step::Continue) => self.stack.push(state),
                Ok(Step::Push(child)) => {
                    self.stack.push(state);
                    self.stack.push(child);
                }
                Ok(Step::Finish(node)) => self.deliver(node),
                Err(err) => {
                    warn!(
                        offset = err.token.start,
                        "structural parse error: {:?}", err.message
                    );
                    self.problems.push(err.into_problem());
                    self.stack.clear();
                    break;
                }
            }
        }

        debug!(
            statements = self.parsed.len(),
            problems = self.problems.len(),
            "parse finished"
        );
        Analysis {
            statements: self.parsed,
            problems: self.problems,
        }
    }

    fn deliver(&mut self, node: Finished) {
        match self.stack.pop() {
            Some(mut parent) => {
                let follow_up = parent.accept(node, self);
                self.stack.push(parent);
                if let Some(state) = follow_up {
                    self.stack.push(state);
                }
            }
            None => {
                if let Finished::Statement(stmt) = node {
                    self.parsed.push(stmt);
                    if self.index < self.stream.tokens.len() {
                        let seed = statement(self);
                        self.stack.push(seed);
                    }
                } else {
                    debug!("non-statement node finished with an empty stack");
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) struct StallState;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_loop_guard_halts_parse() {
        let stream = lexer::lex("SELECT 1 FROM t");
        let mut parser = Parser::new(stream);
        parser.stack.push(State::Stall(StallState));
        let analysis = parser.run(None);
        assert_eq!(
            analysis
                .problems
                .iter()
                .filter(|p| p.message == "Infinite Loop encountered")
                .count(),
            1
        );
    }

    #[test]
    fn cancellation_stops_the_run() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let analysis = parse_with_cancel(lexer::lex("SELECT 1 FROM t;"), &cancel);
        assert!(analysis.statements.is_empty());
    }
}
