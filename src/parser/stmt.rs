//! Statement parsing
//!
//! Statement dispatch plus the SELECT clause state machine: FIRST/SKIP,
//! column list, FROM with joins, WHERE, GROUP BY and HAVING, with strict
//! clause ordering. Clauses the grammar names beyond these keep reserved
//! ordering slots but are not implemented.

use std::mem;

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::ast::{
    BaseTable, DerivedTable, EmptyStatement, FirstSkipArg, FirstSkipClause, FromClause,
    GroupByClause, HasSpan, HavingClause, JoinClause, JoinColumnList, JoinCondition, JoinType,
    OutputColumn, Parenthesis, SelectStatement, Statement, TableReference, UnknownStatement,
    WhereClause,
};
use crate::error::Problem;
use crate::parser::expr::{ColumnState, ExprState, ParenState};
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::{Finished, Parser, State, Step, TokenError};

/// True at `;`, end of input, or (inside a sub-query) a closing paren.
pub(crate) fn is_end_of_statement(token: &Token, sub_query: bool) -> bool {
    matches!(token.kind, TokenKind::Eof | TokenKind::Semicolon)
        || (sub_query && token.kind == TokenKind::RParen)
}

/// Top-level dispatch: decide which statement state handles the current token.
pub(crate) fn statement(p: &mut Parser) -> State {
    let t = p.curr();
    if t.kind == TokenKind::RegularIdentifier && t.text_is("SELECT") {
        State::Select(SelectState::begin(p, false))
    } else if is_end_of_statement(t, false) {
        State::Empty(EmptyState::begin(p))
    } else {
        State::Unknown(UnknownState::new(p))
    }
}

/// A statement consisting only of a terminator token.
pub(crate) struct EmptyState {
    start: u32,
}

impl EmptyState {
    pub fn begin(p: &mut Parser) -> Self {
        EmptyState {
            start: p.curr().start,
        }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let t = p.curr().clone();
        p.advance();
        Ok(Step::Finish(Finished::Statement(Statement::Empty(
            EmptyStatement {
                span: p.span(self.start, t.end),
            },
        ))))
    }
}

/// Recovery for unrecognized statements: report once, then skip everything
/// up to the next statement boundary.
pub(crate) struct UnknownState {
    start: u32,
}

impl UnknownState {
    pub fn new(p: &Parser) -> Self {
        UnknownState {
            start: p.curr().start,
        }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let first = p.curr().clone();
        let message = if first.kind == TokenKind::RegularIdentifier {
            format!("\"{}\" is not a valid statement type", first.text)
        } else {
            format!("Expected statement type, received \"{}\"", first.text)
        };
        p.problems
            .push(Problem::error(first.start, first.end, message));

        let mut tokens = Vec::new();
        loop {
            tokens.push(p.curr().clone());
            p.advance();
            if is_end_of_statement(p.curr(), false) {
                break;
            }
        }
        let end = p.curr().end;
        Ok(Step::Finish(Finished::Statement(Statement::Unknown(
            UnknownStatement {
                span: p.span(self.start, end),
                tokens,
            },
        ))))
    }
}

/// Canonical clause order; ranks past GROUP BY are reserved slots for
/// clauses that are recognized in the ordering table only.
const SELECT_CLAUSES: &[&str] = &[
    "FIRST clause",
    "SKIP clause",
    "Column List",
    "FROM clause",
    "JOIN clause",
    "WHERE clause",
    "GROUP BY clause",
    "WINDOW clause",
    "PLAN clause",
    "UNION clause",
    "ORDER BY clause",
    "ROWS clause",
    "OFFSET clause",
    "FETCH clause",
    "FOR UPDATE clause",
    "WITH LOCK clause",
    "INTO clause",
];

const RANK_FIRST: usize = 0;
const RANK_SKIP: usize = 1;
const RANK_COLUMN_LIST: usize = 2;
const RANK_FROM: usize = 3;
const RANK_WHERE: usize = 5;
const RANK_GROUP_BY: usize = 6;

/// Which slot a finished FIRST/SKIP clause lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FirstSkipSlot {
    First,
    Skip,
}

/// SELECT statement state. `order_rank` tracks the last accepted clause so
/// duplicates and out-of-order clauses are rejected.
pub(crate) struct SelectState {
    start: u32,
    inside_paren: bool,
    order_rank: usize,
    columns: Vec<OutputColumn>,
    star: Option<Token>,
    first: Option<FirstSkipClause>,
    skip: Option<FirstSkipClause>,
    from: Option<FromClause>,
    where_clause: Option<WhereClause>,
    group_by: Option<GroupByClause>,
}

impl SelectState {
    pub fn begin(p: &mut Parser, inside_paren: bool) -> Self {
        let start = p.curr().start;
        p.advance();
        SelectState {
            start,
            inside_paren,
            order_rank: 0,
            columns: Vec::new(),
            star: None,
            first: None,
            skip: None,
            from: None,
            where_clause: None,
            group_by: None,
        }
    }

    fn check_order(&self, p: &Parser, rank: usize) -> Result<usize, TokenError> {
        let label = SELECT_CLAUSES[rank];
        if self.order_rank == rank + 1 {
            return Err(TokenError::new(
                p.curr().clone(),
                format!("Duplicate {} in select statement", label),
            ));
        }
        if self.order_rank > rank {
            return Err(TokenError::new(
                p.curr().clone(),
                format!("{} in incorrect order on select statement", label),
            ));
        }
        Ok(rank + 1)
    }

    fn finish(&mut self, p: &mut Parser, end: u32) -> Finished {
        if self.from.is_none() {
            p.problems.push(Problem::error(
                self.start,
                end,
                r#"Missing "FROM" expression in "SELECT" statement"#,
            ));
        }
        Finished::Statement(Statement::Select(SelectStatement {
            span: p.span(self.start, end),
            columns: mem::take(&mut self.columns),
            star: self.star.take(),
            first: self.first.take(),
            skip: self.skip.take(),
            from: self.from.take(),
            where_clause: self.where_clause.take(),
            group_by: self.group_by.take(),
        }))
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let tok = p.curr().clone();

        if self.inside_paren && tok.kind == TokenKind::RParen {
            // Leave the paren for the enclosing state to consume.
            let end = p.token_offset(-1).end;
            return Ok(Step::Finish(self.finish(p, end)));
        }
        if is_end_of_statement(&tok, false) {
            if self.inside_paren {
                p.problems
                    .push(Problem::error(self.start, tok.end, "Unclosed Subquery"));
            }
            let node = self.finish(p, tok.end);
            p.advance();
            return Ok(Step::Finish(node));
        }

        match tok.text.to_uppercase().as_str() {
            "FIRST" => {
                self.order_rank = self.check_order(p, RANK_FIRST)?;
                Ok(Step::Push(State::FirstSkip(FirstSkipState::begin(
                    p,
                    FirstSkipSlot::First,
                ))))
            }
            "SKIP" => {
                self.order_rank = self.check_order(p, RANK_SKIP)?;
                Ok(Step::Push(State::FirstSkip(FirstSkipState::begin(
                    p,
                    FirstSkipSlot::Skip,
                ))))
            }
            "FROM" => {
                if self.columns.is_empty() && self.star.is_none() {
                    p.problems.push(Problem::error(
                        tok.start,
                        tok.end,
                        r#"No Columns in "SELECT" statement"#,
                    ));
                    self.order_rank = RANK_FROM + 1;
                } else {
                    self.order_rank = self.check_order(p, RANK_FROM)?;
                }
                Ok(Step::Push(State::From(FromState::begin(p))))
            }
            "WHERE" => {
                self.order_rank = self.check_order(p, RANK_WHERE)?;
                Ok(Step::Push(State::Where(WhereState::begin(p))))
            }
            "GROUP" => {
                self.order_rank = self.check_order(p, RANK_GROUP_BY)?;
                Ok(Step::Push(State::GroupBy(GroupByState::begin(p)?)))
            }
            _ => {
                if tok.kind == TokenKind::Asterisk {
                    self.order_rank = self.check_order(p, RANK_COLUMN_LIST)?;
                    self.star = Some(tok);
                    p.advance();
                    Ok(Step::Continue)
                } else if self.columns.is_empty() && self.star.is_none() {
                    self.order_rank = self.check_order(p, RANK_COLUMN_LIST)?;
                    Ok(Step::Push(State::Column(ColumnState::new(
                        p,
                        self.inside_paren,
                    ))))
                } else {
                    Err(TokenError::unexpected(tok))
                }
            }
        }
    }

    pub fn accept(&mut self, node: Finished, p: &mut Parser) -> Option<State> {
        match node {
            Finished::FirstSkip(clause, FirstSkipSlot::First) => self.first = Some(clause),
            Finished::FirstSkip(clause, FirstSkipSlot::Skip) => self.skip = Some(clause),
            Finished::Column {
                column,
                trailing_comma,
            } => {
                self.columns.push(column);
                if trailing_comma {
                    return Some(State::Column(ColumnState::new(p, self.inside_paren)));
                }
            }
            Finished::From(from) => self.from = Some(from),
            Finished::Where(where_clause) => self.where_clause = Some(where_clause),
            Finished::GroupBy(group_by) => self.group_by = Some(group_by),
            _ => {}
        }
        None
    }
}

/// FIRST/SKIP argument: a parenthesized expression, a `:variable`, or an
/// integer literal.
pub(crate) struct FirstSkipState {
    start: u32,
    keyword: Token,
    slot: FirstSkipSlot,
    argument: Option<FirstSkipArg>,
}

impl FirstSkipState {
    pub fn begin(p: &mut Parser, slot: FirstSkipSlot) -> Self {
        let keyword = p.curr().clone();
        p.advance();
        FirstSkipState {
            start: keyword.start,
            keyword,
            slot,
            argument: None,
        }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        if let Some(argument) = self.argument.take() {
            let end = match &argument {
                FirstSkipArg::Literal(t) | FirstSkipArg::Variable(t) | FirstSkipArg::Invalid(t) => {
                    t.end
                }
                FirstSkipArg::Parenthesized(paren) => paren.span.end,
            };
            return Ok(Step::Finish(Finished::FirstSkip(
                FirstSkipClause {
                    span: p.span(self.start, end),
                    keyword: self.keyword.clone(),
                    argument: Some(argument),
                },
                self.slot,
            )));
        }

        let t = p.curr().clone();
        match t.kind {
            TokenKind::LParen => Ok(Step::Push(State::Paren(ParenState::begin(p)))),
            TokenKind::Variable => {
                self.argument = Some(FirstSkipArg::Variable(t));
                p.advance();
                Ok(Step::Continue)
            }
            TokenKind::Integer => {
                self.argument = Some(FirstSkipArg::Literal(t));
                p.advance();
                Ok(Step::Continue)
            }
            TokenKind::FixedPoint | TokenKind::FloatingPoint | TokenKind::String => {
                p.problems.push(Problem::error(
                    t.start,
                    t.end,
                    format!("Argument literal must be an integer, found {:?}", t.kind),
                ));
                self.argument = Some(FirstSkipArg::Literal(t));
                p.advance();
                Ok(Step::Continue)
            }
            _ => {
                // Recorded but not consumed; the statement reprocesses it.
                p.problems.push(Problem::error(
                    t.start,
                    t.end,
                    format!(
                        "Expected {} argument, found: \"{}\"",
                        self.keyword.text.to_uppercase(),
                        t.text
                    ),
                ));
                self.argument = Some(FirstSkipArg::Invalid(t));
                Ok(Step::Continue)
            }
        }
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        if let Finished::Paren(paren) = node {
            self.argument = Some(FirstSkipArg::Parenthesized(paren));
        }
        None
    }
}

static VALID_JOIN_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["NATURAL", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER"]
        .into_iter()
        .collect()
});

/// FROM clause: one table source, then any number of joins.
pub(crate) struct FromState {
    start: u32,
    source: Option<TableReference>,
    joins: Vec<JoinClause>,
}

impl FromState {
    pub fn begin(p: &mut Parser) -> Self {
        let start = p.curr().start;
        p.advance();
        FromState {
            start,
            source: None,
            joins: Vec::new(),
        }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let t = p.curr().clone();
        let up = t.text.to_uppercase();

        if VALID_JOIN_TOKENS.contains(up.as_str()) {
            return Ok(Step::Push(State::Join(JoinState::new(t.start))));
        }
        if up == "CROSS" {
            return Err(TokenError::new(t, "CROSS joins are not implemented"));
        }
        if !self.joins.is_empty() || self.source.is_some() {
            let end = p.token_offset(-1).end;
            return Ok(Step::Finish(Finished::From(FromClause {
                span: p.span(self.start, end),
                source: self.source.take(),
                joins: mem::take(&mut self.joins),
            })));
        }
        Ok(Step::Push(table(p)?))
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        match node {
            Finished::Table(source) => self.source = Some(source),
            Finished::Join(join) => self.joins.push(join),
            _ => {}
        }
        None
    }
}

/// One JOIN: type, joined table, then a mandatory ON or USING condition.
/// Bare `JOIN` and bare `OUTER` default to LEFT.
pub(crate) struct JoinState {
    start: u32,
    join_type: Option<JoinType>,
    source: Option<TableReference>,
    condition: Option<JoinCondition>,
}

impl JoinState {
    pub fn new(start: u32) -> Self {
        JoinState {
            start,
            join_type: None,
            source: None,
            condition: None,
        }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        if self.join_type.is_none() && self.source.is_none() {
            let t = p.curr().clone();
            let up = t.text.to_uppercase();
            if VALID_JOIN_TOKENS.contains(up.as_str()) {
                if up == "JOIN" {
                    self.join_type = Some(JoinType::Left);
                } else if up == "OUTER" {
                    self.join_type = Some(JoinType::Left);
                    p.advance();
                } else {
                    self.join_type = JoinType::from_keyword(&up);
                    p.advance();
                    if p.curr().text_is("OUTER") {
                        p.advance();
                    }
                }
                if !p.curr().text_is("JOIN") {
                    return Err(TokenError::new(
                        p.curr().clone(),
                        format!("Expected \"JOIN\" found '{}'", p.curr().text),
                    ));
                }
                p.advance();
                return Ok(Step::Continue);
            }
            if up == "CROSS" {
                return Err(TokenError::new(t, "CROSS joins are not implemented"));
            }
            return Err(TokenError::unexpected(t));
        }

        if self.source.is_none() {
            return Ok(Step::Push(table(p)?));
        }

        if self.condition.is_none() {
            let t = p.curr().clone();
            return match t.text.to_uppercase().as_str() {
                "ON" => {
                    p.advance();
                    Ok(Step::Push(State::Expr(ExprState::new())))
                }
                "USING" => {
                    p.advance();
                    if p.curr().kind != TokenKind::LParen {
                        return Err(TokenError::new(
                            p.curr().clone(),
                            format!("Expected '(', found {}", p.curr().text),
                        ));
                    }
                    let columns = JoinColumnsState::new(p.curr().start);
                    p.advance();
                    Ok(Step::Push(State::JoinColumns(columns)))
                }
                _ => Err(TokenError::new(
                    t.clone(),
                    format!("Expected 'USING' or 'ON' clause, found {}", t.text),
                )),
            };
        }

        let end = self.condition.as_ref().map(|c| c.end()).unwrap_or(self.start);
        Ok(Step::Finish(Finished::Join(JoinClause {
            span: p.span(self.start, end),
            join_type: self.join_type.unwrap_or(JoinType::Left),
            source: self.source.take(),
            condition: self.condition.take(),
        })))
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        match node {
            Finished::Table(source) => self.source = Some(source),
            Finished::Expr(condition) => self.condition = Some(JoinCondition::On(condition)),
            Finished::JoinColumns(columns) => {
                self.condition = Some(JoinCondition::Using(columns))
            }
            _ => {}
        }
        None
    }
}

/// `USING (col, col, ...)` — identifiers get the same reserved/keyword
/// diagnostics as aliases.
pub(crate) struct JoinColumnsState {
    start: u32,
}

impl JoinColumnsState {
    pub fn new(start: u32) -> Self {
        JoinColumnsState { start }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let mut columns = Vec::new();
        loop {
            let t = p.curr().clone();
            if t.is_identifier() {
                if t.kind == TokenKind::RegularIdentifier {
                    if t.is_reserved {
                        p.problems.push(Problem::error(
                            t.start,
                            t.end,
                            format!("Invalid alias, '{}' is a reserved keyword", t.text),
                        ));
                    } else if t.is_keyword {
                        p.problems.push(Problem::warning(
                            t.start,
                            t.end,
                            format!(
                                "'{}' is a keyword and may become reserved in the future, consider changing it, or surrounding it with double quotes",
                                t.text
                            ),
                        ));
                    }
                }
                columns.push(t);
                p.advance();
            }
            if p.curr().kind == TokenKind::Comma {
                p.advance();
                continue;
            }
            if p.curr().kind == TokenKind::RParen {
                p.advance();
                break;
            }
            return Err(TokenError::unexpected(p.curr().clone()));
        }
        let end = p.token_offset(-1).end;
        Ok(Step::Finish(Finished::JoinColumns(JoinColumnList {
            span: p.span(self.start, end),
            columns,
        })))
    }
}

/// WHERE clause: a single value expression.
pub(crate) struct WhereState {
    start: u32,
    condition: Option<crate::ast::ExprNode>,
}

impl WhereState {
    pub fn begin(p: &mut Parser) -> Self {
        let start = p.curr().start;
        p.advance();
        WhereState {
            start,
            condition: None,
        }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        match self.condition.take() {
            None => Ok(Step::Push(State::Expr(ExprState::new()))),
            Some(condition) => {
                let end = condition.end();
                Ok(Step::Finish(Finished::Where(WhereClause {
                    span: p.span(self.start, end),
                    condition,
                })))
            }
        }
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        if let Finished::Expr(condition) = node {
            self.condition = Some(condition);
        }
        None
    }
}

/// GROUP BY: mandatory BY, comma-separated value expressions, optional
/// trailing HAVING.
pub(crate) struct GroupByState {
    start: u32,
    columns: Vec<crate::ast::ExprNode>,
    having: Option<HavingClause>,
}

impl GroupByState {
    pub fn begin(p: &mut Parser) -> Result<Self, TokenError> {
        let start = p.curr().start;
        p.advance();
        if !p.curr().text_is("BY") {
            return Err(TokenError::new(
                p.curr().clone(),
                format!("Expected 'BY', found {}", p.curr().text),
            ));
        }
        p.advance();
        Ok(GroupByState {
            start,
            columns: Vec::new(),
            having: None,
        })
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let t = p.curr().clone();

        if t.kind == TokenKind::Comma {
            if self.columns.is_empty() {
                p.problems
                    .push(Problem::error(self.start, t.end, "Unexpected Token: ','"));
            }
            p.advance();
            return Ok(Step::Push(State::Expr(ExprState::new())));
        }

        if t.text_is("HAVING") {
            if self.having.is_some() {
                return Err(TokenError::new(
                    t,
                    "Duplicate 'HAVING' clause in 'GROUP BY' expression",
                ));
            }
            if self.columns.is_empty() {
                return Err(TokenError::new(t, "Empty 'GROUP BY' clause"));
            }
            return Ok(Step::Push(State::Having(HavingState::begin(p))));
        }

        if self.columns.is_empty() && !is_end_of_statement(&t, false) {
            return Ok(Step::Push(State::Expr(ExprState::new())));
        }

        let end = p.token_offset(-1).end;
        if self.columns.is_empty() {
            p.problems
                .push(Problem::error(self.start, end, "Empty Group By Expression"));
        }
        Ok(Step::Finish(Finished::GroupBy(GroupByClause {
            span: p.span(self.start, end),
            columns: mem::take(&mut self.columns),
            having: self.having.take(),
        })))
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        match node {
            Finished::Expr(column) => self.columns.push(column),
            Finished::Having(having) => self.having = Some(having),
            _ => {}
        }
        None
    }
}

/// HAVING clause: a single value expression.
pub(crate) struct HavingState {
    start: u32,
    condition: Option<crate::ast::ExprNode>,
}

impl HavingState {
    pub fn begin(p: &mut Parser) -> Self {
        let start = p.curr().start;
        p.advance();
        HavingState {
            start,
            condition: None,
        }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        match self.condition.take() {
            None => Ok(Step::Push(State::Expr(ExprState::new()))),
            Some(condition) => {
                let end = condition.end();
                Ok(Step::Finish(Finished::Having(HavingClause {
                    span: p.span(self.start, end),
                    condition,
                })))
            }
        }
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        if let Finished::Expr(condition) = node {
            self.condition = Some(condition);
        }
        None
    }
}

/// Decide which table-reference state handles the current token.
///
/// LATERAL and procedure calls in FROM position are recognized but
/// unimplemented; they raise structural errors.
pub(crate) fn table(p: &mut Parser) -> Result<State, TokenError> {
    let t = p.curr().clone();
    if t.kind == TokenKind::LParen {
        return Ok(State::Derived(DerivedState::new(t.start)));
    }
    if t.is_identifier() {
        if p.token_offset(1).kind == TokenKind::LParen {
            return Err(TokenError::new(
                t,
                "Procedure calls in a FROM clause are not implemented",
            ));
        }
        if t.text_is("LATERAL") {
            return Err(TokenError::new(t, "LATERAL derived tables are not implemented"));
        }
        return Ok(State::Table(TableState {
            start: t.start,
            known: true,
        }));
    }
    p.next_token_error("Invalid Token: %s");
    Ok(State::Table(TableState {
        start: t.start,
        known: false,
    }))
}

/// Optional `[AS] alias` after a table reference or output column.
///
/// Reserved words are rejected (but still recorded when AS was explicit);
/// non-reserved keywords are accepted with a warning.
pub(crate) fn parse_alias(p: &mut Parser) -> Option<Token> {
    let mut has_as = false;
    if p.curr().text_is("AS") {
        p.advance();
        has_as = true;
    }

    let token = p.curr().clone();
    if token.is_identifier() && !token.is_reserved {
        if token.is_keyword {
            p.problems.push(Problem::warning(
                token.start,
                token.end,
                format!(
                    "'{}' is a keyword and may become reserved in the future, consider changing it, or surrounding it with double quotes",
                    token.text
                ),
            ));
        }
        p.advance();
        Some(token)
    } else if has_as {
        if token.is_reserved {
            p.problems.push(Problem::error(
                token.start,
                token.end,
                format!("Invalid alias, '{}' is a reserved keyword", token.text),
            ));
            p.advance();
            Some(token)
        } else {
            p.problems.push(Problem::error(
                token.start,
                token.end,
                "Missing or invalid Alias",
            ));
            None
        }
    } else {
        None
    }
}

/// A plain (or recovered) table name with optional alias.
pub(crate) struct TableState {
    start: u32,
    known: bool,
}

impl TableState {
    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let identifier = p.curr().clone();
        p.advance();
        let alias = parse_alias(p);
        let end = alias.as_ref().map_or(identifier.end, |a| a.end);
        let base = BaseTable {
            span: p.span(self.start, end),
            identifier,
            alias,
        };
        let reference = if self.known {
            TableReference::Table(base)
        } else {
            TableReference::Unknown(base)
        };
        Ok(Step::Finish(Finished::Table(reference)))
    }
}

/// A parenthesized sub-select used as a FROM source.
pub(crate) struct DerivedState {
    start: u32,
    paren: Option<Parenthesis>,
}

impl DerivedState {
    pub fn new(start: u32) -> Self {
        DerivedState { start, paren: None }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        if self.paren.is_none() {
            return Ok(Step::Push(State::Paren(ParenState::begin(p))));
        }

        let last = p.token_offset(-1).clone();
        let alias = if last.kind == TokenKind::RParen {
            parse_alias(p)
        } else {
            p.next_token_error("Unknown Token: %s");
            None
        };
        let end = alias.as_ref().map_or(last.end, |a| a.end);
        Ok(Step::Finish(Finished::Table(TableReference::Derived(
            DerivedTable {
                span: p.span(self.start, end),
                paren: self.paren.take(),
                alias,
            },
        ))))
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        if let Finished::Paren(paren) = node {
            self.paren = Some(paren);
        }
        None
    }
}
