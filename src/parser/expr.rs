//! Value-expression parsing
//!
//! Two phases per expression slot. Collection consumes tokens into a flat
//! run of operands and operators until a terminator; parenthesized groups,
//! sub-selects and function calls suspend into child states. Resolution then
//! repeatedly splits the run at the weakest-binding operator (the leftmost
//! one with the highest precedence number), so that operator becomes the
//! root of the produced tree.

use std::mem;

use crate::ast::{
    ColumnExpr, Dereference, ExprNode, FunctionCall, HasSpan, IdentifierStar, OperatorToken,
    OutputColumn, ParenBody, Parenthesis, Span, StringKind, StringLiteral, TimeDateKind,
    TimeDateLiteral,
};
use crate::error::Problem;
use crate::parser::firebird::{self, OPERAND_KEYWORDS, UNARY_PRECEDENCE};
use crate::parser::lexer::{self, Token, TokenKind};
use crate::parser::stmt::{is_end_of_statement, parse_alias, SelectState};
use crate::parser::{Finished, Parser, State, Step, TokenError};

/// One collected element of a flat expression run.
enum Element {
    Operand(ExprNode),
    Operator(OperatorToken),
}

/// Collects one value expression.
pub(crate) struct ExprState {
    elements: Vec<Element>,
    expecting_operand: bool,
}

impl ExprState {
    pub fn new() -> Self {
        ExprState {
            elements: Vec::new(),
            expecting_operand: true,
        }
    }

    fn push_operand(&mut self, node: ExprNode) {
        self.elements.push(Element::Operand(node));
        self.expecting_operand = false;
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let t = p.curr().clone();

        if is_end_of_statement(&t, false)
            || t.kind == TokenKind::RParen
            || t.kind == TokenKind::Comma
            || (t.kind == TokenKind::RegularIdentifier && t.text_is("FROM"))
        {
            return self.finish(p);
        }

        // Prefix +/- bind tightest; only valid where an operand may start.
        if self.expecting_operand
            && t.kind == TokenKind::Operator
            && (t.text == "+" || t.text == "-")
        {
            self.elements.push(Element::Operator(OperatorToken {
                span: p.span(t.start, t.end),
                precedence: UNARY_PRECEDENCE,
                unary: true,
            }));
            p.advance();
            return Ok(Step::Continue);
        }

        if self.expecting_operand && t.kind == TokenKind::Asterisk {
            p.advance();
            self.push_operand(ExprNode::Star(t));
            return Ok(Step::Continue);
        }

        if let Some(op) = firebird::match_operator(p) {
            self.elements.push(Element::Operator(op));
            self.expecting_operand = true;
            return Ok(Step::Continue);
        }

        if !self.expecting_operand {
            // A complete operand with no operator following: the token
            // belongs to the caller (alias, clause keyword, list separator).
            return self.finish(p);
        }

        match t.kind {
            TokenKind::Integer | TokenKind::FixedPoint | TokenKind::FloatingPoint => {
                p.advance();
                self.push_operand(ExprNode::Literal(t));
                Ok(Step::Continue)
            }
            TokenKind::String => {
                p.advance();
                let literal = string_literal(p, None, t);
                self.push_operand(ExprNode::String(literal));
                Ok(Step::Continue)
            }
            TokenKind::Introducer => {
                p.advance();
                let literal = if p.curr().kind == TokenKind::String {
                    let token = p.curr().clone();
                    p.advance();
                    string_literal(p, Some(t), token)
                } else {
                    p.next_token_error("Expected string after introducer");
                    StringLiteral {
                        span: p.span(t.start, t.end),
                        kind: StringKind::Plain,
                        introducer: Some(t),
                        token: None,
                        contents: String::new(),
                    }
                };
                self.push_operand(ExprNode::String(literal));
                Ok(Step::Continue)
            }
            TokenKind::Variable => {
                p.advance();
                self.push_operand(ExprNode::Variable(t));
                Ok(Step::Continue)
            }
            TokenKind::LParen => Ok(Step::Push(State::Paren(ParenState::begin(p)))),
            TokenKind::RegularIdentifier | TokenKind::NonRegularIdentifier => {
                let next_kind = p.token_offset(1).kind;
                if next_kind == TokenKind::LParen {
                    return Ok(Step::Push(State::Function(FunctionState::begin(p))));
                }
                if next_kind == TokenKind::Dot {
                    let node = dereference(p);
                    self.push_operand(node);
                    return Ok(Step::Continue);
                }
                if t.kind == TokenKind::RegularIdentifier {
                    if let Some(kind) = time_date_kind(&t.text) {
                        let node = time_date_literal(p, kind);
                        self.push_operand(node);
                        return Ok(Step::Continue);
                    }
                    if t.is_reserved && !OPERAND_KEYWORDS.contains(t.text.to_uppercase().as_str())
                    {
                        // A clause keyword: collection is over.
                        return self.finish(p);
                    }
                }
                p.advance();
                self.push_operand(ExprNode::Identifier(t));
                Ok(Step::Continue)
            }
            _ => {
                p.next_token_error("Expected expression, found: '%s'");
                p.advance();
                Ok(Step::Continue)
            }
        }
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        match node {
            Finished::Paren(paren) => self.push_operand(ExprNode::Parenthesized(paren)),
            Finished::Expr(node) => self.push_operand(node),
            _ => {}
        }
        None
    }

    fn finish(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let elements = mem::take(&mut self.elements);
        if elements.is_empty() {
            let t = p.curr().clone();
            p.problems.push(Problem::error(
                t.start,
                t.end,
                format!("Expected expression, found: '{}'", t.text),
            ));
            return Ok(Step::Finish(Finished::Expr(ExprNode::Empty(Span::empty(
                t.start,
            )))));
        }
        let Parser {
            stream, problems, ..
        } = p;
        let node = resolve(elements, &stream.text, problems);
        Ok(Step::Finish(Finished::Expr(node)))
    }
}

/// Resolve a collected run into a tree. The leftmost element with the
/// strictly highest precedence number (weakest binding) becomes the root;
/// both sides resolve recursively the same way.
fn resolve(mut elements: Vec<Element>, src: &str, problems: &mut Vec<Problem>) -> ExprNode {
    if matches!(elements.as_slice(), [Element::Operand(_)]) {
        if let Some(Element::Operand(node)) = elements.pop() {
            return node;
        }
    }

    let mut best: Option<(usize, u8)> = None;
    for (i, element) in elements.iter().enumerate() {
        if let Element::Operator(op) = element {
            if best.map_or(true, |(_, precedence)| op.precedence > precedence) {
                best = Some((i, op.precedence));
            }
        }
    }

    let Some((idx, _)) = best else {
        // Adjacent operands without an operator between them.
        let mut iter = elements.into_iter();
        let first = match iter.next() {
            Some(Element::Operand(node)) => node,
            _ => ExprNode::Empty(Span::empty(0)),
        };
        for extra in iter {
            if let Element::Operand(node) = extra {
                problems.push(Problem::error(
                    node.start(),
                    node.end(),
                    format!(
                        "Expected expression, found: '{}'",
                        src.get(node.start() as usize..node.end() as usize).unwrap_or("")
                    ),
                ));
            }
        }
        return first;
    };

    let right_part = elements.split_off(idx + 1);
    let Some(Element::Operator(op)) = elements.pop() else {
        return ExprNode::Empty(Span::empty(0));
    };
    let left_part = elements;

    let op_text = op.span.text.to_uppercase();
    let is_not = op_text == "NOT";
    let is_family = op_text == "IS" || op_text.starts_with("IS ");

    if left_part.is_empty() && (op.unary || is_not) {
        let operand = resolve_side(right_part, op.span.end, src, problems);
        let span = Span::slice(src, op.span.start, operand.end().max(op.span.end));
        return ExprNode::Unary(crate::ast::UnaryExpr {
            span,
            op,
            operand: Box::new(operand),
            postfix: false,
        });
    }

    if right_part.is_empty() && is_family {
        // `IS [NOT] NULL` and friends absorb their trailing word into the
        // operator; an empty right side is a complete postfix predicate.
        let operand = resolve_side(left_part, op.span.start, src, problems);
        let span = Span::slice(src, operand.start().min(op.span.start), op.span.end);
        return ExprNode::Unary(crate::ast::UnaryExpr {
            span,
            op,
            operand: Box::new(operand),
            postfix: true,
        });
    }

    let left = resolve_side(left_part, op.span.start, src, problems);
    let right = resolve_side(right_part, op.span.end, src, problems);
    let span = Span::slice(src, left.start(), right.end());
    ExprNode::Binary(crate::ast::BinaryExpr {
        span,
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn resolve_side(
    elements: Vec<Element>,
    at: u32,
    src: &str,
    problems: &mut Vec<Problem>,
) -> ExprNode {
    if elements.is_empty() {
        problems.push(Problem::error(at, at, "Expected Expression, found nothing"));
        return ExprNode::Empty(Span::empty(at));
    }
    resolve(elements, src, problems)
}

/// Build a string-literal node from a lexed string token, re-deriving kind
/// and contents the same way the lexer matched them.
fn string_literal(p: &Parser, introducer: Option<Token>, token: Token) -> StringLiteral {
    let (kind, contents) = match lexer::scan_string(&token.text) {
        Some(s) if s.hex => (StringKind::Hex, s.contents),
        Some(s) if s.quoted_delimiter => (StringKind::Quoted, s.contents),
        Some(s) => (StringKind::Plain, s.contents),
        None => (StringKind::Plain, String::new()),
    };
    let start = introducer.as_ref().map_or(token.start, |i| i.start);
    StringLiteral {
        span: p.span(start, token.end),
        kind,
        introducer,
        token: Some(token),
        contents,
    }
}

fn time_date_kind(word: &str) -> Option<TimeDateKind> {
    match word.to_uppercase().as_str() {
        "DATE" => Some(TimeDateKind::Date),
        "TIME" => Some(TimeDateKind::Time),
        "TIMESTAMP" => Some(TimeDateKind::Timestamp),
        _ => None,
    }
}

/// `DATE '...'` and friends: the keyword plus a following string literal,
/// itself possibly prefixed by an introducer.
fn time_date_literal(p: &mut Parser, kind: TimeDateKind) -> ExprNode {
    let keyword = p.curr().clone();
    p.advance();

    let mut introducer = None;
    if p.curr().kind == TokenKind::Introducer {
        introducer = Some(p.curr().clone());
        p.advance();
    }

    let value = if p.curr().kind == TokenKind::String {
        let token = p.curr().clone();
        p.advance();
        Some(string_literal(p, introducer, token))
    } else if let Some(intro) = introducer {
        p.next_token_error("Expected string after introducer");
        Some(StringLiteral {
            span: p.span(intro.start, intro.end),
            kind: StringKind::Plain,
            introducer: Some(intro),
            token: None,
            contents: String::new(),
        })
    } else {
        let at = p.curr().start;
        p.problems
            .push(Problem::error(at, at + 1, "Expected TimeDate String"));
        None
    };

    let end = value.as_ref().map_or(keyword.end, |v| v.span.end);
    ExprNode::TimeDate(TimeDateLiteral {
        span: p.span(keyword.start, end),
        kind,
        keyword,
        value,
    })
}

/// `<qualifier>.<field>`: the right side must be a non-reserved identifier;
/// keyword identifiers warn.
fn dereference(p: &mut Parser) -> ExprNode {
    let qualifier = p.curr().clone();
    p.advance();
    let dot = p.curr().clone();
    p.advance();

    let next = p.curr().clone();
    let field = if next.is_identifier() {
        if next.kind == TokenKind::RegularIdentifier {
            if next.is_reserved {
                p.problems.push(Problem::error(
                    next.start,
                    next.end,
                    format!("Invalid identifier, '{}' is a reserved keyword", next.text),
                ));
            } else if next.is_keyword {
                p.problems.push(Problem::warning(
                    next.start,
                    next.end,
                    format!(
                        "'{}' is a keyword and may become reserved in the future, consider changing it, or surrounding it with double quotes",
                        next.text
                    ),
                ));
            }
        }
        p.advance();
        Some(next)
    } else {
        p.next_token_error("Expected identifier, found: '%s'");
        None
    };

    let end = field.as_ref().map_or(dot.end, |f| f.end);
    ExprNode::Dereference(Dereference {
        span: p.span(qualifier.start, end),
        qualifier,
        dot,
        field,
    })
}

/// A parenthesized group: either a nested SELECT or a comma-separated list
/// of value expressions.
pub(crate) struct ParenState {
    start: u32,
    body: Vec<ParenBody>,
}

impl ParenState {
    pub fn begin(p: &mut Parser) -> Self {
        let start = p.curr().start;
        p.advance();
        ParenState {
            start,
            body: Vec::new(),
        }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let t = p.curr().clone();

        if t.kind == TokenKind::RParen {
            p.advance();
            return Ok(Step::Finish(Finished::Paren(Parenthesis {
                span: p.span(self.start, t.end),
                body: mem::take(&mut self.body),
            })));
        }

        if is_end_of_statement(&t, false) {
            p.problems.push(Problem::error(
                self.start,
                t.end,
                "Unterminated Parenthesis",
            ));
            let end = p.token_offset(-1).end;
            return Ok(Step::Finish(Finished::Paren(Parenthesis {
                span: p.span(self.start, end),
                body: mem::take(&mut self.body),
            })));
        }

        if t.kind == TokenKind::Comma {
            p.advance();
            return Ok(Step::Push(State::Expr(ExprState::new())));
        }

        if !self.body.is_empty() {
            p.next_token_error("Unknown Token: '%s'");
            p.advance();
            return Ok(Step::Continue);
        }

        if t.kind == TokenKind::RegularIdentifier && t.text_is("SELECT") {
            return Ok(Step::Push(State::Select(SelectState::begin(p, true))));
        }

        Ok(Step::Push(State::Expr(ExprState::new())))
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        match node {
            Finished::Expr(expr) => self.body.push(ParenBody::Expr(expr)),
            Finished::Statement(crate::ast::Statement::Select(select)) => {
                self.body.push(ParenBody::Select(select))
            }
            _ => {}
        }
        None
    }
}

/// `<name>(<arg>, ...)` function call; arguments are value expressions.
pub(crate) struct FunctionState {
    start: u32,
    name: Token,
    args: Vec<ExprNode>,
    started: bool,
}

impl FunctionState {
    pub fn begin(p: &mut Parser) -> Self {
        let name = p.curr().clone();
        p.advance();
        // opening paren, validated by the caller's lookahead
        p.advance();
        FunctionState {
            start: name.start,
            name,
            args: Vec::new(),
            started: false,
        }
    }

    fn finish(&mut self, p: &Parser, end: u32) -> Step {
        Step::Finish(Finished::Expr(ExprNode::Function(FunctionCall {
            span: p.span(self.start, end),
            name: self.name.clone(),
            args: mem::take(&mut self.args),
        })))
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let t = p.curr().clone();

        if t.kind == TokenKind::RParen {
            p.advance();
            return Ok(self.finish(p, t.end));
        }

        if is_end_of_statement(&t, false) {
            p.problems.push(Problem::error(
                self.start,
                t.end,
                "Unterminated Parenthesis",
            ));
            let end = p.token_offset(-1).end;
            return Ok(self.finish(p, end));
        }

        if t.kind == TokenKind::Comma {
            p.advance();
            self.started = true;
            return Ok(Step::Push(State::Expr(ExprState::new())));
        }

        if !self.started {
            self.started = true;
            return Ok(Step::Push(State::Expr(ExprState::new())));
        }

        p.next_token_error("Unknown Token: '%s'");
        p.advance();
        Ok(Step::Continue)
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        if let Finished::Expr(arg) = node {
            self.args.push(arg);
        }
        None
    }
}

/// One output column: `<qualifier>.*` (via two-token lookahead) or a value
/// expression with an optional alias.
pub(crate) struct ColumnState {
    start: u32,
    inside_paren: bool,
    expression: Option<ColumnExpr>,
    alias: Option<Token>,
}

impl ColumnState {
    pub fn new(p: &Parser, inside_paren: bool) -> Self {
        ColumnState {
            start: p.curr().start,
            inside_paren,
            expression: None,
            alias: None,
        }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let t = p.curr().clone();
        let is_comma = t.kind == TokenKind::Comma;

        if is_end_of_statement(&t, self.inside_paren)
            || (t.kind == TokenKind::RegularIdentifier && t.text_is("FROM"))
            || is_comma
        {
            if is_comma {
                p.advance();
            }
            let end = p.token_offset(-1).end.max(self.start);
            if self.expression.is_none() {
                p.problems
                    .push(Problem::error(self.start, end, "Empty Column Expression"));
            }
            return Ok(Step::Finish(Finished::Column {
                column: OutputColumn {
                    span: p.span(self.start, end),
                    expression: self.expression.take(),
                    alias: self.alias.take(),
                },
                trailing_comma: is_comma,
            }));
        }

        if self.expression.is_some() {
            if self.alias.is_none() {
                if let Some(alias) = parse_alias(p) {
                    self.alias = Some(alias);
                    return Ok(Step::Continue);
                }
            }
            return Err(TokenError::unexpected(t));
        }

        if t.is_identifier()
            && p.token_offset(1).kind == TokenKind::Dot
            && p.token_offset(2).kind == TokenKind::Asterisk
        {
            return Ok(Step::Push(State::QualifiedStar(QualifiedStarState::new(
                t.start,
            ))));
        }

        Ok(Step::Push(State::Expr(ExprState::new())))
    }

    pub fn accept(&mut self, node: Finished) -> Option<State> {
        match node {
            Finished::Expr(expr) => self.expression = Some(ColumnExpr::Expr(expr)),
            Finished::QualifiedStar(star) => {
                self.expression = Some(ColumnExpr::QualifiedStar(star))
            }
            _ => {}
        }
        None
    }
}

/// `<qualifier>.*` recognized by the column state's lookahead.
pub(crate) struct QualifiedStarState {
    start: u32,
}

impl QualifiedStarState {
    pub fn new(start: u32) -> Self {
        QualifiedStarState { start }
    }

    pub fn step(&mut self, p: &mut Parser) -> Result<Step, TokenError> {
        let qualifier = p.curr().clone();
        p.advance();
        let dot = p.curr().clone();
        p.advance();

        let next = p.curr().clone();
        let (asterisk, end) = if next.kind == TokenKind::Asterisk {
            p.advance();
            let end = next.end;
            (Some(next), end)
        } else {
            p.problems.push(Problem::error(
                next.start,
                next.end,
                format!("Expected asterisk found {}", next.text),
            ));
            (None, dot.end)
        };

        Ok(Step::Finish(Finished::QualifiedStar(IdentifierStar {
            span: p.span(self.start, end),
            qualifier,
            dot,
            asterisk,
        })))
    }
}
