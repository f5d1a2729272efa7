//! Syntax tree node definitions for Firebird SQL statements
//!
//! Every node embeds a [`Span`] holding its half-open byte range and the
//! covered source text, so editor tooling can map nodes back to positions.

use crate::parser::lexer::Token;

/// A half-open byte range into the analyzed source plus the covered text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl Span {
    /// Build a span over `start..end`, capturing the source slice.
    pub fn slice(source: &str, start: u32, end: u32) -> Self {
        let text = source
            .get(start as usize..end as usize)
            .unwrap_or("")
            .to_string();
        Span { start, end, text }
    }

    /// A zero-width span anchored at `at`.
    pub fn empty(at: u32) -> Self {
        Span {
            start: at,
            end: at,
            text: String::new(),
        }
    }
}

/// Anything with a resolved source position.
pub trait HasSpan {
    fn start(&self) -> u32;
    fn end(&self) -> u32;

    fn contains(&self, offset: u32) -> bool {
        self.start() < offset && offset <= self.end()
    }
}

impl HasSpan for Span {
    fn start(&self) -> u32 {
        self.start
    }
    fn end(&self) -> u32 {
        self.end
    }
}

impl HasSpan for Token {
    fn start(&self) -> u32 {
        self.start
    }
    fn end(&self) -> u32 {
        self.end
    }
}

/// A complete top-level statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Empty(EmptyStatement),
    Unknown(UnknownStatement),
}

impl HasSpan for Statement {
    fn start(&self) -> u32 {
        match self {
            Statement::Select(s) => s.span.start,
            Statement::Empty(s) => s.span.start,
            Statement::Unknown(s) => s.span.start,
        }
    }
    fn end(&self) -> u32 {
        match self {
            Statement::Select(s) => s.span.end,
            Statement::Empty(s) => s.span.end,
            Statement::Unknown(s) => s.span.end,
        }
    }
}

/// A statement consisting only of a terminator (or end of input)
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStatement {
    pub span: Span,
}

/// An unrecognized statement, recovered by skipping to the next terminator
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownStatement {
    pub span: Span,
    pub tokens: Vec<Token>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub span: Span,
    pub columns: Vec<OutputColumn>,
    pub star: Option<Token>,
    pub first: Option<FirstSkipClause>,
    pub skip: Option<FirstSkipClause>,
    pub from: Option<FromClause>,
    pub where_clause: Option<WhereClause>,
    pub group_by: Option<GroupByClause>,
}

/// A FIRST or SKIP row-limit clause
#[derive(Debug, Clone, PartialEq)]
pub struct FirstSkipClause {
    pub span: Span,
    pub keyword: Token,
    pub argument: Option<FirstSkipArg>,
}

/// Accepted FIRST/SKIP argument shapes
#[derive(Debug, Clone, PartialEq)]
pub enum FirstSkipArg {
    Literal(Token),
    Variable(Token),
    Parenthesized(Parenthesis),
    /// An unexpected token recorded for recovery; not consumed by the clause.
    Invalid(Token),
}

/// A single output column: `<qualifier>.*` or a value expression with alias
#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    pub span: Span,
    pub expression: Option<ColumnExpr>,
    pub alias: Option<Token>,
}

/// The expression part of an output column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnExpr {
    Expr(ExprNode),
    QualifiedStar(IdentifierStar),
}

/// `<qualifier>.*` in a column list
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierStar {
    pub span: Span,
    pub qualifier: Token,
    pub dot: Token,
    pub asterisk: Option<Token>,
}

/// FROM clause: a table source plus any joins
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub span: Span,
    pub source: Option<TableReference>,
    pub joins: Vec<JoinClause>,
}

/// A single JOIN
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub span: Span,
    pub join_type: JoinType,
    pub source: Option<TableReference>,
    pub condition: Option<JoinCondition>,
}

/// JOIN types (bare `JOIN` and bare `OUTER` default to LEFT)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Natural,
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_uppercase().as_str() {
            "NATURAL" => Some(JoinType::Natural),
            "INNER" => Some(JoinType::Inner),
            "LEFT" => Some(JoinType::Left),
            "RIGHT" => Some(JoinType::Right),
            "FULL" => Some(JoinType::Full),
            _ => None,
        }
    }
}

/// The mandatory join condition: `ON <expr>` or `USING (<columns>)`
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    On(ExprNode),
    Using(JoinColumnList),
}

impl HasSpan for JoinCondition {
    fn start(&self) -> u32 {
        match self {
            JoinCondition::On(e) => e.start(),
            JoinCondition::Using(c) => c.span.start,
        }
    }
    fn end(&self) -> u32 {
        match self {
            JoinCondition::On(e) => e.end(),
            JoinCondition::Using(c) => c.span.end,
        }
    }
}

/// Column list of a `USING` join condition
#[derive(Debug, Clone, PartialEq)]
pub struct JoinColumnList {
    pub span: Span,
    pub columns: Vec<Token>,
}

/// WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub span: Span,
    pub condition: ExprNode,
}

/// GROUP BY clause with optional HAVING
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByClause {
    pub span: Span,
    pub columns: Vec<ExprNode>,
    pub having: Option<HavingClause>,
}

/// HAVING clause
#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    pub span: Span,
    pub condition: ExprNode,
}

/// A table reference in FROM or JOIN position
#[derive(Debug, Clone, PartialEq)]
pub enum TableReference {
    Table(BaseTable),
    Derived(DerivedTable),
    Unknown(BaseTable),
}

impl TableReference {
    pub fn alias(&self) -> Option<&Token> {
        match self {
            TableReference::Table(t) | TableReference::Unknown(t) => t.alias.as_ref(),
            TableReference::Derived(t) => t.alias.as_ref(),
        }
    }
}

impl HasSpan for TableReference {
    fn start(&self) -> u32 {
        match self {
            TableReference::Table(t) | TableReference::Unknown(t) => t.span.start,
            TableReference::Derived(t) => t.span.start,
        }
    }
    fn end(&self) -> u32 {
        match self {
            TableReference::Table(t) | TableReference::Unknown(t) => t.span.end,
            TableReference::Derived(t) => t.span.end,
        }
    }
}

/// A plain table name with optional alias
#[derive(Debug, Clone, PartialEq)]
pub struct BaseTable {
    pub span: Span,
    pub identifier: Token,
    pub alias: Option<Token>,
}

/// A parenthesized sub-select used as a FROM source
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    pub span: Span,
    pub paren: Option<Parenthesis>,
    pub alias: Option<Token>,
}

/// A parenthesized group: a sub-select or comma-separated value expressions
#[derive(Debug, Clone, PartialEq)]
pub struct Parenthesis {
    pub span: Span,
    pub body: Vec<ParenBody>,
}

/// One element of a parenthesis body
#[derive(Debug, Clone, PartialEq)]
pub enum ParenBody {
    Expr(ExprNode),
    Select(SelectStatement),
}

/// A resolved value-expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    /// Integer, fixed-point or floating-point literal token
    Literal(Token),
    String(StringLiteral),
    TimeDate(TimeDateLiteral),
    Identifier(Token),
    Variable(Token),
    /// `*` used as an operand, e.g. inside `COUNT(*)`
    Star(Token),
    Dereference(Dereference),
    Function(FunctionCall),
    Parenthesized(Parenthesis),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    /// Placeholder patched in where an operand was required but missing
    Empty(Span),
}

impl HasSpan for ExprNode {
    fn start(&self) -> u32 {
        match self {
            ExprNode::Literal(t)
            | ExprNode::Identifier(t)
            | ExprNode::Variable(t)
            | ExprNode::Star(t) => t.start,
            ExprNode::String(s) => s.span.start,
            ExprNode::TimeDate(t) => t.span.start,
            ExprNode::Dereference(d) => d.span.start,
            ExprNode::Function(f) => f.span.start,
            ExprNode::Parenthesized(p) => p.span.start,
            ExprNode::Binary(b) => b.span.start,
            ExprNode::Unary(u) => u.span.start,
            ExprNode::Empty(s) => s.start,
        }
    }
    fn end(&self) -> u32 {
        match self {
            ExprNode::Literal(t)
            | ExprNode::Identifier(t)
            | ExprNode::Variable(t)
            | ExprNode::Star(t) => t.end,
            ExprNode::String(s) => s.span.end,
            ExprNode::TimeDate(t) => t.span.end,
            ExprNode::Dereference(d) => d.span.end,
            ExprNode::Function(f) => f.span.end,
            ExprNode::Parenthesized(p) => p.span.end,
            ExprNode::Binary(b) => b.span.end,
            ExprNode::Unary(u) => u.span.end,
            ExprNode::Empty(s) => s.start,
        }
    }
}

/// String literal kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    /// `'text'` with `''` as an escaped quote
    Plain,
    /// `q'<open>...<close>'` quoted-delimiter string
    Quoted,
    /// `x'48656c6c6f'` hex string
    Hex,
}

/// A string literal, optionally preceded by a charset introducer
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub span: Span,
    pub kind: StringKind,
    pub introducer: Option<Token>,
    /// Missing when an introducer was not followed by a string.
    pub token: Option<Token>,
    pub contents: String,
}

/// Date/time/timestamp literal kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDateKind {
    Date,
    Time,
    Timestamp,
}

/// `DATE '...'`, `TIME '...'` or `TIMESTAMP '...'`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDateLiteral {
    pub span: Span,
    pub kind: TimeDateKind,
    pub keyword: Token,
    pub value: Option<StringLiteral>,
}

/// `<qualifier>.<field>` column dereference
#[derive(Debug, Clone, PartialEq)]
pub struct Dereference {
    pub span: Span,
    pub qualifier: Token,
    pub dot: Token,
    pub field: Option<Token>,
}

/// `<name>(<arg>, ...)` function call
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub span: Span,
    pub name: Token,
    pub args: Vec<ExprNode>,
}

/// An operator occurrence with its binding strength
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorToken {
    pub span: Span,
    pub precedence: u8,
    pub unary: bool,
}

/// A binary operator application
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub span: Span,
    pub op: OperatorToken,
    pub left: Box<ExprNode>,
    pub right: Box<ExprNode>,
}

/// A unary operator application (prefix `+`/`-`/`NOT`, postfix `IS ...`)
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub span: Span,
    pub op: OperatorToken,
    pub operand: Box<ExprNode>,
    pub postfix: bool,
}

/// A borrowed reference to any node or token in the tree.
///
/// The completion walker descends through these instead of reflecting over
/// node fields; `children` enumerates every span-carrying child in field
/// order.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Token(&'a Token),
    Statement(&'a Statement),
    Select(&'a SelectStatement),
    Column(&'a OutputColumn),
    QualifiedStar(&'a IdentifierStar),
    FirstSkip(&'a FirstSkipClause),
    From(&'a FromClause),
    Join(&'a JoinClause),
    JoinColumns(&'a JoinColumnList),
    Where(&'a WhereClause),
    GroupBy(&'a GroupByClause),
    Having(&'a HavingClause),
    Table(&'a TableReference),
    Paren(&'a Parenthesis),
    Expr(&'a ExprNode),
    StringLit(&'a StringLiteral),
    TimeDate(&'a TimeDateLiteral),
}

impl<'a> NodeRef<'a> {
    pub fn for_statement(statement: &'a Statement) -> NodeRef<'a> {
        match statement {
            Statement::Select(s) => NodeRef::Select(s),
            _ => NodeRef::Statement(statement),
        }
    }

    pub fn span(&self) -> (u32, u32) {
        match self {
            NodeRef::Token(t) => (t.start, t.end),
            NodeRef::Statement(s) => (s.start(), s.end()),
            NodeRef::Select(s) => (s.span.start, s.span.end),
            NodeRef::Column(c) => (c.span.start, c.span.end),
            NodeRef::QualifiedStar(q) => (q.span.start, q.span.end),
            NodeRef::FirstSkip(f) => (f.span.start, f.span.end),
            NodeRef::From(f) => (f.span.start, f.span.end),
            NodeRef::Join(j) => (j.span.start, j.span.end),
            NodeRef::JoinColumns(c) => (c.span.start, c.span.end),
            NodeRef::Where(w) => (w.span.start, w.span.end),
            NodeRef::GroupBy(g) => (g.span.start, g.span.end),
            NodeRef::Having(h) => (h.span.start, h.span.end),
            NodeRef::Table(t) => (t.start(), t.end()),
            NodeRef::Paren(p) => (p.span.start, p.span.end),
            NodeRef::Expr(e) => (e.start(), e.end()),
            NodeRef::StringLit(s) => (s.span.start, s.span.end),
            NodeRef::TimeDate(t) => (t.span.start, t.span.end),
        }
    }

    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        match self {
            NodeRef::Token(_) => {}
            NodeRef::Statement(s) => match s {
                Statement::Select(sel) => out.push(NodeRef::Select(sel)),
                Statement::Empty(_) => {}
                Statement::Unknown(u) => out.extend(u.tokens.iter().map(NodeRef::Token)),
            },
            NodeRef::Select(s) => {
                if let Some(first) = &s.first {
                    out.push(NodeRef::FirstSkip(first));
                }
                if let Some(skip) = &s.skip {
                    out.push(NodeRef::FirstSkip(skip));
                }
                out.extend(s.columns.iter().map(NodeRef::Column));
                if let Some(star) = &s.star {
                    out.push(NodeRef::Token(star));
                }
                if let Some(from) = &s.from {
                    out.push(NodeRef::From(from));
                }
                if let Some(where_clause) = &s.where_clause {
                    out.push(NodeRef::Where(where_clause));
                }
                if let Some(group_by) = &s.group_by {
                    out.push(NodeRef::GroupBy(group_by));
                }
            }
            NodeRef::Column(c) => {
                match &c.expression {
                    Some(ColumnExpr::Expr(e)) => out.push(NodeRef::Expr(e)),
                    Some(ColumnExpr::QualifiedStar(q)) => out.push(NodeRef::QualifiedStar(q)),
                    None => {}
                }
                if let Some(alias) = &c.alias {
                    out.push(NodeRef::Token(alias));
                }
            }
            NodeRef::QualifiedStar(q) => {
                out.push(NodeRef::Token(&q.qualifier));
                out.push(NodeRef::Token(&q.dot));
                if let Some(star) = &q.asterisk {
                    out.push(NodeRef::Token(star));
                }
            }
            NodeRef::FirstSkip(f) => {
                out.push(NodeRef::Token(&f.keyword));
                match &f.argument {
                    Some(FirstSkipArg::Literal(t))
                    | Some(FirstSkipArg::Variable(t))
                    | Some(FirstSkipArg::Invalid(t)) => out.push(NodeRef::Token(t)),
                    Some(FirstSkipArg::Parenthesized(p)) => out.push(NodeRef::Paren(p)),
                    None => {}
                }
            }
            NodeRef::From(f) => {
                if let Some(source) = &f.source {
                    out.push(NodeRef::Table(source));
                }
                out.extend(f.joins.iter().map(NodeRef::Join));
            }
            NodeRef::Join(j) => {
                if let Some(source) = &j.source {
                    out.push(NodeRef::Table(source));
                }
                match &j.condition {
                    Some(JoinCondition::On(e)) => out.push(NodeRef::Expr(e)),
                    Some(JoinCondition::Using(c)) => out.push(NodeRef::JoinColumns(c)),
                    None => {}
                }
            }
            NodeRef::JoinColumns(c) => out.extend(c.columns.iter().map(NodeRef::Token)),
            NodeRef::Where(w) => out.push(NodeRef::Expr(&w.condition)),
            NodeRef::GroupBy(g) => {
                out.extend(g.columns.iter().map(NodeRef::Expr));
                if let Some(having) = &g.having {
                    out.push(NodeRef::Having(having));
                }
            }
            NodeRef::Having(h) => out.push(NodeRef::Expr(&h.condition)),
            NodeRef::Table(t) => match t {
                TableReference::Table(b) | TableReference::Unknown(b) => {
                    out.push(NodeRef::Token(&b.identifier));
                    if let Some(alias) = &b.alias {
                        out.push(NodeRef::Token(alias));
                    }
                }
                TableReference::Derived(d) => {
                    if let Some(paren) = &d.paren {
                        out.push(NodeRef::Paren(paren));
                    }
                    if let Some(alias) = &d.alias {
                        out.push(NodeRef::Token(alias));
                    }
                }
            },
            NodeRef::Paren(p) => {
                for body in &p.body {
                    match body {
                        ParenBody::Expr(e) => out.push(NodeRef::Expr(e)),
                        ParenBody::Select(s) => out.push(NodeRef::Select(s)),
                    }
                }
            }
            NodeRef::Expr(e) => match e {
                ExprNode::Literal(t)
                | ExprNode::Identifier(t)
                | ExprNode::Variable(t)
                | ExprNode::Star(t) => out.push(NodeRef::Token(t)),
                ExprNode::String(s) => out.push(NodeRef::StringLit(s)),
                ExprNode::TimeDate(t) => out.push(NodeRef::TimeDate(t)),
                ExprNode::Dereference(d) => {
                    out.push(NodeRef::Token(&d.qualifier));
                    if let Some(field) = &d.field {
                        out.push(NodeRef::Token(field));
                    }
                }
                ExprNode::Function(f) => {
                    out.push(NodeRef::Token(&f.name));
                    out.extend(f.args.iter().map(NodeRef::Expr));
                }
                ExprNode::Parenthesized(p) => out.push(NodeRef::Paren(p)),
                ExprNode::Binary(b) => {
                    out.push(NodeRef::Expr(&b.left));
                    out.push(NodeRef::Expr(&b.right));
                }
                ExprNode::Unary(u) => out.push(NodeRef::Expr(&u.operand)),
                ExprNode::Empty(_) => {}
            },
            NodeRef::StringLit(s) => {
                if let Some(intro) = &s.introducer {
                    out.push(NodeRef::Token(intro));
                }
                if let Some(token) = &s.token {
                    out.push(NodeRef::Token(token));
                }
            }
            NodeRef::TimeDate(t) => {
                out.push(NodeRef::Token(&t.keyword));
                if let Some(value) = &t.value {
                    out.push(NodeRef::StringLit(value));
                }
            }
        }
        out
    }
}
