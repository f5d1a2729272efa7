//! Value-expression resolver tests
//!
//! Verify operator precedence, unary handling, multi-word predicates,
//! literals, function calls and parenthesized sub-expressions.

use fbsql::ast::*;
use fbsql::parser::Analysis;

fn analyze(input: &str) -> Analysis {
    fbsql::analyze(input)
}

fn assert_clean(analysis: &Analysis) {
    assert!(
        analysis.problems.is_empty(),
        "unexpected problems: {:?}",
        analysis.problems
    );
}

fn only_select(analysis: &Analysis) -> &SelectStatement {
    for statement in &analysis.statements {
        if let Statement::Select(select) = statement {
            return select;
        }
    }
    panic!("no SELECT statement in {:?}", analysis.statements);
}

/// Condition of the WHERE clause of `SELECT x FROM t WHERE <input>`.
fn where_condition(input: &str) -> (Analysis, ExprNode) {
    let analysis = analyze(&format!("SELECT x FROM t WHERE {}", input));
    let condition = only_select(&analysis)
        .where_clause
        .as_ref()
        .expect("WHERE clause")
        .condition
        .clone();
    (analysis, condition)
}

/// Expression of the first output column of `SELECT <input> FROM t`.
fn column_expr(input: &str) -> (Analysis, ExprNode) {
    let analysis = analyze(&format!("SELECT {} FROM t", input));
    let expr = match only_select(&analysis).columns[0]
        .expression
        .as_ref()
        .expect("column expression")
    {
        ColumnExpr::Expr(e) => e.clone(),
        other => panic!("expected expression, got {:?}", other),
    };
    (analysis, expr)
}

fn as_binary(node: &ExprNode) -> &BinaryExpr {
    match node {
        ExprNode::Binary(b) => b,
        other => panic!("expected binary expression, got {:?}", other),
    }
}

mod precedence {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let (analysis, condition) = where_condition("1 + 2 * 3");
        assert_clean(&analysis);
        let root = as_binary(&condition);
        assert_eq!(root.op.span.text, "+");
        let right = as_binary(&root.right);
        assert_eq!(right.op.span.text, "*");
    }

    #[test]
    fn comparison_binds_looser_than_concatenation() {
        let (analysis, condition) = where_condition("a || b = c");
        assert_clean(&analysis);
        let root = as_binary(&condition);
        assert_eq!(root.op.span.text, "=");
        assert_eq!(as_binary(&root.left).op.span.text, "||");
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let (analysis, condition) = where_condition("a AND b OR c");
        assert_clean(&analysis);
        let root = as_binary(&condition);
        assert_eq!(root.op.span.text.to_uppercase(), "OR");
        assert_eq!(as_binary(&root.left).op.span.text.to_uppercase(), "AND");
    }

    #[test]
    fn equal_precedence_splits_at_leftmost() {
        let (analysis, condition) = where_condition("a OR b OR c");
        assert_clean(&analysis);
        let root = as_binary(&condition);
        assert!(matches!(*root.left, ExprNode::Identifier(_)));
        assert_eq!(as_binary(&root.right).op.span.text.to_uppercase(), "OR");
    }
}

mod unary {
    use super::*;

    #[test]
    fn prefix_minus_binds_tightest() {
        let (analysis, condition) = where_condition("-a * b");
        assert_clean(&analysis);
        let root = as_binary(&condition);
        assert_eq!(root.op.span.text, "*");
        match &*root.left {
            ExprNode::Unary(unary) => {
                assert_eq!(unary.op.span.text, "-");
                assert!(!unary.postfix);
            }
            other => panic!("expected unary minus, got {:?}", other),
        }
    }

    #[test]
    fn negative_literal_column() {
        let (analysis, expr) = column_expr("-5");
        assert_clean(&analysis);
        match expr {
            ExprNode::Unary(unary) => {
                assert!(unary.op.unary);
                assert!(matches!(*unary.operand, ExprNode::Literal(_)));
            }
            other => panic!("expected unary expression, got {:?}", other),
        }
    }

    #[test]
    fn not_is_prefix() {
        let (analysis, condition) = where_condition("NOT a AND b");
        assert_clean(&analysis);
        let root = as_binary(&condition);
        assert_eq!(root.op.span.text.to_uppercase(), "AND");
        match &*root.left {
            ExprNode::Unary(unary) => assert_eq!(unary.op.span.text.to_uppercase(), "NOT"),
            other => panic!("expected NOT, got {:?}", other),
        }
    }
}

mod predicates {
    use super::*;

    #[test]
    fn is_null_is_a_complete_postfix_predicate() {
        let (analysis, condition) = where_condition("a IS NULL");
        assert_clean(&analysis);
        match condition {
            ExprNode::Unary(unary) => {
                assert!(unary.postfix);
                assert_eq!(unary.op.span.text.to_uppercase(), "IS NULL");
                assert!(matches!(*unary.operand, ExprNode::Identifier(_)));
            }
            other => panic!("expected postfix predicate, got {:?}", other),
        }
    }

    #[test]
    fn is_not_null() {
        let (analysis, condition) = where_condition("a IS NOT NULL");
        assert_clean(&analysis);
        match condition {
            ExprNode::Unary(unary) => {
                assert_eq!(unary.op.span.text.to_uppercase(), "IS NOT NULL");
            }
            other => panic!("expected postfix predicate, got {:?}", other),
        }
    }

    #[test]
    fn is_distinct_from() {
        let (analysis, condition) = where_condition("a IS DISTINCT FROM b");
        assert_clean(&analysis);
        let root = as_binary(&condition);
        assert_eq!(root.op.span.text.to_uppercase(), "IS DISTINCT FROM");
        assert!(matches!(*root.right, ExprNode::Identifier(_)));
    }

    #[test]
    fn is_distinct_missing_from_recovers() {
        let (analysis, condition) = where_condition("a IS DISTINCT b");
        assert!(analysis
            .problems
            .iter()
            .any(|p| p.message.contains("Expected 'FROM'")));
        assert!(matches!(condition, ExprNode::Binary(_)));
    }

    #[test]
    fn starting_with() {
        let (analysis, condition) = where_condition("a STARTING WITH 'x'");
        assert_clean(&analysis);
        let root = as_binary(&condition);
        assert_eq!(root.op.span.text.to_uppercase(), "STARTING WITH");
        assert!(matches!(*root.right, ExprNode::String(_)));
    }

    #[test]
    fn similar_to_missing_to_recovers() {
        let (analysis, condition) = where_condition("a SIMILAR 5");
        assert!(analysis
            .problems
            .iter()
            .any(|p| p.message.contains("Expected 'TO'")));
        assert!(matches!(condition, ExprNode::Binary(_)));
    }

    #[test]
    fn like_predicate() {
        let (analysis, condition) = where_condition("a LIKE 'x%'");
        assert_clean(&analysis);
        assert_eq!(as_binary(&condition).op.span.text.to_uppercase(), "LIKE");
    }

    #[test]
    fn between_resolves_at_and() {
        // BETWEEN and AND split by the precedence table alone: AND is the
        // loosest operator, so it becomes the root.
        let (analysis, condition) = where_condition("a BETWEEN 1 AND 2");
        assert_clean(&analysis);
        let root = as_binary(&condition);
        assert_eq!(root.op.span.text.to_uppercase(), "AND");
        assert_eq!(as_binary(&root.left).op.span.text.to_uppercase(), "BETWEEN");
    }

    #[test]
    fn dangling_operator_is_patched() {
        let (analysis, condition) = where_condition("a +");
        assert!(analysis
            .problems
            .iter()
            .any(|p| p.message == "Expected Expression, found nothing"));
        let root = as_binary(&condition);
        assert!(matches!(*root.right, ExprNode::Empty(_)));
    }
}

mod operands {
    use super::*;

    #[test]
    fn function_call_with_star() {
        let (analysis, expr) = column_expr("COUNT(*)");
        assert_clean(&analysis);
        match expr {
            ExprNode::Function(call) => {
                assert_eq!(call.name.text, "COUNT");
                assert_eq!(call.args.len(), 1);
                assert!(matches!(call.args[0], ExprNode::Star(_)));
            }
            other => panic!("expected function call, got {:?}", other),
        }
    }

    #[test]
    fn function_call_with_expression_args() {
        let (analysis, expr) = column_expr("f(a, b + 1)");
        assert_clean(&analysis);
        match expr {
            ExprNode::Function(call) => {
                assert_eq!(call.args.len(), 2);
                assert!(matches!(call.args[1], ExprNode::Binary(_)));
            }
            other => panic!("expected function call, got {:?}", other),
        }
    }

    #[test]
    fn function_arg_garbage_reports_unknown_token() {
        let analysis = analyze("SELECT f(a b) FROM t");
        assert!(analysis
            .problems
            .iter()
            .any(|p| p.message == "Unknown Token: 'b'"));
    }

    #[test]
    fn qualified_column() {
        let (analysis, condition) = where_condition("t.id = 1");
        assert_clean(&analysis);
        match &*as_binary(&condition).left {
            ExprNode::Dereference(deref) => {
                assert_eq!(deref.qualifier.text, "t");
                assert_eq!(deref.field.as_ref().unwrap().text, "id");
            }
            other => panic!("expected dereference, got {:?}", other),
        }
    }

    #[test]
    fn qualified_column_reserved_field() {
        let (analysis, _) = where_condition("t.select = 1");
        assert!(analysis
            .problems
            .iter()
            .any(|p| p.message.contains("is a reserved keyword")));
    }

    #[test]
    fn variable_operand() {
        let (analysis, condition) = where_condition("a = :v");
        assert_clean(&analysis);
        assert!(matches!(*as_binary(&condition).right, ExprNode::Variable(_)));
    }

    #[test]
    fn nested_parentheses() {
        let (analysis, condition) = where_condition("((a))");
        assert_clean(&analysis);
        match condition {
            ExprNode::Parenthesized(outer) => match &outer.body[0] {
                ParenBody::Expr(ExprNode::Parenthesized(inner)) => {
                    assert!(matches!(
                        inner.body[0],
                        ParenBody::Expr(ExprNode::Identifier(_))
                    ));
                }
                other => panic!("expected nested parenthesis, got {:?}", other),
            },
            other => panic!("expected parenthesis, got {:?}", other),
        }
    }

    #[test]
    fn subquery_operand() {
        let (analysis, condition) = where_condition("a = (SELECT b FROM u)");
        assert_clean(&analysis);
        match &*as_binary(&condition).right {
            ExprNode::Parenthesized(paren) => {
                assert!(matches!(paren.body[0], ParenBody::Select(_)));
            }
            other => panic!("expected parenthesized subquery, got {:?}", other),
        }
    }
}

mod literals {
    use super::*;

    #[test]
    fn date_literal() {
        let (analysis, expr) = column_expr("DATE '2024-01-15'");
        assert_clean(&analysis);
        match expr {
            ExprNode::TimeDate(literal) => {
                assert_eq!(literal.kind, TimeDateKind::Date);
                assert_eq!(literal.value.as_ref().unwrap().contents, "2024-01-15");
            }
            other => panic!("expected date literal, got {:?}", other),
        }
    }

    #[test]
    fn timestamp_without_string() {
        let analysis = analyze("SELECT TIMESTAMP FROM t");
        assert!(analysis
            .problems
            .iter()
            .any(|p| p.message == "Expected TimeDate String"));
    }

    #[test]
    fn time_literal() {
        let (analysis, expr) = column_expr("TIME '15:12:56'");
        assert_clean(&analysis);
        assert!(matches!(
            expr,
            ExprNode::TimeDate(TimeDateLiteral {
                kind: TimeDateKind::Time,
                ..
            })
        ));
    }

    #[test]
    fn introduced_string() {
        let (analysis, expr) = column_expr("_utf8'abc'");
        assert_clean(&analysis);
        match expr {
            ExprNode::String(literal) => {
                assert_eq!(literal.introducer.as_ref().unwrap().text, "_utf8");
                assert_eq!(literal.contents, "abc");
            }
            other => panic!("expected string literal, got {:?}", other),
        }
    }

    #[test]
    fn introducer_without_string() {
        let analysis = analyze("SELECT _utf8 a FROM t");
        assert!(analysis
            .problems
            .iter()
            .any(|p| p.message == "Expected string after introducer"));
    }

    #[test]
    fn hex_string_kind() {
        let (analysis, expr) = column_expr("x'48656c6c6f'");
        assert_clean(&analysis);
        match expr {
            ExprNode::String(literal) => {
                assert_eq!(literal.kind, StringKind::Hex);
                assert_eq!(literal.contents, "48656c6c6f");
            }
            other => panic!("expected hex string, got {:?}", other),
        }
    }

    #[test]
    fn quoted_delimiter_string_contents() {
        let (analysis, expr) = column_expr("q'(hello world)'");
        assert_clean(&analysis);
        match expr {
            ExprNode::String(literal) => {
                assert_eq!(literal.kind, StringKind::Quoted);
                assert_eq!(literal.contents, "hello world");
            }
            other => panic!("expected quoted string, got {:?}", other),
        }
    }

    #[test]
    fn string_escape_unescaped_in_contents() {
        let (analysis, expr) = column_expr("'it''s'");
        assert_clean(&analysis);
        match expr {
            ExprNode::String(literal) => assert_eq!(literal.contents, "it's"),
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn empty_column_expression() {
        let analysis = analyze("SELECT a, FROM t");
        assert!(analysis
            .problems
            .iter()
            .any(|p| p.message == "Empty Column Expression"));
        assert_eq!(only_select(&analysis).columns.len(), 2);
    }
}
