//! Error handling and diagnostic rendering tests for fbsql

use fbsql::error::{offset_to_line_col, render_problem};
use fbsql::{Problem, Severity};

mod diagnostics {
    use super::*;

    #[test]
    fn unterminated_string_spans_to_end_of_source() {
        let input = "SELECT 'abc FROM t;";
        let analysis = fbsql::analyze(input);
        let unterminated: Vec<&Problem> = analysis
            .problems
            .iter()
            .filter(|p| p.message == "Unterminated String Literal")
            .collect();
        assert_eq!(unterminated.len(), 1);
        assert_eq!(unterminated[0].start, 7);
        assert_eq!(unterminated[0].end, input.len() as u32);
        // Lexing and parsing both terminated.
        assert!(!analysis.statements.is_empty());
    }

    #[test]
    fn unclosed_parenthesis_in_expression() {
        let analysis = fbsql::analyze("SELECT (a + b FROM t");
        assert!(analysis
            .problems
            .iter()
            .any(|p| p.message == "Unterminated Parenthesis"));
    }

    #[test]
    fn problems_default_to_error_severity() {
        let analysis = fbsql::analyze("SELECT 1;");
        assert_eq!(analysis.problems[0].severity, Severity::Error);
    }

    #[test]
    fn structural_error_keeps_earlier_statements() {
        // The first statement completes; the LATERAL failure halts the rest.
        let analysis = fbsql::analyze("SELECT a FROM t; SELECT b FROM LATERAL x; SELECT c FROM u;");
        assert!(analysis
            .problems
            .iter()
            .any(|p| p.message.contains("not implemented")));
        assert!(analysis
            .statements
            .iter()
            .any(|s| matches!(s, fbsql::ast::Statement::Select(_))));
        // Nothing after the failure point is recovered.
        let selects = analysis
            .statements
            .iter()
            .filter(|s| matches!(s, fbsql::ast::Statement::Select(_)))
            .count();
        assert_eq!(selects, 1);
    }

    #[test]
    fn severity_numbering_matches_editor_protocol() {
        assert_eq!(Severity::Error as i32, 1);
        assert_eq!(Severity::Warning as i32, 2);
        assert_eq!(Severity::Information as i32, 3);
        assert_eq!(Severity::Hint as i32, 4);
    }
}

mod rendering {
    use super::*;

    #[test]
    fn renders_file_line_col_and_underline() {
        let source = "SELECT a FROM t AS select";
        let problem = Problem::error(19, 25, "Invalid alias, 'select' is a reserved keyword");
        let rendered = render_problem("query.sql", source, &problem);
        assert!(rendered.contains("query.sql:1:20"));
        assert!(rendered.contains("Invalid alias"));
        assert!(rendered.contains("^^^^^^"));
        assert!(rendered.contains("SELECT a FROM t AS select"));
    }

    #[test]
    fn renders_position_on_later_line() {
        let source = "SELECT a\nFROM t\nWHERE x =";
        let problem = Problem::error(22, 23, "boom");
        let rendered = render_problem("q.sql", source, &problem);
        assert!(rendered.contains("q.sql:3:7"));
        assert!(rendered.contains("WHERE x ="));
    }

    #[test]
    fn offset_mapping_is_one_indexed() {
        assert_eq!(offset_to_line_col("a\nbc", 0), (1, 1));
        assert_eq!(offset_to_line_col("a\nbc", 2), (2, 1));
        assert_eq!(offset_to_line_col("a\nbc", 3), (2, 2));
    }
}

mod cancellation {
    use fbsql::CancelToken;

    #[test]
    fn cancelled_parse_returns_partial_result() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let analysis = fbsql::analyze_with_cancel("SELECT a FROM t;", &cancel);
        assert!(analysis.statements.is_empty());
    }

    #[test]
    fn uncancelled_token_does_not_interfere() {
        let cancel = CancelToken::new();
        let analysis = fbsql::analyze_with_cancel("SELECT a FROM t;", &cancel);
        assert!(!analysis.statements.is_empty());
    }
}
