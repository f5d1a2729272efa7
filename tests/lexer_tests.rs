//! Lexer/Tokenizer tests for fbsql
//!
//! Tests for the Firebird SQL tokenization layer.

use fbsql::parser::lexer::{lex, Token, TokenKind};

/// All produced tokens (parse-relevant, comments, whitespace) merged back
/// into source order.
fn merged(input: &str) -> Vec<Token> {
    let stream = lex(input);
    let mut all: Vec<Token> = stream
        .tokens
        .iter()
        .chain(stream.comments.iter())
        .chain(stream.whitespace.iter())
        .cloned()
        .collect();
    all.sort_by_key(|t| t.start);
    all
}

fn kinds(input: &str) -> Vec<TokenKind> {
    lex(input).tokens.iter().map(|t| t.kind).collect()
}

mod classification {
    use super::*;

    #[test]
    fn reserved_word() {
        let stream = lex("SELECT");
        let t = &stream.tokens[0];
        assert_eq!(t.kind, TokenKind::RegularIdentifier);
        assert!(t.is_keyword);
        assert!(t.is_reserved);
    }

    #[test]
    fn keyword_not_reserved() {
        let stream = lex("rank");
        let t = &stream.tokens[0];
        assert!(t.is_keyword);
        assert!(!t.is_reserved);
    }

    #[test]
    fn plain_identifier() {
        let stream = lex("customers");
        let t = &stream.tokens[0];
        assert!(!t.is_keyword);
        assert!(!t.is_reserved);
    }

    #[test]
    fn classification_is_case_insensitive() {
        for word in ["select", "SELECT", "SeLeCt"] {
            let stream = lex(word);
            assert!(stream.tokens[0].is_reserved, "{} should be reserved", word);
        }
    }

    #[test]
    fn identifier_with_dollar_and_digits() {
        let stream = lex("rdb$foo123");
        assert_eq!(stream.tokens[0].text, "rdb$foo123");
        assert_eq!(stream.tokens[0].kind, TokenKind::RegularIdentifier);
    }
}

mod punctuation_and_operators {
    use super::*;

    #[test]
    fn single_character_tokens() {
        assert_eq!(
            kinds("( ) ; * , ."),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::Asterisk,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn multi_character_operators() {
        let stream = lex("<= >= <> != || ~= ^<");
        let texts: Vec<&str> = stream
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["<=", ">=", "<>", "!=", "||", "~=", "^<"]);
    }

    #[test]
    fn quoted_identifier() {
        let stream = lex("\"Mixed Case\"");
        assert_eq!(stream.tokens[0].kind, TokenKind::NonRegularIdentifier);
        assert_eq!(stream.tokens[0].text, "\"Mixed Case\"");
    }

    #[test]
    fn variable() {
        let stream = lex(":var1");
        assert_eq!(stream.tokens[0].kind, TokenKind::Variable);
        assert_eq!(stream.tokens[0].text, ":var1");
    }

    #[test]
    fn introducer() {
        let stream = lex("_utf8'abc'");
        assert_eq!(stream.tokens[0].kind, TokenKind::Introducer);
        assert_eq!(stream.tokens[0].text, "_utf8");
        assert_eq!(stream.tokens[1].kind, TokenKind::String);
    }
}

mod numbers {
    use super::*;

    #[test]
    fn integer() {
        assert_eq!(kinds("42")[0], TokenKind::Integer);
    }

    #[test]
    fn hex_integer() {
        let stream = lex("0x1F");
        assert_eq!(stream.tokens[0].kind, TokenKind::Integer);
        assert_eq!(stream.tokens[0].text, "0x1F");
    }

    #[test]
    fn fixed_point() {
        assert_eq!(kinds("3.14")[0], TokenKind::FixedPoint);
    }

    #[test]
    fn floating_point() {
        assert_eq!(kinds("3.23e23")[0], TokenKind::FloatingPoint);
        assert_eq!(kinds("12e5")[0], TokenKind::FloatingPoint);
    }

    #[test]
    fn integer_then_identifier() {
        // `12easy` is an integer followed by an identifier, since the
        // exponent form needs a digit after `e`.
        let stream = lex("12easy");
        assert_eq!(stream.tokens[0].kind, TokenKind::Integer);
        assert_eq!(stream.tokens[0].text, "12");
        assert_eq!(stream.tokens[1].kind, TokenKind::RegularIdentifier);
    }
}

mod strings {
    use super::*;

    #[test]
    fn plain_string_with_escaped_quote() {
        let stream = lex("'don''t'");
        assert_eq!(stream.tokens[0].kind, TokenKind::String);
        assert_eq!(stream.tokens[0].text, "'don''t'");
        assert!(stream.problems.is_empty());
    }

    #[test]
    fn quoted_delimiter_string() {
        let stream = lex("q'{hello}'");
        assert_eq!(stream.tokens[0].kind, TokenKind::String);
        assert_eq!(stream.tokens[0].text, "q'{hello}'");
    }

    #[test]
    fn hex_string() {
        let stream = lex("x'48656C6C6F'");
        assert_eq!(stream.tokens[0].kind, TokenKind::String);
        assert_eq!(stream.tokens[0].text, "x'48656C6C6F'");
    }

    #[test]
    fn unterminated_string_reports_and_terminates() {
        let input = "SELECT 'abc FROM t;";
        let stream = lex(input);
        let unterminated: Vec<_> = stream
            .problems
            .iter()
            .filter(|p| p.message == "Unterminated String Literal")
            .collect();
        assert_eq!(unterminated.len(), 1);
        assert_eq!(unterminated[0].start, 7);
        assert_eq!(unterminated[0].end, input.len() as u32);
        assert_eq!(stream.tokens.last().unwrap().kind, TokenKind::Eof);
    }
}

mod comments_and_whitespace {
    use super::*;

    #[test]
    fn comments_kept_separate() {
        let stream = lex("SELECT a -- trailing\nFROM t /* block */");
        assert_eq!(stream.comments.len(), 2);
        assert!(stream
            .tokens
            .iter()
            .all(|t| t.kind != TokenKind::Comment && t.kind != TokenKind::WhiteSpace));
    }

    #[test]
    fn block_comment_spans_lines() {
        let stream = lex("/* a\nb */SELECT");
        assert_eq!(stream.comments[0].text, "/* a\nb */");
        assert_eq!(stream.tokens[0].text, "SELECT");
    }
}

mod total_coverage {
    use super::*;

    const SAMPLE: &str =
        "SELECT a, b -- c\nFROM t /* x */ WHERE a <= 3.14 AND s = 'it''s' OR v = :v;";

    #[test]
    fn concatenation_reproduces_input() {
        let all = merged(SAMPLE);
        let rebuilt: String = all.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, SAMPLE);
    }

    #[test]
    fn spans_are_contiguous() {
        let all = merged(SAMPLE);
        for pair in all.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn ends_with_zero_width_eof() {
        let stream = lex(SAMPLE);
        let eof = stream.tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.start, eof.end);
        assert_eq!(eof.end, SAMPLE.len() as u32);
    }

    #[test]
    fn span_matches_text_length() {
        for t in merged(SAMPLE) {
            assert_eq!(t.end - t.start, t.text.len() as u32);
        }
    }

    #[test]
    fn unknown_character_is_absorbed() {
        let input = "SELECT # FROM t";
        let stream = lex(input);
        assert!(stream
            .problems
            .iter()
            .any(|p| p.message.contains("Unknown character")));
        let all = merged(input);
        let rebuilt: String = all.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, input);
    }
}
