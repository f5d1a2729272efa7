//! Firebird dialect tables: reserved words, keywords, operators
//!
//! Word lists follow the Firebird 4.0 language reference. Reserved words can
//! never be used unquoted as names; non-reserved keywords are accepted with a
//! warning.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::ast::OperatorToken;
use crate::error::Problem;
use crate::parser::Parser;

/// Binding strength of prefix `+`/`-`; tighter than every binary operator.
pub const UNARY_PRECEDENCE: u8 = 1;

/// Precedence by operator text (uppercased). Larger numbers bind looser and
/// are resolved into the tree first, so the weakest operator becomes the root.
pub fn operator_precedence(op: &str) -> u8 {
    match op {
        "||" => 11,
        "*" | "/" => 22,
        "+" | "-" => 23,
        "IS" => 31,
        "<>" | "!=" | "~=" | "^=" | ">=" | "<=" | "!>" | "~>" | "^>" | "!<" | "~<" | "^<"
        | ">" | "<" | "=" => 32,
        "BETWEEN" | "LIKE" | "CONTAINING" | "SIMILAR" | "STARTING" => 32,
        "NOT" => 41,
        "AND" => 42,
        "OR" => 43,
        _ => 99,
    }
}

/// Single-token operators recognized in operator position.
pub static OPERATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "+", "-", "/", "*", "||", "<>", "!=", "~=", "^=", ">=", "<=", "!>", "~>", "^>", "!<",
        "~<", "^<", ">", "<", "=", "NOT", "AND", "OR",
    ]
    .into_iter()
    .collect()
});

/// Word predicates usable directly as binary operators.
pub static COMPARISON_PREDICATES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["LIKE", "CONTAINING", "BETWEEN"].into_iter().collect());

/// Reserved words that are still valid value-expression operands
/// (literals and context variables).
pub static OPERAND_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "NULL",
        "TRUE",
        "FALSE",
        "UNKNOWN",
        "CURRENT_CONNECTION",
        "CURRENT_DATE",
        "CURRENT_ROLE",
        "CURRENT_TIME",
        "CURRENT_TIMESTAMP",
        "CURRENT_TRANSACTION",
        "CURRENT_USER",
        "LOCALTIME",
        "LOCALTIMESTAMP",
        "USER",
        "VALUE",
        "ROW_COUNT",
        "SQLCODE",
        "SQLSTATE",
        "GDSCODE",
        "RDB$DB_KEY",
        "RDB$ERROR",
        "RDB$RECORD_VERSION",
        "RDB$ROLE_IN_USE",
        "RDB$SYSTEM_PRIVILEGE",
    ]
    .into_iter()
    .collect()
});

/// Match the operator (or multi-word predicate) at the cursor.
///
/// Consumes the operator tokens on success. The multi-word predicates
/// `IS [NOT] DISTINCT FROM`, `STARTING WITH` and `SIMILAR TO` validate their
/// trailing keyword with a soft diagnostic and keep going as if it were
/// present. The `IS` family also absorbs its following word (`NULL`, `TRUE`,
/// …) into the operator token.
pub(crate) fn match_operator(p: &mut Parser) -> Option<OperatorToken> {
    let first = p.curr().text.to_uppercase();
    let start = p.curr().start;

    if first == "IS" {
        p.advance();
        if p.curr().text_is("NOT") {
            p.advance();
        }
        if p.curr().text_is("DISTINCT") {
            p.advance();
            if !p.curr().text_is("FROM") {
                let t = p.curr().clone();
                p.problems.push(Problem::error(
                    t.start,
                    t.end,
                    format!(
                        "Expected 'FROM' in 'IS [NOT] DISTINCT FROM' predicate, found: {}",
                        t.text
                    ),
                ));
                p.retreat();
            }
        }
        let end = p.curr().end;
        p.advance();
        return Some(OperatorToken {
            span: p.span(start, end),
            precedence: operator_precedence("IS"),
            unary: false,
        });
    }

    if first == "STARTING" {
        p.advance();
        if !p.curr().text_is("WITH") {
            let t = p.curr().clone();
            p.problems.push(Problem::error(
                t.start,
                t.end,
                format!("Expected 'WITH' in 'STARTING WITH' predicate, found: {}", t.text),
            ));
            p.retreat();
        }
        let end = p.curr().end;
        p.advance();
        return Some(OperatorToken {
            span: p.span(start, end),
            precedence: operator_precedence("STARTING"),
            unary: false,
        });
    }

    if first == "SIMILAR" {
        p.advance();
        if !p.curr().text_is("TO") {
            let t = p.curr().clone();
            p.problems.push(Problem::error(
                t.start,
                t.end,
                format!("Expected 'TO' in 'SIMILAR TO' predicate, found: {}", t.text),
            ));
            p.retreat();
        }
        let end = p.curr().end;
        p.advance();
        return Some(OperatorToken {
            span: p.span(start, end),
            precedence: operator_precedence("SIMILAR"),
            unary: false,
        });
    }

    if OPERATORS.contains(first.as_str()) || COMPARISON_PREDICATES.contains(first.as_str()) {
        let end = p.curr().end;
        p.advance();
        return Some(OperatorToken {
            span: p.span(start, end),
            precedence: operator_precedence(&first),
            unary: false,
        });
    }

    None
}

/// Words that can never be used unquoted as identifiers.
pub static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ADD", "ADMIN", "ALL", "ALTER", "AND", "ANY", "AS", "AT", "AVG", "BEGIN", "BETWEEN",
        "BIGINT", "BINARY", "BIT_LENGTH", "BLOB", "BOOLEAN", "BOTH", "BY", "CASE", "CAST",
        "CHAR", "CHARACTER", "CHARACTER_LENGTH", "CHAR_LENGTH", "CHECK", "CLOSE", "COLLATE",
        "COLUMN", "COMMENT", "COMMIT", "CONNECT", "CONSTRAINT", "CORR", "COUNT", "COVAR_POP",
        "COVAR_SAMP", "CREATE", "CROSS", "CURRENT", "CURRENT_CONNECTION", "CURRENT_DATE",
        "CURRENT_ROLE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_TRANSACTION",
        "CURRENT_USER", "CURSOR", "DATE", "DAY", "DEC", "DECFLOAT", "DECIMAL", "DECLARE",
        "DEFAULT", "DELETE", "DELETING", "DETERMINISTIC", "DISCONNECT", "DISTINCT", "DOUBLE",
        "DROP", "ELSE", "END", "ESCAPE", "EXECUTE", "EXISTS", "EXTERNAL", "EXTRACT", "FALSE",
        "FETCH", "FILTER", "FLOAT", "FOR", "FOREIGN", "FROM", "FULL", "FUNCTION", "GDSCODE",
        "GLOBAL", "GRANT", "GROUP", "HAVING", "HOUR", "IN", "INDEX", "INNER", "INSENSITIVE",
        "INSERT", "INSERTING", "INT", "INT128", "INTEGER", "INTO", "IS", "JOIN", "LATERAL",
        "LEADING", "LEFT", "LIKE", "LOCAL", "LOCALTIME", "LOCALTIMESTAMP", "LONG", "LOWER",
        "MAX", "MERGE", "MIN", "MINUTE", "MONTH", "NATIONAL", "NATURAL", "NCHAR", "NO", "NOT",
        "NULL", "NUMERIC", "OCTET_LENGTH", "OF", "OFFSET", "ON", "ONLY", "OPEN", "OR", "ORDER",
        "OUTER", "OVER", "PARAMETER", "PLAN", "POSITION", "POST_EVENT", "PRECISION", "PRIMARY",
        "PROCEDURE", "PUBLICATION", "RDB$DB_KEY", "RDB$ERROR", "RDB$GET_CONTEXT",
        "RDB$GET_TRANSACTION_CN", "RDB$RECORD_VERSION", "RDB$ROLE_IN_USE", "RDB$SET_CONTEXT",
        "RDB$SYSTEM_PRIVILEGE", "REAL", "RECORD_VERSION", "RECREATE", "RECURSIVE",
        "REFERENCES", "REGR_AVGX", "REGR_AVGY", "REGR_COUNT", "REGR_INTERCEPT", "REGR_R2",
        "REGR_SLOPE", "REGR_SXX", "REGR_SXY", "REGR_SYY", "RELEASE", "RESETTING", "RETURN",
        "RETURNING_VALUES", "RETURNS", "REVOKE", "RIGHT", "ROLLBACK", "ROW", "ROWS",
        "ROW_COUNT", "SAVEPOINT", "SCROLL", "SECOND", "SELECT", "SENSITIVE", "SET", "SIMILAR",
        "SMALLINT", "SOME", "SQLCODE", "SQLSTATE", "START", "STDDEV_POP", "STDDEV_SAMP", "SUM",
        "TABLE", "THEN", "TIME", "TIMESTAMP", "TIMEZONE_HOUR", "TIMEZONE_MINUTE", "TO",
        "TRAILING", "TRIGGER", "TRIM", "TRUE", "UNBOUNDED", "UNION", "UNIQUE", "UNKNOWN",
        "UPDATE", "UPDATING", "UPPER", "USER", "USING", "VALUE", "VALUES", "VARBINARY",
        "VARCHAR", "VARIABLE", "VARYING", "VAR_POP", "VAR_SAMP", "VIEW", "WHEN", "WHERE",
        "WHILE", "WINDOW", "WITH", "WITHOUT", "YEAR",
    ]
    .into_iter()
    .collect()
});

/// All keywords, reserved or not. Identifiers matching an entry are flagged
/// `is_keyword`; reserved classification is nested under this set.
pub static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ABS", "ABSOLUTE", "ACCENT", "ACOS", "ACOSH", "ACTION", "ACTIVE", "ADD", "ADMIN",
        "AFTER", "ALL", "ALTER", "ALWAYS", "AND", "ANY", "AS", "ASC", "ASCENDING",
        "ASCII_CHAR", "ASCII_VAL", "ASIN", "ASINH", "AT", "ATAN", "ATAN2", "ATANH", "AUTO",
        "AUTONOMOUS", "AVG", "BACKUP", "BASE64_DECODE", "BASE64_ENCODE", "BEFORE", "BEGIN",
        "BETWEEN", "BIGINT", "BINARY", "BIND", "BIN_AND", "BIN_NOT", "BIN_OR", "BIN_SHL",
        "BIN_SHR", "BIN_XOR", "BIT_LENGTH", "BLOB", "BLOCK", "BODY", "BOOLEAN", "BOTH",
        "BREAK", "BY", "CALLER", "CASCADE", "CASE", "CAST", "CEIL", "CEILING", "CHAR",
        "CHARACTER", "CHARACTER_LENGTH", "CHAR_LENGTH", "CHAR_TO_UUID", "CHECK", "CLEAR",
        "CLOSE", "COALESCE", "COLLATE", "COLLATION", "COLUMN", "COMMENT", "COMMIT",
        "COMMITTED", "COMMON", "COMPARE_DECFLOAT", "COMPUTED", "CONDITIONAL", "CONNECT",
        "CONNECTIONS", "CONSISTENCY", "CONSTRAINT", "CONTAINING", "CONTINUE", "CORR", "COS",
        "COSH", "COT", "COUNT", "COUNTER", "COVAR_POP", "COVAR_SAMP", "CREATE", "CROSS",
        "CRYPT_HASH", "CSTRING", "CTR_BIG_ENDIAN", "CTR_LENGTH", "CTR_LITTLE_ENDIAN",
        "CUME_DIST", "CURRENT", "CURRENT_CONNECTION", "CURRENT_DATE", "CURRENT_ROLE",
        "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_TRANSACTION", "CURRENT_USER", "CURSOR",
        "DATA", "DATABASE", "DATE", "DATEADD", "DATEDIFF", "DAY", "DDL", "DEBUG", "DEC",
        "DECFLOAT", "DECIMAL", "DECLARE", "DECODE", "DECRYPT", "DEFAULT", "DEFINER", "DELETE",
        "DELETING", "DENSE_RANK", "DESC", "DESCENDING", "DESCRIPTOR", "DETERMINISTIC",
        "DIFFERENCE", "DISABLE", "DISCONNECT", "DISTINCT", "DO", "DOMAIN", "DOUBLE", "DROP",
        "ELSE", "ENABLE", "ENCRYPT", "END", "ENGINE", "ENTRY_POINT", "ESCAPE", "EXCEPTION",
        "EXCESS", "EXCLUDE", "EXECUTE", "EXISTS", "EXIT", "EXP", "EXTENDED", "EXTERNAL",
        "EXTRACT", "FALSE", "FETCH", "FILE", "FILTER", "FIRST", "FIRSTNAME", "FIRST_DAY",
        "FIRST_VALUE", "FLOAT", "FLOOR", "FOLLOWING", "FOR", "FOREIGN", "FREE_IT", "FROM",
        "FULL", "FUNCTION", "GDSCODE", "GENERATED", "GENERATOR", "GEN_ID", "GEN_UUID",
        "GLOBAL", "GRANT", "GRANTED", "GROUP", "HASH", "HAVING", "HEX_DECODE", "HEX_ENCODE",
        "HOUR", "IDENTITY", "IDLE", "IF", "IGNORE", "IIF", "IN", "INACTIVE", "INCLUDE",
        "INCREMENT", "INDEX", "INNER", "INPUT_TYPE", "INSENSITIVE", "INSERT", "INSERTING",
        "INT", "INT128", "INTEGER", "INTO", "INVOKER", "IS", "ISOLATION", "IV", "JOIN", "KEY",
        "LAG", "LAST", "LASTNAME", "LAST_DAY", "LAST_VALUE", "LATERAL", "LEAD", "LEADING",
        "LEAVE", "LEFT", "LEGACY", "LENGTH", "LEVEL", "LIFETIME", "LIKE", "LIMBO", "LINGER",
        "LIST", "LN", "LOCAL", "LOCALTIME", "LOCALTIMESTAMP", "LOCK", "LOG", "LOG10", "LONG",
        "LOWER", "LPAD", "LPARAM", "MAKE_DBKEY", "MANUAL", "MAPPING", "MATCHED", "MATCHING",
        "MAX", "MAXVALUE", "MERGE", "MESSAGE", "MIDDLENAME", "MILLISECOND", "MIN", "MINUTE",
        "MINVALUE", "MOD", "MODE", "MODULE_NAME", "MONTH", "NAME", "NAMES", "NATIONAL",
        "NATIVE", "NATURAL", "NCHAR", "NEXT", "NO", "NORMALIZE_DECFLOAT", "NOT", "NTH_VALUE",
        "NTILE", "NULL", "NULLIF", "NULLS", "NUMBER", "NUMERIC", "OCTET_LENGTH", "OF",
        "OFFSET", "OLDEST", "ON", "ONLY", "OPEN", "OPTION", "OR", "ORDER", "OS_NAME",
        "OTHERS", "OUTER", "OUTPUT_TYPE", "OVER", "OVERFLOW", "OVERLAY", "OVERRIDING",
        "PACKAGE", "PAD", "PAGE", "PAGES", "PAGE_SIZE", "PARAMETER", "PARTITION", "PASSWORD",
        "PERCENT_RANK", "PI", "PKCS_1_5", "PLACING", "PLAN", "PLUGIN", "POOL", "POSITION",
        "POST_EVENT", "POWER", "PRECEDING", "PRECISION", "PRESERVE", "PRIMARY", "PRIOR",
        "PRIVILEGE", "PRIVILEGES", "PROCEDURE", "PROTECTED", "PUBLICATION", "QUANTIZE",
        "RAND", "RANGE", "RANK", "RDB$DB_KEY", "RDB$ERROR", "RDB$GET_CONTEXT",
        "RDB$GET_TRANSACTION_CN", "RDB$RECORD_VERSION", "RDB$ROLE_IN_USE", "RDB$SET_CONTEXT",
        "RDB$SYSTEM_PRIVILEGE", "READ", "REAL", "RECORD_VERSION", "RECREATE", "RECURSIVE",
        "REFERENCES", "REGR_AVGX", "REGR_AVGY", "REGR_COUNT", "REGR_INTERCEPT", "REGR_R2",
        "REGR_SLOPE", "REGR_SXX", "REGR_SXY", "REGR_SYY", "RELATIVE", "RELEASE", "REPLACE",
        "REQUESTS", "RESERV", "RESERVING", "RESET", "RESETTING", "RESTART", "RESTRICT",
        "RETAIN", "RETURN", "RETURNING", "RETURNING_VALUES", "RETURNS", "REVERSE", "REVOKE",
        "RIGHT", "ROLE", "ROLLBACK", "ROUND", "ROW", "ROWS", "ROW_COUNT", "ROW_NUMBER",
        "RPAD", "RSA_DECRYPT", "RSA_ENCRYPT", "RSA_PRIVATE", "RSA_PUBLIC", "RSA_SIGN_HASH",
        "RSA_VERIFY_HASH", "SALT_LENGTH", "SAVEPOINT", "SCALAR_ARRAY", "SCHEMA", "SCROLL",
        "SECOND", "SECURITY", "SEGMENT", "SELECT", "SENSITIVE", "SEQUENCE", "SERVERWIDE",
        "SESSION", "SET", "SHADOW", "SHARED", "SIGN", "SIGNATURE", "SIMILAR", "SIN",
        "SINGULAR", "SINH", "SIZE", "SKIP", "SMALLINT", "SNAPSHOT", "SOME", "SORT", "SOURCE",
        "SPACE", "SQL", "SQLCODE", "SQLSTATE", "SQRT", "STABILITY", "START", "STARTING",
        "STARTS", "STATEMENT", "STATISTICS", "STDDEV_POP", "STDDEV_SAMP", "SUBSTRING",
        "SUB_TYPE", "SUM", "SUSPEND", "SYSTEM", "TABLE", "TAGS", "TAN", "TANH", "TEMPORARY",
        "THEN", "TIES", "TIME", "TIMEOUT", "TIMESTAMP", "TIMEZONE_HOUR", "TIMEZONE_MINUTE",
        "TO", "TOTALORDER", "TRAILING", "TRANSACTION", "TRAPS", "TRIGGER", "TRIM", "TRUE",
        "TRUNC", "TRUSTED", "TWO_PHASE", "TYPE", "UNBOUNDED", "UNCOMMITTED", "UNDO", "UNION",
        "UNIQUE", "UNKNOWN", "UPDATE", "UPDATING", "UPPER", "USAGE", "USER", "USING",
        "UUID_TO_CHAR", "VALUE", "VALUES", "VARBINARY", "VARCHAR", "VARIABLE", "VARYING",
        "VAR_POP", "VAR_SAMP", "VIEW", "WAIT", "WEEK", "WEEKDAY", "WHEN", "WHERE", "WHILE",
        "WINDOW", "WITH", "WITHOUT", "WORK", "WRITE", "YEAR", "YEARDAY", "ZONE",
    ]
    .into_iter()
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_are_keywords() {
        for word in RESERVED_WORDS.iter() {
            assert!(KEYWORDS.contains(word), "{} missing from KEYWORDS", word);
        }
    }

    #[test]
    fn precedence_ordering() {
        assert!(operator_precedence("*") < operator_precedence("+"));
        assert!(operator_precedence("+") < operator_precedence("="));
        assert!(operator_precedence("=") < operator_precedence("NOT"));
        assert!(operator_precedence("NOT") < operator_precedence("AND"));
        assert!(operator_precedence("AND") < operator_precedence("OR"));
        assert_eq!(operator_precedence("||"), 11);
    }
}
