//! Completion-context tests: table names and aliases in scope at a cursor

use fbsql::completion::{complete, CompletionItem, CompletionItemKind};

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

#[test]
fn tables_and_aliases_from_from_and_joins() {
    let input = "SELECT  FROM customers c JOIN orders o ON c.id = o.cid";
    let analysis = fbsql::analyze(input);
    let items = complete(&analysis, 7);
    let found = labels(&items);
    for expected in ["customers", "c", "orders", "o"] {
        assert!(found.contains(&expected), "missing {} in {:?}", expected, found);
    }
}

#[test]
fn alias_and_table_kinds_are_distinguished() {
    let input = "SELECT  FROM customers c";
    let analysis = fbsql::analyze(input);
    let items = complete(&analysis, 7);
    assert!(items
        .iter()
        .any(|i| i.label == "c" && i.kind == CompletionItemKind::Alias));
    assert!(items
        .iter()
        .any(|i| i.label == "customers" && i.kind == CompletionItemKind::Table));
}

#[test]
fn cursor_inside_where_sees_from_tables() {
    let input = "SELECT a FROM t WHERE x = 1";
    let analysis = fbsql::analyze(input);
    let cursor = input.find('x').unwrap() as u32 + 1;
    let items = complete(&analysis, cursor);
    assert!(labels(&items).contains(&"t"));
}

#[test]
fn cursor_inside_subquery_sees_both_scopes() {
    let input = "SELECT a FROM (SELECT b FROM inner_t) outer_a WHERE c";
    let analysis = fbsql::analyze(input);
    let cursor = input.find('b').unwrap() as u32 + 1;
    let items = complete(&analysis, cursor);
    let found = labels(&items);
    assert!(found.contains(&"inner_t"), "missing inner_t in {:?}", found);
    assert!(found.contains(&"outer_a"), "missing outer_a in {:?}", found);
}

#[test]
fn derived_table_contributes_alias_only() {
    let input = "SELECT  FROM (SELECT a FROM t) d";
    let analysis = fbsql::analyze(input);
    let items = complete(&analysis, 7);
    assert!(items
        .iter()
        .any(|i| i.label == "d" && i.kind == CompletionItemKind::Alias));
    // The derived table itself has no table name to offer at the top level.
    assert!(!items.iter().any(|i| i.label == "t"));
}

#[test]
fn empty_document_has_no_candidates() {
    let analysis = fbsql::analyze("");
    assert!(complete(&analysis, 0).is_empty());
}

#[test]
fn cursor_past_last_statement_uses_it() {
    let input = "SELECT a FROM t";
    let analysis = fbsql::analyze(input);
    let items = complete(&analysis, input.len() as u32 + 10);
    assert!(labels(&items).contains(&"t"));
}
