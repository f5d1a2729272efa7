//! Cursor-context completion over a finished parse forest
//!
//! Walks from the statement whose span contains the cursor down into the
//! most specific child node, then collects in-scope table names and aliases
//! from the surrounding SELECT's FROM and JOIN sources.

use crate::ast::{NodeRef, Statement, TableReference};
use crate::parser::Analysis;

/// What a completion candidate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionItemKind {
    Table,
    Alias,
}

/// A single completion candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionItemKind,
}

/// Completion candidates for a cursor offset: every table name and alias in
/// scope at that position.
pub fn complete(analysis: &Analysis, cursor: u32) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    for node in context_stack(&analysis.statements, cursor) {
        if let NodeRef::Select(select) = node {
            if let Some(from) = &select.from {
                if let Some(source) = &from.source {
                    push_source(&mut items, source);
                }
                for join in &from.joins {
                    if let Some(source) = &join.source {
                        push_source(&mut items, source);
                    }
                }
            }
        }
    }
    items
}

fn push_source(items: &mut Vec<CompletionItem>, source: &TableReference) {
    if let Some(alias) = source.alias() {
        items.push(CompletionItem {
            label: alias.text.clone(),
            kind: CompletionItemKind::Alias,
        });
    }
    if let TableReference::Table(table) = source {
        items.push(CompletionItem {
            label: table.identifier.text.clone(),
            kind: CompletionItemKind::Table,
        });
    }
}

/// Build the context stack for a cursor offset.
///
/// Starts at the statement containing the cursor (falling back to the last
/// statement), then descends: at each level the first child span strictly
/// containing the cursor wins; otherwise the child with the largest start
/// not past the cursor.
fn context_stack(statements: &[Statement], cursor: u32) -> Vec<NodeRef<'_>> {
    let mut stack: Vec<NodeRef<'_>> = Vec::new();

    for statement in statements {
        let node = NodeRef::for_statement(statement);
        let (start, end) = node.span();
        if cursor > start && cursor <= end {
            stack.push(node);
            break;
        }
    }
    if stack.is_empty() {
        match statements.last() {
            Some(statement) => stack.push(NodeRef::for_statement(statement)),
            None => return stack,
        }
    }

    loop {
        let mut next: Option<NodeRef<'_>> = None;
        for child in stack.last().unwrap().children() {
            let (start, end) = child.span();
            if start >= cursor {
                continue;
            }
            if end >= cursor {
                next = Some(child);
                break;
            }
            if next.map_or(true, |n| start >= n.span().0) {
                next = Some(child);
            }
        }
        match next {
            Some(node) => stack.push(node),
            None => break,
        }
    }

    stack
}
