//! Integration tests for RPL category extraction and completion generation

use std::collections::HashSet;

use rpl_completion::{
    vocabulary, CompletionEngine, CompletionItemKind, Position, RplCompletionEngine, RplParser,
};

fn set(items: &[String]) -> HashSet<&str> {
    items.iter().map(String::as_str).collect()
}

const SAMPLE_PATTERN: &str = r#"
use std::mem::transmute;
use core::ptr;

patt {
    use std::alloc::Layout;

    p_transmute[$T: type, $U: type] = unsafe fn $fn_name(..) -> _ {
        let $from: $T = _;
        let mut $to: $U = Transmute(copy $from);
        @let $ret = move $to;
    }

    fn helper(x: i32) -> i32 { x }
}

util {
    without! { $from }
}
"#;

#[test]
fn test_functions_from_declaration() {
    let result = RplParser::new().parse("fn foo(x: i32) { }");
    assert_eq!(set(&result.functions), HashSet::from(["foo"]));
}

#[test]
fn test_metavariables_declarations_and_uses() {
    let result = RplParser::new().parse("let $x: i32 = 1; $x + $y");
    assert_eq!(set(&result.metavariables), HashSet::from(["x", "y"]));
}

#[test]
fn test_imports_keep_last_segment() {
    let result = RplParser::new().parse("use std::collections::HashMap;\nuse core::mem;");
    assert_eq!(set(&result.imports), HashSet::from(["HashMap", "mem"]));
}

#[test]
fn test_import_line_without_semicolon_is_skipped() {
    let result = RplParser::new().parse("use std::collections::HashMap\nuse core::mem;");
    assert_eq!(result.imports, vec!["mem"]);
}

#[test]
fn test_empty_input() {
    let result = RplParser::new().parse("");
    assert!(result.functions.is_empty());
    assert!(result.metavariables.is_empty());
    assert!(result.imports.is_empty());

    let keywords: Vec<_> = vocabulary::keywords().collect();
    assert_eq!(result.keywords, keywords);
    assert_eq!(result.operators, vocabulary::OPERATORS);
    assert_eq!(result.macros, vocabulary::MACROS);
}

#[test]
fn test_unbalanced_braces_are_harmless() {
    let result = RplParser::new().parse("patt { fn broken( { $a = {{{ ");
    assert_eq!(result.functions, vec!["broken"]);
    assert_eq!(result.metavariables, vec!["a"]);
}

#[test]
fn test_realistic_pattern() {
    let result = RplParser::new().parse(SAMPLE_PATTERN);

    assert_eq!(
        set(&result.functions),
        HashSet::from(["helper"]),
        "`fn $fn_name(` is a metavariable, not a function"
    );
    assert_eq!(
        set(&result.metavariables),
        HashSet::from(["T", "U", "fn_name", "from", "to", "ret"])
    );
    assert_eq!(
        set(&result.imports),
        HashSet::from(["transmute", "ptr", "Layout"])
    );
}

#[test]
fn test_extracted_names_have_no_sigils_or_parens() {
    let result = RplParser::new().parse(SAMPLE_PATTERN);
    assert!(result.metavariables.iter().all(|m| !m.contains('$')));
    assert!(result.functions.iter().all(|f| !f.contains('(')));
    assert!(result.imports.iter().all(|i| !i.contains("::")));
}

#[test]
fn test_categories_are_deduplicated() {
    let result = RplParser::new().parse("$a $a $b $a\nuse x::y;\nuse z::y;\nfn f() fn f()");
    assert_eq!(result.metavariables, vec!["a", "b"]);
    assert_eq!(result.imports, vec!["y"]);
    assert_eq!(result.functions, vec!["f"]);
}

#[tokio::test]
async fn test_engine_covers_every_category() {
    let engine = RplCompletionEngine::default();
    let items = engine
        .generate_completions(SAMPLE_PATTERN, Position::new(3, 4))
        .await
        .unwrap();

    let kinds: HashSet<_> = items.iter().map(|i| i.kind).collect();
    for kind in [
        CompletionItemKind::Keyword,
        CompletionItemKind::Function,
        CompletionItemKind::Variable,
        CompletionItemKind::Operator,
        CompletionItemKind::Module,
        CompletionItemKind::Macro,
        CompletionItemKind::Snippet,
    ] {
        assert!(kinds.contains(&kind), "missing {:?} items", kind);
    }

    let metavariable_items = items
        .iter()
        .filter(|i| i.detail.as_deref() == Some("RPL Metavariable"))
        .count();
    assert_eq!(metavariable_items, 6);
}
