//! Integration tests for the output line lookup

use super::test_utils::Fixture;
use prologue::{Prologue, PrologueError};

fn locations(output: &prologue::Output) -> Vec<(String, u32)> {
    output
        .lookup
        .iter()
        .map(|source| {
            let name = source.file.as_ref().map(|f| f.filename()).unwrap_or_default();
            (name, source.line)
        })
        .collect()
}

#[test]
fn test_lookup_across_includes() {
    let mut fx = Fixture::new();
    fx.file("part.txt", "p1\np2\n");
    let top = fx.file("top.txt", "first\n#include \"part.txt\"\nlast\n");

    let output = fx.pro.render("top.txt").unwrap();
    assert_eq!(output.lines, vec!["first", "p1", "p2", "last"]);
    assert_eq!(
        locations(&output),
        vec![
            ("top.txt".to_string(), 1),
            ("part.txt".to_string(), 1),
            ("part.txt".to_string(), 2),
            ("top.txt".to_string(), 3),
        ]
    );

    let resolved = Prologue::resolve(&output.lookup, 4, 1, 0).unwrap();
    assert_eq!(resolved.line, 3);
    assert_eq!(resolved.file, top.display().to_string());
    assert_eq!(resolved.snippet.len(), 2);
    assert!(resolved.snippet[1].contains(">> last"));
}

/// Test that loop bodies map every repetition to the same source line
#[test]
fn test_lookup_through_loops() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#for i in range(3)\nrow $(i)\n#endfor\n");
    let output = fx.pro.render("top.txt").unwrap();
    let lines: Vec<u32> = output.lookup.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![2, 2, 2]);
}

/// Test that a continued line keeps the number of its first physical line
#[test]
fn test_continuation_keeps_first_line() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "head\njoined \\\ntail\nend\n");
    let output = fx.pro.render("top.txt").unwrap();
    assert_eq!(output.lines, vec!["head", "joined tail", "end"]);
    let lines: Vec<u32> = output.lookup.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![1, 2, 4]);
}

/// Test that text before a floating directive keeps its own line
#[test]
fn test_floating_text_location() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "a\nvalue 1 #define B 2\nb $(B)\n");
    let output = fx.pro.render("top.txt").unwrap();
    assert_eq!(output.lines, vec!["a", "value 1", "b 2"]);
    let lines: Vec<u32> = output.lookup.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn test_resolve_out_of_range() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "only\n");
    let output = fx.pro.render("top.txt").unwrap();
    for line in [0, 2] {
        match Prologue::resolve(&output.lookup, line, 0, 0) {
            Err(PrologueError::Lookup(message)) => {
                assert_eq!(message, format!("Line {} is out of valid range 1-1", line))
            }
            other => panic!("expected lookup error, got {:?}", other.map(|r| r.line)),
        }
    }
}
