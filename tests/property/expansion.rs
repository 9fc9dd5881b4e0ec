//! Property-based tests for plain text and loop expansion

use prologue::{Prologue, PrologueConfig};
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn render(name: &str, body: &str) -> Vec<String> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    let mut pro = Prologue::new(PrologueConfig::default()).unwrap();
    pro.add_file(&path).unwrap();
    pro.render(name).unwrap().lines
}

/// Lines with no delimiter, substitution prefix, identifiers or continuation
fn plain_line() -> impl Strategy<Value = String> {
    "[0-9 .,;:+=-]{0,40}".prop_map(|line| line.trim_end().to_string())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Test that text without directives passes through unchanged
    #[test]
    fn test_plain_text_is_identity(lines in prop::collection::vec(plain_line(), 1..20)) {
        let body = lines.join("\n") + "\n";
        let rendered = render("plain.txt", &body);
        prop_assert_eq!(rendered, lines);
    }

    /// Test that a loop emits its body once per value, in order
    #[test]
    fn test_loop_repeats_body(values in prop::collection::vec(-1000i64..1000, 0..8)) {
        let list = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let body = format!("#for v in [{}]\nitem $(v)\n#endfor\n", list);
        let rendered = render("loop.txt", &body);
        let expected: Vec<String> = values.iter().map(|v| format!("item {}", v)).collect();
        prop_assert_eq!(rendered, expected);
    }

    /// Test that the lookup has one entry per output line
    #[test]
    fn test_lookup_matches_output(count in 0usize..6, repeat in 1usize..4) {
        let dir = TempDir::new().unwrap();
        let body: String = (0..count).map(|i| format!("line {}\n", i)).collect();
        let part = dir.path().join("part.txt");
        fs::write(&part, body).unwrap();
        let top = dir.path().join("top.txt");
        let body = format!("#for r in range({})\n#include \"part.txt\"\n#endfor\n", repeat);
        fs::write(&top, body).unwrap();

        let mut pro = Prologue::new(PrologueConfig::default()).unwrap();
        pro.add_file(&part).unwrap();
        pro.add_file(&top).unwrap();
        let output = pro.render("top.txt").unwrap();
        prop_assert_eq!(output.lines.len(), count * repeat);
        prop_assert_eq!(output.lookup.len(), output.lines.len());
    }
}
