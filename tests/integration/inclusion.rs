//! Integration tests for include, import and the file registry

use super::test_utils::Fixture;
use prologue::PrologueError;

/// Test that include re-evaluates a file every time
#[test]
fn test_include_twice_yields_twice() {
    let mut fx = Fixture::new();
    fx.file("part.txt", "part line\n");
    fx.file("top.txt", "#include \"part.txt\"\n#include <part.txt>\n");
    assert_eq!(fx.render("top.txt"), vec!["part line", "part line"]);
}

/// Test that import only ever enters a file once
#[test]
fn test_import_twice_yields_once() {
    let mut fx = Fixture::new();
    fx.file("part.txt", "part line\n");
    fx.file("top.txt", "#import \"part.txt\"\n#import \"part.txt\"\n");
    assert_eq!(fx.render("top.txt"), vec!["part line"]);
}

/// Test that import respects files already entered through include
#[test]
fn test_import_after_include() {
    let mut fx = Fixture::new();
    fx.file("part.txt", "part line\n");
    fx.file("first.txt", "#include \"part.txt\"\n#import \"part.txt\"\n");
    fx.file("second.txt", "#import \"part.txt\"\n#include \"part.txt\"\n");
    assert_eq!(fx.render("first.txt"), vec!["part line"]);
    assert_eq!(fx.render("second.txt"), vec!["part line", "part line"]);
}

/// Test that a mutual include cycle names both files in the stack
#[test]
fn test_include_cycle() {
    let mut fx = Fixture::new();
    fx.file("a.txt", "from a\n#include \"b.txt\"\n");
    fx.file("b.txt", "from b\n#include \"a.txt\"\n");
    let err = fx.error("a.txt");
    assert!(matches!(err, PrologueError::Recursion { .. }));
    assert_eq!(
        err.to_string(),
        "Detected infinite recursion when including file 'a.txt' - file stack: a.txt, b.txt"
    );
}

/// Test that a mutual import cycle terminates
#[test]
fn test_import_cycle_terminates() {
    let mut fx = Fixture::new();
    fx.file("a.txt", "#import \"b.txt\"\nA\n");
    fx.file("b.txt", "#import \"a.txt\"\nB\n");
    assert_eq!(fx.render("a.txt"), vec!["B", "A"]);
}

/// Test that defines made in an included file are visible afterwards
#[test]
fn test_included_defines_are_visible() {
    let mut fx = Fixture::new();
    fx.file("defs.txt", "#define W 4\n");
    fx.file("top.txt", "#include \"defs.txt\"\nwidth $(W)\n");
    assert_eq!(fx.render("top.txt"), vec!["width 4"]);
}

/// Test that includes in untaken branches are never resolved
#[test]
fn test_untaken_include_is_not_resolved() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#if 0\n#include \"missing.txt\"\n#endif\nok\n");
    assert_eq!(fx.render("top.txt"), vec!["ok"]);
}

/// Test including a file from inside a loop
#[test]
fn test_include_inside_loop() {
    let mut fx = Fixture::new();
    fx.file("row.txt", "row $(i)\n");
    fx.file("top.txt", "#for i in range(3)\n#include \"row.txt\"\n#endfor\n");
    assert_eq!(fx.render("top.txt"), vec!["row 0", "row 1", "row 2"]);
}

/// Test that missing files are reported at the include
#[test]
fn test_missing_include() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "line\n#include \"nope.txt\"\n");
    let err = fx.error("top.txt");
    assert_eq!(err.message(), "No entry is known for path nope.txt");
    assert!(matches!(err, PrologueError::Located { ref location, .. } if location.line == 2));
}

/// Test resolution through a registered folder
#[test]
fn test_folder_resolution() {
    let mut fx = Fixture::new();
    fx.write("lib/inner/leaf.txt", "leaf\n");
    fx.write("lib/root.txt", "root\n");
    let lib = fx.path().join("lib");
    fx.pro.add_folder(&lib, None, false).unwrap();
    fx.file("top.txt", "#include \"lib/root.txt\"\n#include \"lib/inner/leaf.txt\"\n");
    assert_eq!(fx.render("top.txt"), vec!["root", "leaf"]);

    let output = fx.pro.render("top.txt").unwrap();
    let names: Vec<String> = output.included.iter().map(|f| f.filename()).collect();
    assert_eq!(names, vec!["top.txt", "root.txt", "leaf.txt"]);
}

/// Test that filtered folder adds register files at the registry root
#[test]
fn test_filtered_folder_is_flattened() {
    let mut fx = Fixture::new();
    fx.write("src/a.vh", "from a\n");
    fx.write("src/sub/b.vh", "from b\n");
    fx.write("src/skip.txt", "skipped\n");
    let src = fx.path().join("src");
    fx.pro.add_folder(&src, Some(".vh"), true).unwrap();
    fx.file("top.txt", "#include \"a.vh\"\n#include \"b.vh\"\n");
    assert_eq!(fx.render("top.txt"), vec!["from a", "from b"]);
    assert!(!fx.pro.registry().has_entry("skip.txt"));
}

/// Test that an absolute path bypasses the registry
#[test]
fn test_absolute_include() {
    let mut fx = Fixture::new();
    let outside = fx.write("elsewhere/abs.txt", "absolute\n");
    fx.file("top.txt", &format!("#include \"{}\"\n", outside.display()));
    assert_eq!(fx.render("top.txt"), vec!["absolute"]);
}
