//! Integration tests for whole-file expansion scenarios

use super::test_utils::Fixture;
use prologue::{PrologueConfig, PrologueError};

/// Test that a define is visible to explicit substitution on later lines
#[test]
fn test_define_then_substitute() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#define X 5\nvalue is $(X)\n");
    assert_eq!(fx.render("top.txt"), vec!["value is 5"]);
}

/// Test that a define without a value is true
#[test]
fn test_define_defaults_to_true() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#define FLAG\n#if FLAG\non\n#endif\n");
    assert_eq!(fx.render("top.txt"), vec!["on"]);
}

/// Test if/else selection both ways
#[test]
fn test_if_else() {
    let body = "#if X == 5\nyes\n#else\nno\n#endif\n";

    let mut fx = Fixture::new();
    fx.file("five.txt", &format!("#define X 5\n{}", body));
    fx.file("four.txt", &format!("#define X 4\n{}", body));
    assert_eq!(fx.render("five.txt"), vec!["yes"]);
    assert_eq!(fx.render("four.txt"), vec!["no"]);
}

/// Test that sections are tested in order and only the first truthy one is used
#[test]
fn test_elif_chain() {
    let mut fx = Fixture::new();
    fx.file(
        "top.txt",
        "#define N 7\n\
         #if N < 5\nsmall\n\
         #elif N < 10\nmedium\n\
         #elif N < 100\nlarge\n\
         #else\nhuge\n\
         #endif\n",
    );
    assert_eq!(fx.render("top.txt"), vec!["medium"]);
}

/// Test that directives in untaken sections never run
#[test]
fn test_untaken_sections_have_no_side_effects() {
    let mut fx = Fixture::new();
    fx.file(
        "top.txt",
        "#if 0\n#define A 1\n#error never raised\n#else\n#define B 2\n#endif\n\
         #ifdef A\nA was defined\n#endif\n\
         #ifdef B\nvalue $(B)\n#endif\n",
    );
    assert_eq!(fx.render("top.txt"), vec!["value 2"]);
}

/// Test that defines made inside the chosen branch escape the conditional
#[test]
fn test_branch_defines_escape() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#if 1\n#define INNER 3\n#endif\ninner $(INNER)\n");
    assert_eq!(fx.render("top.txt"), vec!["inner 3"]);
}

/// Test ifdef/ifndef against defines and undefs
#[test]
fn test_ifdef_ifndef_undef() {
    let mut fx = Fixture::new();
    fx.file(
        "top.txt",
        "#define A 1\n#undef A\n#ifdef A\nyes\n#else\nno\n#endif\n#ifndef A\nmissing\n#endif\n",
    );
    assert_eq!(fx.render("top.txt"), vec!["no", "missing"]);
}

/// Test that undefining an unknown name is an error
#[test]
fn test_undef_unknown() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#undef B\n");
    assert_eq!(fx.error("top.txt").message(), "No variable defined for 'B'");
}

/// Test loops over literal lists
#[test]
fn test_for_over_list() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#for i in [1,2,3]\nitem $(i)\n#endfor\n");
    assert_eq!(fx.render("top.txt"), vec!["item 1", "item 2", "item 3"]);
}

/// Test loops over range() with arithmetic in the body
#[test]
fn test_for_over_range() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#for i in range(2)\nrow $(i * 10)\n#endfor\n");
    assert_eq!(fx.render("top.txt"), vec!["row 0", "row 10"]);
}

/// Test nested loops and that loop variables do not outlive the loop
#[test]
fn test_nested_loops() {
    let mut fx = Fixture::new();
    fx.file(
        "top.txt",
        "#for a in [1, 2]\n#for b in ['x', 'y']\n$(a)-$(b)\n#endfor\n#endfor\n\
         #ifndef a\ngone\n#endif\n",
    );
    assert_eq!(fx.render("top.txt"), vec!["1-x", "1-y", "2-x", "2-y", "gone"]);
}

/// Test conditionals evaluated once per loop iteration
#[test]
fn test_conditional_inside_loop() {
    let mut fx = Fixture::new();
    fx.file(
        "top.txt",
        "#for n in range(4)\n#if n % 2 == 0\neven $(n)\n#endif\n#endfor\n",
    );
    assert_eq!(fx.render("top.txt"), vec!["even 0", "even 2"]);
}

/// Test implicit substitution of bare identifiers
#[test]
fn test_implicit_substitution() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#define WIDTH 16\n#define HALF WIDTH / 2\nbus WIDTH HALF\n");
    assert_eq!(fx.render("top.txt"), vec!["bus 16 8.0"]);
}

/// Test that strict mode rejects references to undefined variables
#[test]
fn test_undefined_reference() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "value $(MISSING)\n");
    let err = fx.error("top.txt");
    assert!(err
        .message()
        .contains("Reference to undefined variable 'MISSING'"));
    assert!(matches!(err, PrologueError::Located { ref location, .. } if location.line == 1));
}

/// Test the lenient fallback to flattened text when evaluation fails
#[test]
fn test_lenient_evaluation() {
    let source = "#define GREETING hello world\n$(GREETING)\n";

    let mut fx = Fixture::new();
    fx.file("top.txt", source);
    assert_eq!(fx.render("top.txt"), vec!["hello world"]);

    let config = PrologueConfig {
        lenient_eval: false,
        ..Default::default()
    };
    let mut fx = Fixture::with_config(config);
    fx.file("top.txt", source);
    assert!(matches!(fx.error("top.txt"), PrologueError::Located { .. }));
}

/// Test redefinition errors by default and warns when allowed
#[test]
fn test_redefinition() {
    let source = "#define A 1\n#define A 2\nA\n";

    let mut fx = Fixture::new();
    fx.file("top.txt", source);
    assert_eq!(
        fx.error("top.txt").message(),
        "Variable already defined for 'A' with value 1"
    );

    let config = PrologueConfig {
        allow_redefine: true,
        ..Default::default()
    };
    let mut fx = Fixture::with_config(config);
    fx.file("top.txt", source);
    assert_eq!(fx.render("top.txt"), vec!["2"]);
}

/// Test that info and warning messages never abort
#[test]
fn test_warning_messages_continue() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#info starting\n#warning careful\n#todo later\nafter\n");
    assert_eq!(fx.render("top.txt"), vec!["after"]);
}

/// Test that error messages abort with their substituted text
#[test]
fn test_error_message_aborts() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "before\n#fatal broken $(1 + 1)\n");
    match fx.error("top.txt") {
        PrologueError::Message(text) => assert_eq!(text, "broken 2"),
        other => panic!("expected message error, got {:?}", other),
    }
}

/// Test that an unclosed if cites its own line
#[test]
fn test_unclosed_if() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "a\nb\n#if 1\nc\n");
    let err = fx.error("top.txt");
    match &err {
        PrologueError::Unclosed { location, .. } => assert_eq!(location.line, 3),
        other => panic!("expected unclosed block, got {:?}", other),
    }
    assert!(err.to_string().starts_with("Unmatched #if block directive in "));
}

/// Test that else may not be followed by more sections
#[test]
fn test_transition_after_else() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#if 1\na\n#else\nb\n#elif 2\nc\n#endif\n");
    assert_eq!(
        fx.error("top.txt").message(),
        "Transition 'elif' detected after 'else' clause"
    );
}

/// Test malformed loop clauses
#[test]
fn test_malformed_loop() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#for i of [1]\n#endfor\n");
    assert_eq!(
        fx.error("top.txt").message(),
        "Incorrectly formed loop condition 'i of [1]'"
    );
}

/// Test that a guard's right operand is skipped once the left decides it
#[test]
fn test_guard_short_circuits() {
    let body = "#if X != 0 and 10 / X > 1\nbig\n#else\nsmall\n#endif\n\
                #if X == 0 or 10 / X > 1\nsafe\n#endif\n";

    let mut fx = Fixture::new();
    fx.file("zero.txt", &format!("#define X 0\n{}", body));
    fx.file("two.txt", &format!("#define X 2\n{}", body));
    assert_eq!(fx.render("zero.txt"), vec!["small", "safe"]);
    assert_eq!(fx.render("two.txt"), vec!["big", "safe"]);
}

/// Test that oversized string repetition is an error rather than text
#[test]
fn test_oversized_repetition() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "ok\nvalue $('ab' * 9223372036854775807)\n");
    let err = fx.error("top.txt");
    assert!(err.message().starts_with("Repeat count too large"));
    assert!(matches!(err, PrologueError::Located { ref location, .. } if location.line == 2));
}

/// Test that a loop over an oversized range fails before iterating
#[test]
fn test_oversized_range_loop() {
    let mut fx = Fixture::new();
    fx.file("top.txt", "#for i in range(9223372036854775807)\nrow $(i)\n#endfor\n");
    let err = fx.error("top.txt");
    assert!(err.message().starts_with("range() would produce"));
}
