//! Integration tests for dialect presets and delimiter handling

use super::test_utils::Fixture;
use prologue::{Dialect, PrologueConfig};

#[test]
fn test_verilog_dialect() {
    let mut fx = Fixture::with_config(PrologueConfig::dialect(Dialect::Verilog));
    fx.file(
        "top.v",
        "`timescale 1ns/1ps\n\
         `define WIDTH 8\n\
         module top;\n\
         `ifdef WIDTH\n\
         \x20 wire [`WIDTH-1:0] data;\n\
         `else\n\
         \x20 wire data;\n\
         `endif\n\
         \x20 assign x = 1; // `undef WIDTH\n\
         endmodule\n",
    );
    assert_eq!(
        fx.render("top.v"),
        vec![
            "`timescale 1ns/1ps",
            "module top;",
            "  wire [8-1:0] data;",
            "  assign x = 1; // `undef WIDTH",
            "endmodule",
        ]
    );
}

/// Test that a shared delimiter doubling as the comment marker keeps unknown tags as text
#[test]
fn test_shared_delimiter_comments() {
    let config = PrologueConfig {
        comment: Some("#".to_string()),
        shared_delimiter: true,
        ..Default::default()
    };
    let mut fx = Fixture::with_config(config);
    fx.file("script.sh", "#note keep this\n#define X 2\nvalue $(X)\n");
    assert_eq!(fx.render("script.sh"), vec!["#note keep this", "value 2"]);
}

/// Test that directives after a comment marker are ignored
#[test]
fn test_c_dialect_comments() {
    let mut fx = Fixture::with_config(PrologueConfig::dialect(Dialect::C));
    fx.file(
        "top.c",
        "// #define X 1\n\
         #ifdef X\nyes\n#else\nno\n#endif\n\
         int a; // #error never raised\n",
    );
    assert_eq!(
        fx.render("top.c"),
        vec!["// #define X 1", "no", "int a; // #error never raised"]
    );
}

/// Test a floating define followed by implicit substitution
#[test]
fn test_c_dialect_floating_define() {
    let mut fx = Fixture::with_config(PrologueConfig::dialect(Dialect::C));
    fx.file("top.c", "int a; #define Y 3\nint y = Y;\n");
    assert_eq!(fx.render("top.c"), vec!["int a;", "int y = 3;"]);
}

/// Test a custom multi-character delimiter
#[test]
fn test_custom_delimiter() {
    let config = PrologueConfig {
        delimiter: "%%".to_string(),
        ..Default::default()
    };
    let mut fx = Fixture::with_config(config);
    fx.file(
        "top.txt",
        "%%define N 2\n#define stays text\n%%for i in range(N)\nline $(i)\n%%endfor\n",
    );
    assert_eq!(
        fx.render("top.txt"),
        vec!["#define stays text", "line 0", "line 1"]
    );
}
