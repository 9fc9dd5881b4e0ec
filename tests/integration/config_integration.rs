//! Integration tests for configuration files driving evaluation

use super::test_utils::Fixture;
use prologue::config::ConfigLoader;
use prologue::{Prologue, PrologueError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_file_drives_syntax() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(
        &path,
        r#"
delimiter = "@"
implicit_sub = false

[explicit_style]
prefix = "${"
suffix = "}"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(config.delimiter, "@");
    assert!(config.lenient_eval);

    let mut fx = Fixture::with_config(config);
    fx.file("top.txt", "@define V 4\nvalue ${V} V\n#define stays\n");
    assert_eq!(fx.render("top.txt"), vec!["value 4 V", "#define stays"]);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "delimiter = \"a b\"\n").unwrap();
    match ConfigLoader::load_from_file(&path) {
        Err(PrologueError::Config(message)) => {
            assert_eq!(message, "Delimiter should not contain whitespace")
        }
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let err = ConfigLoader::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().starts_with("Configuration file not found"));
}

/// Test that construction re-validates a config built in code
#[test]
fn test_construction_validates() {
    let config = prologue::PrologueConfig {
        explicit_style: prologue::config::ExplicitStyle {
            prefix: String::new(),
            suffix: String::new(),
        },
        ..Default::default()
    };
    assert!(matches!(Prologue::new(config), Err(PrologueError::Config(_))));
}
