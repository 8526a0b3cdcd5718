//! Integration tests for config module public API.

use rex::config::{
    deep_merge, find_project_root, load_config, load_merged_config, RexConfig, Settings,
};
use rex::ui::OutputMode;
use std::fs;
use tempfile::TempDir;

#[test]
fn public_api_is_accessible() {
    let config = RexConfig::default();
    assert_eq!(config.settings, Settings::default());
    assert_eq!(config.settings.default_output, OutputMode::Normal);
}

#[test]
fn full_config_workflow() {
    let temp = TempDir::new().unwrap();
    let rex_dir = temp.path().join(".rex");
    fs::create_dir_all(&rex_dir).unwrap();

    fs::write(
        rex_dir.join("config.yml"),
        r#"
settings:
  default_output: verbose
translate:
  keep_comments: false
  indent_width: 4
gap:
  sequence: [1, 4, 7, 13]
"#,
    )
    .unwrap();
    fs::write(rex_dir.join("config.local.yml"), "translate:\n  indent_width: 2\n").unwrap();

    let config = load_merged_config(temp.path()).unwrap();
    config.validate().unwrap();

    assert_eq!(config.settings.default_output, OutputMode::Verbose);
    assert_eq!(config.gap.sequence, vec![1, 4, 7, 13]);

    let options = config.translate_options();
    assert!(options.optimize);
    assert!(!options.keep_comments);
    assert_eq!(options.indent, "  ");

    let code = rex::translate::translate("if true\n  puts(1) # one\nend\n", &options).unwrap();
    assert_eq!(code, "if (TRUE) {\n  print(1)\n}\n");
}

#[test]
fn project_root_is_found_from_subdirectory() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join(".rex")).unwrap();
    let nested = temp.path().join("src").join("scripts");
    fs::create_dir_all(&nested).unwrap();

    let root = find_project_root(&nested).unwrap();
    assert_eq!(root, temp.path());

    let config = load_config(&root, None).unwrap();
    assert_eq!(config, RexConfig::default());
}

#[test]
fn invalid_yaml_reports_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.yml");
    fs::write(&path, "gap: [").unwrap();

    let err = load_config(temp.path(), Some(&path)).unwrap_err();
    assert!(err.to_string().contains("broken.yml"));
}

#[test]
fn deep_merge_is_public() {
    let base: serde_yaml::Value = serde_yaml::from_str("a: 1\nb: 2").unwrap();
    let overlay: serde_yaml::Value = serde_yaml::from_str("b: 3").unwrap();
    let merged = deep_merge(&base, &overlay);
    assert_eq!(merged["a"], 1);
    assert_eq!(merged["b"], 3);
}
