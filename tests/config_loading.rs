use std::io::Write;

use agentweave_core::config::AppConfig;
use agentweave_core::error::WeaveError;

#[test]
fn test_load_full_config_from_file() {
    let toml_content = r#"
[model]
provider = "openai"
model_id = "gpt-4.1-mini"
api_key = "sk-test-key"
max_tokens = 1500
temperature = 0.5

[gateway]
bind = "0.0.0.0:9999"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.model.provider, "openai");
    assert_eq!(config.model.model_id, "gpt-4.1-mini");
    assert_eq!(config.model.api_key, Some("sk-test-key".to_string()));
    assert_eq!(config.model.max_tokens, 1500);
    assert_eq!(config.gateway.bind, "0.0.0.0:9999");
}

#[test]
fn test_env_var_expansion_in_config() {
    std::env::set_var("WEAVE_CONFIG_TEST_KEY", "sk-from-env");

    let toml_content = r#"
[model]
api_key = "${WEAVE_CONFIG_TEST_KEY}"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(config.model.api_key, Some("sk-from-env".to_string()));
}

#[test]
fn test_missing_config_file_is_a_distinct_error() {
    let err = AppConfig::load(std::path::Path::new("/nonexistent/agentweave.toml")).unwrap_err();
    assert!(matches!(err, WeaveError::ConfigNotFound(_)));
}

#[test]
fn test_minimal_config_uses_defaults() {
    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(b"[model]\nmodel_id = \"gpt-4o\"\n")
        .expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(config.model.model_id, "gpt-4o");
    assert_eq!(config.model.max_tokens, 2000);
    assert_eq!(config.gateway.bind, "127.0.0.1:8080");
}
