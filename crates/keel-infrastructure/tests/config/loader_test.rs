//! Configuration loading: defaults, files, environment and validation

use keel_domain::Error;
use keel_infrastructure::config::{
    AppConfig, AssemblyConfig, ConfigBuilder, ConfigLoader, validate_app_config,
};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

/// Loader reading only `content`, isolated from real environment variables
fn loader_for(content: &str, env_prefix: &str) -> (NamedTempFile, ConfigLoader) {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    let loader = ConfigLoader::new()
        .with_config_path(file.path())
        .with_env_prefix(env_prefix);
    (file, loader)
}

#[test]
fn test_empty_file_yields_defaults() {
    let (_file, loader) = loader_for("", "KEEL_TEST_DEFAULTS");
    let config = loader.load().expect("load");

    assert_eq!(config, AppConfig::default());
    assert_eq!(config.application.name, "keel");
    assert_eq!(config.store.provider, "memory");
    assert!(config.migrations.enabled);
    assert!(!config.assembly.override_mode);
}

#[test]
fn test_file_values_override_defaults() {
    let (_file, loader) = loader_for(
        r#"
[application]
name = "orders"

[assembly]
override_mode = true
render_graph = true

[migrations]
table_name = "schema_history"

[logging]
level = "debug"
json_format = true
"#,
        "KEEL_TEST_FILE",
    );
    let config = loader.load().expect("load");

    assert_eq!(config.application_name().as_str(), "orders");
    assert_eq!(
        config.assembly,
        AssemblyConfig {
            override_mode: true,
            render_graph: true,
            eager_validation: false,
        }
    );
    assert_eq!(config.migrations.table_name, "schema_history");
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json_format);
    assert_eq!(config.store.provider, "memory", "untouched sections keep defaults");
}

#[test]
fn test_environment_overrides_file() {
    let (_file, loader) = loader_for(
        "[application]\nname = \"orders\"\n",
        "KEEL_TEST_ENV",
    );
    // SAFETY: the variables use a prefix no other test reads
    unsafe {
        std::env::set_var("KEEL_TEST_ENV_APPLICATION__NAME", "billing");
        std::env::set_var("KEEL_TEST_ENV_MIGRATIONS__TABLE_NAME", "history");
    }
    let config = loader.load();
    unsafe {
        std::env::remove_var("KEEL_TEST_ENV_APPLICATION__NAME");
        std::env::remove_var("KEEL_TEST_ENV_MIGRATIONS__TABLE_NAME");
    }

    let config = config.expect("load");
    assert_eq!(config.application.name, "billing");
    assert_eq!(config.migrations.table_name, "history");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("absent.toml");

    let error = ConfigLoader::new()
        .with_config_path(&path)
        .with_env_prefix("KEEL_TEST_MISSING")
        .load()
        .expect_err("file does not exist");

    assert!(matches!(error, Error::Configuration { .. }));
    assert!(error.to_string().contains("absent.toml"), "{error}");
}

#[test]
fn test_malformed_file_is_an_error() {
    let (_file, loader) = loader_for("[application\nname = ", "KEEL_TEST_MALFORMED");
    let error = loader.load().expect_err("not TOML");
    assert!(matches!(error, Error::Configuration { .. }));
}

#[test]
fn test_invalid_values_are_rejected() {
    let (_file, loader) = loader_for("[logging]\nlevel = \"loud\"\n", "KEEL_TEST_LEVEL");
    let error = loader.load().expect_err("bad level");
    assert!(error.to_string().contains("Invalid log level: loud"), "{error}");

    let (_file, loader) = loader_for("[application]\nname = \"  \"\n", "KEEL_TEST_NAME");
    assert!(loader.load().is_err());

    let (_file, loader) = loader_for(
        "[migrations]\nenabled = true\ntable_name = \"\"\n",
        "KEEL_TEST_TABLE",
    );
    assert!(loader.load().is_err());

    let (_file, loader) = loader_for(
        "[migrations]\nenabled = false\ntable_name = \"\"\n",
        "KEEL_TEST_TABLE_OFF",
    );
    assert!(loader.load().is_ok(), "table name is unused when disabled");
}

#[test]
fn test_unknown_store_provider_is_rejected() {
    let config = ConfigBuilder::new()
        .with_store(keel_infrastructure::config::StoreConfig {
            provider: "cassandra".to_string(),
            ..Default::default()
        })
        .build();

    let error = validate_app_config(&config).expect_err("not registered");
    let message = error.to_string();
    assert!(message.contains("cassandra"), "{message}");
    assert!(message.contains("memory"), "{message}");
}

#[test]
fn test_saved_config_loads_back() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("keel.toml");
    let config = ConfigBuilder::new()
        .with_application_name("orders")
        .with_assembly(AssemblyConfig {
            eager_validation: true,
            ..AssemblyConfig::default()
        })
        .build();

    let loader = ConfigLoader::new()
        .with_config_path(&path)
        .with_env_prefix("KEEL_TEST_SAVE");
    loader.save_to_file(&config, &path).expect("save");

    assert_eq!(loader.config_path(), Some(path.as_path()));
    assert_eq!(loader.load().expect("load"), config);
}
