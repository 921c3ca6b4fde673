// tests/config_errors.rs

use std::time::Duration;

use assetflow::config::{ConfigFile, load_and_validate};
use assetflow::errors::AssetflowError;
use assetflow::types::TriggerWhileRunningBehaviour;
use assetflow_test_utils::{ConfigFileBuilder, TestProject};

fn config_error(result: Result<ConfigFile, AssetflowError>) -> String {
    match result {
        Err(AssetflowError::ConfigError(msg)) => msg,
        other => panic!("expected a ConfigError, got {other:?}"),
    }
}

#[test]
fn missing_file_yields_defaults() {
    let project = TestProject::new();
    let config = load_and_validate(project.path("Assetflow.toml")).unwrap();

    assert_eq!(config.scripts.global_name, "App");
    assert_eq!(config.debounce(), Duration::from_millis(100));
    assert_eq!(config.watch.queue_length, 1);
    assert_eq!(
        config.watch.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Queue
    );
}

#[test]
fn partial_file_keeps_other_defaults() {
    let project = TestProject::new();
    project.write(
        "Assetflow.toml",
        r#"
[scripts]
global_name = "Shop"

[watch]
debounce = "1s"
triggered_while_running_behaviour = "cancel"
"#,
    );

    let config = load_and_validate(project.path("Assetflow.toml")).unwrap();

    assert_eq!(config.scripts.global_name, "Shop");
    assert_eq!(config.scripts.bundler[0], "esbuild");
    assert_eq!(config.debounce(), Duration::from_secs(1));
    assert_eq!(
        config.watch.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Cancel
    );
    assert_eq!(config.lint.ignore_file, ".eslintignore");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let project = TestProject::new();
    project.write("Assetflow.toml", "[scripts\nglobal_name = ");

    let err = load_and_validate(project.path("Assetflow.toml")).unwrap_err();
    assert!(matches!(err, AssetflowError::TomlError(_)), "got {err:?}");
}

#[test]
fn unknown_behaviour_is_a_parse_error() {
    let project = TestProject::new();
    project.write(
        "Assetflow.toml",
        "[watch]\ntriggered_while_running_behaviour = \"restart\"\n",
    );

    let err = load_and_validate(project.path("Assetflow.toml")).unwrap_err();
    assert!(matches!(err, AssetflowError::TomlError(_)), "got {err:?}");
}

#[test]
fn global_name_must_be_an_identifier() {
    let raw = ConfigFileBuilder::new().global_name("my-app").raw();
    let msg = config_error(ConfigFile::try_from(raw));
    assert!(msg.contains("[scripts].global_name"), "{msg}");
}

#[test]
fn empty_commands_are_rejected() {
    let msg = config_error(ConfigFile::try_from(ConfigFileBuilder::new().bundler(&[]).raw()));
    assert!(msg.contains("[scripts].bundler"), "{msg}");

    let msg = config_error(ConfigFile::try_from(
        ConfigFileBuilder::new().lint_command(&["  "]).raw(),
    ));
    assert!(msg.contains("[lint].command"), "{msg}");

    let msg = config_error(ConfigFile::try_from(
        ConfigFileBuilder::new().test_command(&[]).raw(),
    ));
    assert!(msg.contains("[test].command"), "{msg}");
}

#[test]
fn bad_debounce_is_rejected() {
    for value in ["", "100", "5 parsecs", "-1s", "999999999999999999h"] {
        let msg = config_error(ConfigFile::try_from(
            ConfigFileBuilder::new().debounce(value).raw(),
        ));
        assert!(msg.contains("[watch].debounce"), "{value:?}: {msg}");
    }
}

#[test]
fn debounce_accepts_minute_and_hour_units() {
    for (value, expected) in [("2m", 120), ("1h", 3600)] {
        let config = ConfigFile::try_from(ConfigFileBuilder::new().debounce(value).raw())
            .unwrap_or_else(|e| panic!("{value:?}: {e}"));
        assert_eq!(config.debounce(), Duration::from_secs(expected));
    }
}

#[test]
fn zero_queue_length_is_rejected() {
    let msg = config_error(ConfigFile::try_from(
        ConfigFileBuilder::new().queue_length(0).raw(),
    ));
    assert!(msg.contains("queue_length"), "{msg}");
}

#[test]
fn browser_queries_are_checked() {
    let msg = config_error(ConfigFile::try_from(ConfigFileBuilder::new().browsers(&[]).raw()));
    assert!(msg.contains("[styles].browsers"), "{msg}");

    let msg = config_error(ConfigFile::try_from(
        ConfigFileBuilder::new()
            .browsers(&["definitely not a browser query"])
            .raw(),
    ));
    assert!(msg.contains("[styles].browsers"), "{msg}");
}
