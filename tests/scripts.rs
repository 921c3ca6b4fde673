// tests/scripts.rs

//! Script bundling with a stand-in bundler: a shell script that concatenates
//! the entry into an IIFE the way the real bundler's output looks.

#![cfg(unix)]

use std::error::Error;

use assetflow::engine::TaskOutcome;
use assetflow::tasks::bundle_scripts;
use assetflow::types::TransformOptions;
use assetflow_test_utils::{ConfigFileBuilder, TestProject, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

const FAKE_BUNDLER: &str = r#"
entry="$1"
out="$2"
name="$3"
{
  echo "var $name = (function () {"
  cat "$entry"
  echo "  return { greet: greet };"
  echo "})();"
} > "$out"
"#;

const ENTRY: &str = r#"
  // say hello
  function greet(personName) {
    var greeting = "Hello, " + personName;
    return greeting;
  }
"#;

fn project() -> (TestProject, assetflow::config::ConfigFile) {
    init_tracing();
    let project = TestProject::new();
    let bundler = project.script("tools/bundle.sh", FAKE_BUNDLER);
    project.write("src/scripts/main.js", ENTRY);

    let bundler = bundler.display().to_string();
    let tools = ConfigFileBuilder::new()
        .bundler(&[&bundler, "$ENTRY", "$OUTFILE", "$GLOBAL_NAME"])
        .global_name("Site")
        .build();
    (project, tools)
}

#[tokio::test]
async fn debug_bundle_is_not_minified() -> TestResult {
    let (project, tools) = project();
    let ctx = project.context(tools);

    let outcome = bundle_scripts(&ctx, TransformOptions { debug: true }).await?;
    assert_eq!(outcome, TaskOutcome::Success);

    let bundle = project.read("dist/js/bundle.js");
    assert!(bundle.starts_with("var Site = (function () {"));
    assert!(bundle.contains("// say hello"));
    assert!(bundle.contains("personName"));
    Ok(())
}

#[tokio::test]
async fn production_bundle_is_minified_and_keeps_global() -> TestResult {
    let (project, tools) = project();
    let ctx = project.context(tools);

    let outcome = bundle_scripts(&ctx, TransformOptions { debug: false }).await?;
    assert_eq!(outcome, TaskOutcome::Success);

    let bundle = project.read("dist/js/bundle.js");
    assert!(bundle.contains("Site"));
    assert!(!bundle.contains("// say hello"));
    assert!(!bundle.contains("personName"));
    assert!(bundle.len() < ENTRY.len() + 40);
    Ok(())
}

#[tokio::test]
async fn failing_bundler_fails_only_this_task() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    let bundler = project.script("tools/bundle.sh", "echo 'syntax error in main.js' >&2\nexit 1");
    project.write("src/scripts/main.js", ENTRY);

    let bundler = bundler.display().to_string();
    let ctx = project.context(ConfigFileBuilder::new().bundler(&[&bundler]).build());

    let outcome = bundle_scripts(&ctx, TransformOptions { debug: true }).await?;
    assert_eq!(outcome, TaskOutcome::Failed);
    Ok(())
}

#[tokio::test]
async fn missing_bundler_binary_is_an_error() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    project.write("src/scripts/main.js", ENTRY);
    let ctx = project.context(
        ConfigFileBuilder::new()
            .bundler(&["assetflow-no-such-bundler", "$ENTRY"])
            .build(),
    );

    let result = bundle_scripts(&ctx, TransformOptions { debug: true }).await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn unparsable_production_bundle_is_removed() -> TestResult {
    let (project, tools) = project();
    project.write("src/scripts/main.js", "function greet( {\n");
    let ctx = project.context(tools);

    let outcome = bundle_scripts(&ctx, TransformOptions { debug: false }).await?;

    assert_eq!(outcome, TaskOutcome::Failed);
    assert!(!project.exists("dist/js/bundle.js"));
    Ok(())
}
