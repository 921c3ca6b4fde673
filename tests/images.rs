// tests/images.rs

#![cfg(unix)]

use std::error::Error;

use assetflow::engine::TaskOutcome;
use assetflow::tasks::place_images;
use assetflow::types::TransformOptions;
use assetflow_test_utils::{ConfigFileBuilder, TestProject, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

fn project_with_images() -> TestProject {
    init_tracing();
    let project = TestProject::new();
    project
        .write("src/images/logo.png", "png-bytes")
        .write("src/images/icons/menu.svg", "<svg/>");
    project
}

#[tokio::test]
async fn debug_links_dest_to_source() -> TestResult {
    let project = project_with_images();
    project.write("dist/images/stale.png", "old");
    let ctx = project.context(ConfigFileBuilder::new().build());

    let outcome = place_images(&ctx, TransformOptions { debug: true }).await?;
    assert_eq!(outcome, TaskOutcome::Success);

    let dest = project.path("dist/images");
    assert!(dest.is_symlink());
    assert_eq!(std::fs::read_link(&dest)?, project.path("src/images").canonicalize()?);

    // Edits to the source are visible through the link without a rebuild.
    project.write("src/images/new.png", "fresh");
    assert_eq!(project.read("dist/images/new.png"), "fresh");
    assert!(!project.exists("dist/images/stale.png"));
    Ok(())
}

#[tokio::test]
async fn production_copies_files() -> TestResult {
    let project = project_with_images();
    let ctx = project.context(ConfigFileBuilder::new().build());

    let outcome = place_images(&ctx, TransformOptions { debug: false }).await?;
    assert_eq!(outcome, TaskOutcome::Success);

    assert!(!project.path("dist/images").is_symlink());
    assert_eq!(project.read("dist/images/logo.png"), "png-bytes");
    assert_eq!(project.read("dist/images/icons/menu.svg"), "<svg/>");
    Ok(())
}

#[tokio::test]
async fn production_after_debug_replaces_link_with_copies() -> TestResult {
    let project = project_with_images();
    let ctx = project.context(ConfigFileBuilder::new().build());

    place_images(&ctx, TransformOptions { debug: true }).await?;
    place_images(&ctx, TransformOptions { debug: false }).await?;

    assert!(!project.path("dist/images").is_symlink());
    assert_eq!(project.read("dist/images/logo.png"), "png-bytes");
    // Source tree untouched.
    assert!(project.path("src/images/logo.png").is_file());
    Ok(())
}

#[tokio::test]
async fn missing_images_dir_succeeds() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    let ctx = project.context(ConfigFileBuilder::new().build());

    let outcome = place_images(&ctx, TransformOptions { debug: false }).await?;
    assert_eq!(outcome, TaskOutcome::Success);
    assert!(!project.exists("dist/images"));
    Ok(())
}
