// tests/watch_rebuild.rs

//! `build --watch` end to end: real executor, real notify watcher, a temp
//! project and a stand-in bundler. Shutdown comes from a oneshot channel in
//! place of Ctrl-C.

#![cfg(unix)]

use std::error::Error;
use std::time::{Duration, SystemTime};

use tokio::sync::oneshot;

use assetflow::run_build_until;
use assetflow::types::{BuildOptions, TaskId};
use assetflow_test_utils::{ConfigFileBuilder, TestProject, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const FAKE_BUNDLER: &str = r#"
{
  echo "var $3 = (function () {"
  cat "$1"
  echo "})();"
} > "$2"
"#;

fn project() -> TestProject {
    init_tracing();
    let project = TestProject::new();
    project.script("tools/bundle.sh", FAKE_BUNDLER);
    project
        .write("src/styles/main.scss", ".a { color: #ff0000; }\n")
        .write("src/scripts/main.js", "function first() {}\n")
        .write("src/images/logo.png", "png");
    project
}

fn mtime(project: &TestProject, rel: &str) -> std::io::Result<SystemTime> {
    std::fs::metadata(project.path(rel))?.modified()
}

async fn wait_until(mut ready: impl FnMut() -> bool) {
    while !ready() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn script_change_rebuilds_only_scripts() -> TestResult {
    let project = project();
    let bundler = project.path("tools/bundle.sh").display().to_string();
    let tools = ConfigFileBuilder::new()
        .bundler(&[&bundler, "$ENTRY", "$OUTFILE", "$GLOBAL_NAME"])
        .debounce("20ms")
        .build();
    let ctx = project.context(tools);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let options = BuildOptions {
        debug: true,
        watch: true,
        coverage: false,
    };
    let handle = tokio::spawn(run_build_until(ctx, options, async {
        let _ = stop_rx.await;
    }));

    with_timeout(wait_until(|| {
        project.exists("dist/css/main.css")
            && project.exists("dist/js/bundle.js")
            && project.exists("dist/images")
    }))
    .await;
    let css_before = mtime(&project, "dist/css/main.css")?;

    // Past the filesystem's timestamp granularity, and past any events
    // still in flight from the initial build.
    tokio::time::sleep(Duration::from_millis(200)).await;
    project.write("src/scripts/main.js", "function second() {}\n");

    with_timeout(wait_until(|| {
        std::fs::read_to_string(project.path("dist/js/bundle.js"))
            .is_ok_and(|bundle| bundle.contains("second"))
    }))
    .await;
    // Give a wrongly triggered styles rebuild time to land.
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(mtime(&project, "dist/css/main.css")?, css_before);

    let _ = stop_tx.send(());
    let report = with_timeout(handle).await??;

    assert!(!report.interrupted);
    assert!(report.is_success());
    assert!(report.runs.len() >= 2, "initial build plus a rebuild: {report:?}");
    for run in &report.runs[1..] {
        assert_eq!(run.succeeded(), vec![TaskId::Scripts]);
    }
    Ok(())
}
