// tests/runtime_fake_executor.rs

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use assetflow::dag::{ScheduledTask, Scheduler};
use assetflow::engine::{
    CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, RuntimeReport, TaskOutcome,
    TriggerReason, TriggerWhileRunningBehaviour,
};
use assetflow::exec::{DispatchFuture, ExecutorBackend};
use assetflow::types::{BuildMode, TaskId};
use assetflow_test_utils::{FakeExecutor, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Accepts tasks but never reports them finished, like a build stuck in a
/// long transform.
struct StalledExecutor {
    dispatched: Arc<Mutex<Vec<TaskId>>>,
}

impl ExecutorBackend for StalledExecutor {
    fn spawn_ready_tasks(&mut self, tasks: Vec<ScheduledTask>) -> DispatchFuture<'_> {
        let dispatched = Arc::clone(&self.dispatched);
        Box::pin(async move {
            dispatched.lock().unwrap().extend(tasks.iter().map(|t| t.task));
            Ok(())
        })
    }
}

async fn one_shot(
    mode: BuildMode,
    failing: &[TaskId],
) -> Result<(RuntimeReport, Vec<ScheduledTask>), Box<dyn Error>> {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let executed = Arc::new(Mutex::new(Vec::new()));

    let mut executor = FakeExecutor::new(rt_tx.clone(), Arc::clone(&executed));
    for task in failing {
        executor = executor.with_outcome(*task, TaskOutcome::Failed);
    }

    let core = CoreRuntime::new(
        Scheduler::new(mode),
        TriggerWhileRunningBehaviour::Queue,
        1,
        RuntimeOptions {
            exit_when_idle: true,
        },
    );

    rt_tx
        .send(RuntimeEvent::TaskTriggered {
            task: TaskId::Clean,
            reason: TriggerReason::Manual,
        })
        .await?;

    let report = Runtime::new(core, rt_rx, executor).run().await?;
    let executed = executed.lock().unwrap().clone();
    Ok((report, executed))
}

#[tokio::test]
async fn production_build_runs_clean_then_all_transforms_and_exits() -> TestResult {
    with_timeout(async {
        let (report, executed) = one_shot(BuildMode::Production, &[]).await?;

        let order: Vec<TaskId> = executed.iter().map(|t| t.task).collect();
        assert_eq!(order[0], TaskId::Clean);
        assert_eq!(order.len(), 4);
        assert!(executed.iter().all(|t| !t.options.debug));

        assert_eq!(report.runs.len(), 1);
        assert!(report.is_success());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn failure_in_one_transform_is_aggregated() -> TestResult {
    with_timeout(async {
        let (report, executed) = one_shot(BuildMode::Production, &[TaskId::Styles]).await?;

        let order: Vec<TaskId> = executed.iter().map(|t| t.task).collect();
        assert!(order.contains(&TaskId::Scripts));
        assert!(order.contains(&TaskId::Images));

        assert!(!report.is_success());
        assert_eq!(report.failed_tasks(), vec![TaskId::Styles]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn failed_clean_skips_transforms() -> TestResult {
    with_timeout(async {
        let (report, executed) = one_shot(BuildMode::Debug, &[TaskId::Clean]).await?;

        assert_eq!(executed.len(), 1);
        assert!(executed[0].options.debug);
        assert_eq!(
            report.failed_tasks(),
            vec![TaskId::Clean, TaskId::Styles, TaskId::Scripts, TaskId::Images]
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn shutdown_stops_a_watching_runtime() -> TestResult {
    with_timeout(async {
        init_tracing();

        let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
        let executed = Arc::new(Mutex::new(Vec::new()));
        let executor = FakeExecutor::new(rt_tx.clone(), Arc::clone(&executed));

        let core = CoreRuntime::new(
            Scheduler::new(BuildMode::Debug),
            TriggerWhileRunningBehaviour::Queue,
            1,
            RuntimeOptions {
                exit_when_idle: false,
            },
        );

        let handle = tokio::spawn(Runtime::new(core, rt_rx, executor).run());

        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task: TaskId::Clean,
                reason: TriggerReason::Manual,
            })
            .await?;
        // Let the initial run settle, then a watch-triggered scripts rebuild.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task: TaskId::Scripts,
                reason: TriggerReason::FileWatch,
            })
            .await?;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

        let report = handle.await??;
        assert_eq!(report.runs.len(), 2);
        assert_eq!(report.runs[1].succeeded(), vec![TaskId::Scripts]);

        let scripts_runs = executed
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.task == TaskId::Scripts)
            .count();
        assert_eq!(scripts_runs, 2);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn shutdown_during_one_shot_build_is_not_a_success() -> TestResult {
    with_timeout(async {
        init_tracing();

        let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
        let dispatched = Arc::new(Mutex::new(Vec::new()));
        let executor = StalledExecutor {
            dispatched: Arc::clone(&dispatched),
        };

        let core = CoreRuntime::new(
            Scheduler::new(BuildMode::Production),
            TriggerWhileRunningBehaviour::Queue,
            1,
            RuntimeOptions {
                exit_when_idle: true,
            },
        );

        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task: TaskId::Clean,
                reason: TriggerReason::Manual,
            })
            .await?;
        rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

        let report = Runtime::new(core, rt_rx, executor).run().await?;

        assert_eq!(*dispatched.lock().unwrap(), vec![TaskId::Clean]);
        assert!(report.runs.is_empty());
        assert!(report.interrupted);
        assert!(!report.is_success());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn shutdown_while_idle_is_not_an_interruption() -> TestResult {
    with_timeout(async {
        init_tracing();

        let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
        let executor = FakeExecutor::new(rt_tx.clone(), Arc::new(Mutex::new(Vec::new())));
        let core = CoreRuntime::new(
            Scheduler::new(BuildMode::Debug),
            TriggerWhileRunningBehaviour::Queue,
            1,
            RuntimeOptions {
                exit_when_idle: false,
            },
        );

        let handle = tokio::spawn(Runtime::new(core, rt_rx, executor).run());
        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task: TaskId::Clean,
                reason: TriggerReason::Manual,
            })
            .await?;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

        let report = handle.await??;
        assert_eq!(report.runs.len(), 1);
        assert!(!report.interrupted);
        assert!(report.is_success());
        Ok(())
    })
    .await
}
