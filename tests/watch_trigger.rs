// tests/watch_trigger.rs

//! Watch-mode sequencing through the pure core: which tasks a file-change
//! trigger re-runs and how triggers during a rebuild are coalesced.

use assetflow::dag::{Scheduler, TaskRunState};
use assetflow::engine::{
    CoreRuntime, CoreStep, RuntimeEvent, RuntimeOptions, TaskOutcome, TriggerReason,
    TriggerWhileRunningBehaviour,
};
use assetflow::types::{BuildMode, TaskId};
use assetflow_test_utils::init_tracing;

fn watching_core(behaviour: TriggerWhileRunningBehaviour) -> CoreRuntime {
    init_tracing();
    CoreRuntime::new(
        Scheduler::new(BuildMode::Debug),
        behaviour,
        1,
        RuntimeOptions {
            exit_when_idle: false,
        },
    )
}

fn trigger(core: &mut CoreRuntime, task: TaskId, reason: TriggerReason) -> CoreStep {
    core.step(RuntimeEvent::TaskTriggered { task, reason })
}

fn complete(core: &mut CoreRuntime, task: TaskId) -> CoreStep {
    core.step(RuntimeEvent::TaskCompleted {
        task,
        outcome: TaskOutcome::Success,
    })
}

/// Run the initial debug build to completion.
fn initial_build(core: &mut CoreRuntime) {
    trigger(core, TaskId::Clean, TriggerReason::Manual);
    for task in TaskId::ALL {
        complete(core, task);
    }
    assert!(core.is_idle());
}

#[test]
fn scripts_change_reruns_only_scripts() {
    let mut core = watching_core(TriggerWhileRunningBehaviour::Queue);
    initial_build(&mut core);

    let step = trigger(&mut core, TaskId::Scripts, TriggerReason::FileWatch);
    assert_eq!(step.dispatched(), vec![TaskId::Scripts]);
    for task in [TaskId::Clean, TaskId::Styles, TaskId::Images] {
        assert_eq!(core.run_state_of(task), TaskRunState::NotInRun);
    }

    let step = complete(&mut core, TaskId::Scripts);
    assert!(step.keep_running);
    assert_eq!(step.finished_runs().len(), 1);
    assert_eq!(step.finished_runs()[0].succeeded(), vec![TaskId::Scripts]);
}

#[test]
fn styles_change_during_scripts_rebuild_runs_in_parallel() {
    let mut core = watching_core(TriggerWhileRunningBehaviour::Queue);
    initial_build(&mut core);

    trigger(&mut core, TaskId::Scripts, TriggerReason::FileWatch);
    let step = trigger(&mut core, TaskId::Styles, TriggerReason::FileWatch);

    assert_eq!(step.dispatched(), vec![TaskId::Styles]);
    assert_eq!(core.run_state_of(TaskId::Scripts), TaskRunState::Running);
    assert!(core.queue_is_empty());
}

#[test]
fn burst_during_rebuild_coalesces_into_one_follow_up() {
    let mut core = watching_core(TriggerWhileRunningBehaviour::Queue);
    initial_build(&mut core);

    trigger(&mut core, TaskId::Styles, TriggerReason::FileWatch);
    for _ in 0..10 {
        let step = trigger(&mut core, TaskId::Styles, TriggerReason::FileWatch);
        assert!(step.dispatched().is_empty(), "never two styles instances at once");
    }

    let step = complete(&mut core, TaskId::Styles);
    assert_eq!(step.dispatched(), vec![TaskId::Styles]);
    assert!(core.queue_is_empty());

    let step = complete(&mut core, TaskId::Styles);
    assert!(step.dispatched().is_empty());
    assert!(core.is_idle());
}

#[test]
fn triggers_during_initial_build_are_queued_until_it_finishes() {
    let mut core = watching_core(TriggerWhileRunningBehaviour::Queue);
    trigger(&mut core, TaskId::Clean, TriggerReason::Manual);

    let step = trigger(&mut core, TaskId::Scripts, TriggerReason::FileWatch);
    assert!(step.dispatched().is_empty());
    assert!(!core.queue_is_empty());

    complete(&mut core, TaskId::Clean);
    complete(&mut core, TaskId::Styles);
    complete(&mut core, TaskId::Images);
    let step = complete(&mut core, TaskId::Scripts);

    assert_eq!(step.finished_runs().len(), 1);
    assert_eq!(step.dispatched(), vec![TaskId::Scripts]);
}

#[test]
fn cancel_keeps_latest_trigger_per_task() {
    let mut core = watching_core(TriggerWhileRunningBehaviour::Cancel);
    trigger(&mut core, TaskId::Clean, TriggerReason::Manual);

    trigger(&mut core, TaskId::Styles, TriggerReason::FileWatch);
    trigger(&mut core, TaskId::Scripts, TriggerReason::FileWatch);
    trigger(&mut core, TaskId::Scripts, TriggerReason::FileWatch);

    complete(&mut core, TaskId::Clean);
    complete(&mut core, TaskId::Styles);
    complete(&mut core, TaskId::Images);
    let step = complete(&mut core, TaskId::Scripts);

    // One follow-up each: styles is not dropped by the later scripts trigger.
    assert_eq!(step.dispatched(), vec![TaskId::Styles, TaskId::Scripts]);
}

#[test]
fn failed_rebuild_keeps_watching() {
    let mut core = watching_core(TriggerWhileRunningBehaviour::Queue);
    initial_build(&mut core);

    trigger(&mut core, TaskId::Styles, TriggerReason::FileWatch);
    let step = core.step(RuntimeEvent::TaskCompleted {
        task: TaskId::Styles,
        outcome: TaskOutcome::Failed,
    });
    assert!(step.keep_running);
    assert_eq!(step.finished_runs()[0].failed(), vec![TaskId::Styles]);

    let step = trigger(&mut core, TaskId::Styles, TriggerReason::FileWatch);
    assert_eq!(step.dispatched(), vec![TaskId::Styles]);
}
