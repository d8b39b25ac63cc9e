//! End-to-end scheduling scenarios
//!
//! Drives the scheduler the way an embedding host does: register work from
//! the synchronous script, then call `run_to_completion` once.

use async_runtime::{
    Continuation, FailurePolicy, RunOutcome, Scheduler, SchedulerConfig, Task, TaskContext,
    TaskKind,
};
use core_types::CallbackError;
use integration_tests::Console;

fn log_task(console: &Console, line: &'static str) -> Task {
    let console = console.clone();
    Task::new(move |_| {
        console.log(line);
        Ok(())
    })
}

#[test]
fn nested_timers_and_promises() {
    let console = Console::new();
    let mut scheduler = Scheduler::new();

    let c = console.clone();
    scheduler.enqueue_macrotask(move |cx| {
        c.log("timeout A");
        cx.enqueue(TaskKind::Microtask, log_task(&c, "promise inside A"));
        cx.enqueue(TaskKind::Macrotask, log_task(&c, "timeout inside A"));
        Ok(())
    });
    scheduler.enqueue(TaskKind::Macrotask, log_task(&console, "timeout B"));
    scheduler.enqueue(TaskKind::Microtask, log_task(&console, "script promise"));

    scheduler.run_to_completion().unwrap();
    assert_eq!(
        console.lines(),
        vec![
            "script promise",
            "timeout A",
            "promise inside A",
            "timeout B",
            "timeout inside A",
        ]
    );
}

#[test]
fn cleared_timer_is_skipped() {
    let console = Console::new();
    let mut scheduler = Scheduler::new();

    let doomed = scheduler.enqueue(TaskKind::Macrotask, log_task(&console, "never"));
    let c = console.clone();
    scheduler.enqueue_microtask(move |cx| {
        c.log("clearTimeout");
        cx.cancel(doomed);
        Ok(())
    });
    scheduler.enqueue(TaskKind::Macrotask, log_task(&console, "kept"));

    scheduler.run_to_completion().unwrap();
    assert_eq!(console.lines(), vec!["clearTimeout", "kept"]);
}

#[test]
fn rejected_promise_does_not_halt_loop() {
    let console = Console::new();
    let mut scheduler = Scheduler::new();

    let reported = Console::new();
    let r = reported.clone();
    scheduler.set_error_handler(move |failure| {
        r.log(format!("{}: {}", failure.task.kind(), failure.error));
    });

    scheduler.enqueue_microtask(|_| Err(CallbackError::new("unhandled rejection")));
    scheduler.enqueue(TaskKind::Microtask, log_task(&console, "next reaction"));
    scheduler.enqueue(TaskKind::Macrotask, log_task(&console, "timer"));

    scheduler.run_to_completion().unwrap();
    assert_eq!(console.lines(), vec!["next reaction", "timer"]);
    assert_eq!(reported.lines(), vec!["microtask: unhandled rejection"]);
}

#[test]
fn propagated_failure_can_be_resumed() {
    let console = Console::new();
    let mut scheduler = Scheduler::with_config(SchedulerConfig {
        failure_policy: FailurePolicy::Propagate,
        record_failures: true,
    });

    scheduler.enqueue_macrotask(|_| Err("timer threw".into()));
    scheduler.enqueue(TaskKind::Macrotask, log_task(&console, "second timer"));

    let err = scheduler.run_to_completion().unwrap_err();
    assert!(err.is_recoverable());
    assert!(console.lines().is_empty());

    scheduler.run_to_completion().unwrap();
    assert_eq!(console.lines(), vec!["second timer"]);
    assert_eq!(scheduler.take_failures().len(), 1);
}

#[test]
fn async_functions_interleave_at_await_points() {
    let console = Console::new();
    let mut scheduler = Scheduler::new();

    for name in ["a", "b"] {
        let (c1, c2) = (console.clone(), console.clone());
        Continuation::new()
            .with_label(name)
            .then(move |_| {
                c1.log(format!("{name} resumed once"));
                Ok(())
            })
            .then(move |_| {
                c2.log(format!("{name} resumed twice"));
                Ok(())
            })
            .start(&mut scheduler);
    }
    scheduler.enqueue(TaskKind::Macrotask, log_task(&console, "timer"));

    scheduler.run_to_completion().unwrap();
    assert_eq!(
        console.lines(),
        vec![
            "a resumed once",
            "b resumed once",
            "a resumed twice",
            "b resumed twice",
            "timer",
        ]
    );
}

fn ping(cx: &mut TaskContext<'_>) -> Result<(), CallbackError> {
    cx.enqueue_microtask(ping);
    Ok(())
}

#[test]
fn microtask_loop_starves_timers() {
    let console = Console::new();
    let mut scheduler = Scheduler::new();

    scheduler.enqueue(TaskKind::Macrotask, log_task(&console, "starved"));
    scheduler.enqueue_microtask(ping);

    let outcome = scheduler.run_bounded(5_000).unwrap();
    assert_eq!(outcome, RunOutcome::BudgetExhausted { callbacks: 5_000 });
    assert!(console.lines().is_empty());
    assert_eq!(scheduler.pending_macrotasks(), 1);
}
