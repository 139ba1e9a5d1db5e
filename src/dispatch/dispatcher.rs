//! Single-slot background task runner.
//!
//! [`TaskDispatcher`] is owned by the UI thread.  `submit` hands a [`Task`]
//! to a freshly spawned worker thread; the worker reports back over a
//! `std::sync::mpsc` channel which the UI drains once per frame with
//! [`TaskDispatcher::try_next_event`].
//!
//! # Worker flow
//!
//! ```text
//! submit(task)
//!   └─▶ Started{status}                      (sent before submit returns)
//!       └─▶ thread "task-N": work()          (under catch_unwind)
//!             ├─ Ok(result), well-formed  ─▶ Result(result)
//!             └─ Ok(malformed) / Err / panic ─▶ Error{message}
//!           └─▶ cleanup()                    (failures logged only)
//!           └─▶ Completed
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::time::Duration;

use super::state::{DispatcherState, TaskEvent};
use super::task::{CleanupFn, Task, WorkFn};

pub struct TaskDispatcher {
    state: DispatcherState,
    events_tx: Sender<TaskEvent>,
    events_rx: Receiver<TaskEvent>,
    /// Signalled by the worker after it sent `Completed`.
    in_flight: Option<Receiver<()>>,
    next_id: u64,
}

impl TaskDispatcher {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            state: DispatcherState::Idle,
            events_tx,
            events_rx,
            in_flight: None,
            next_id: 1,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Start `task` in the background.
    ///
    /// Returns `false` without spawning or emitting anything when a previous
    /// task's `Completed` event has not been observed yet.
    #[must_use = "a rejected task never runs"]
    pub fn submit(&mut self, task: Task) -> bool {
        if self.state.is_busy() {
            log::warn!("dispatch: rejected '{}': a task is still running", task.status());
            return false;
        }

        let id = self.next_id;
        self.next_id += 1;

        log::debug!(
            "dispatch: task {id} started: {} (cleanup: {})",
            task.status(),
            task.has_cleanup()
        );
        let Task {
            status,
            work,
            cleanup,
        } = task;

        // The dispatcher holds a receiver, so this send cannot fail.
        let _ = self.events_tx.send(TaskEvent::Started { status });
        self.state = DispatcherState::Busy;

        let (done_tx, done_rx) = mpsc::sync_channel(1);
        let events = self.events_tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("task-{id}"))
            .spawn(move || run_task(id, work, cleanup, events, done_tx));

        match spawned {
            Ok(_) => self.in_flight = Some(done_rx),
            Err(e) => {
                log::error!("dispatch: cannot spawn worker for task {id}: {e}");
                let _ = self.events_tx.send(TaskEvent::Error {
                    message: format!("Could not start background task: {e}"),
                });
                let _ = self.events_tx.send(TaskEvent::Completed);
            }
        }
        true
    }

    /// Next pending event, if any.  Never blocks.
    pub fn try_next_event(&mut self) -> Option<TaskEvent> {
        let event = self.events_rx.try_recv().ok()?;
        self.observe(&event);
        Some(event)
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_event_timeout(&mut self, timeout: Duration) -> Option<TaskEvent> {
        let event = self.events_rx.recv_timeout(timeout).ok()?;
        self.observe(&event);
        Some(event)
    }

    /// All events that are pending right now.
    pub fn drain_events(&mut self) -> Vec<TaskEvent> {
        std::iter::from_fn(|| self.try_next_event()).collect()
    }

    /// Wait up to `timeout` for the in-flight task to finish.
    ///
    /// Returns `false` if the task is still running; it is then abandoned and
    /// dies with the process.  Pending events are left in the channel.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        let Some(done) = self.in_flight.take() else {
            return true;
        };

        match done.recv_timeout(timeout) {
            // A disconnect means the worker is gone as well.
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                log::debug!("dispatch: shut down cleanly");
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "dispatch: task still running after {} ms, abandoning it",
                    timeout.as_millis()
                );
                self.in_flight = Some(done);
                false
            }
        }
    }

    fn observe(&mut self, event: &TaskEvent) {
        if *event == TaskEvent::Completed {
            self.state = DispatcherState::Idle;
            self.in_flight = None;
        }
    }
}

impl Default for TaskDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

fn run_task(
    id: u64,
    work: WorkFn,
    cleanup: Option<CleanupFn>,
    events: Sender<TaskEvent>,
    done: SyncSender<()>,
) {
    let outcome = match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(Ok(result)) => match result.validate() {
            Ok(()) => TaskEvent::Result(result),
            Err(e) => TaskEvent::Error {
                message: format!("Task returned an invalid result: {e}"),
            },
        },
        Ok(Err(e)) => TaskEvent::Error {
            message: describe_error(&e),
        },
        Err(payload) => TaskEvent::Error {
            message: describe_panic(payload.as_ref()),
        },
    };

    match &outcome {
        TaskEvent::Error { message } => log::warn!("dispatch: task {id} failed: {message}"),
        _ => log::debug!("dispatch: task {id} produced a result"),
    }
    // A dropped dispatcher has no consumer left; keep going so cleanup runs.
    let _ = events.send(outcome);

    if let Some(cleanup) = cleanup {
        match panic::catch_unwind(AssertUnwindSafe(cleanup)) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("dispatch: cleanup for task {id} failed: {e:#}"),
            Err(payload) => log::warn!(
                "dispatch: cleanup for task {id} panicked: {}",
                panic_text(payload.as_ref()).unwrap_or("unknown cause")
            ),
        }
    }

    log::debug!("dispatch: task {id} completed");
    let _ = events.send(TaskEvent::Completed);
    let _ = done.try_send(());
}

fn describe_error(e: &anyhow::Error) -> String {
    let message = format!("{e:#}");
    if message.trim().is_empty() {
        "Task failed without an error description".to_string()
    } else {
        message
    }
}

fn describe_panic(payload: &(dyn Any + Send)) -> String {
    match panic_text(payload) {
        Some(text) if !text.trim().is_empty() => format!("Task panicked: {text}"),
        _ => "Task panicked".to_string(),
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::translate::TranslationResult;

    const WAIT: Duration = Duration::from_secs(5);

    /// Collect events until (and including) `Completed`.
    fn events_until_completed(dispatcher: &mut TaskDispatcher) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        while let Some(event) = dispatcher.next_event_timeout(WAIT) {
            let done = event == TaskEvent::Completed;
            events.push(event);
            if done {
                return events;
            }
        }
        panic!("no Completed event within {WAIT:?}; got {events:?}");
    }

    fn started(status: &str) -> TaskEvent {
        TaskEvent::Started {
            status: status.to_string(),
        }
    }

    fn error_message(events: &[TaskEvent]) -> String {
        match &events[1] {
            TaskEvent::Error { message } => message.clone(),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    fn temp_file() -> PathBuf {
        let path = tempfile::NamedTempFile::new()
            .unwrap()
            .into_temp_path()
            .keep()
            .unwrap();
        assert!(path.exists());
        path
    }

    // ---- delivery ---

    #[test]
    fn started_is_emitted_before_submit_returns() {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let mut dispatcher = TaskDispatcher::new();

        let accepted = dispatcher.submit(Task::new("x", move || {
            let _ = gate_rx.recv();
            Ok(TranslationResult::success("hola"))
        }));
        assert!(accepted);
        assert_eq!(dispatcher.try_next_event(), Some(started("x")));
        assert!(dispatcher.is_busy());

        gate_tx.send(()).unwrap();
        let rest = events_until_completed(&mut dispatcher);
        assert_eq!(
            rest,
            vec![
                TaskEvent::Result(TranslationResult::success("hola")),
                TaskEvent::Completed
            ]
        );
    }

    #[test]
    fn success_is_delivered_exactly() {
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.submit(Task::new("x", || Ok(TranslationResult::success("hola")))));

        let events = events_until_completed(&mut dispatcher);
        assert_eq!(
            events,
            vec![
                started("x"),
                TaskEvent::Result(TranslationResult::success("hola")),
                TaskEvent::Completed,
            ]
        );
        assert_eq!(dispatcher.state(), DispatcherState::Idle);
    }

    #[test]
    fn well_formed_failure_is_a_result() {
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.submit(Task::new("x", || {
            Ok(TranslationResult::failure("Unsupported source language: xx"))
        })));

        let events = events_until_completed(&mut dispatcher);
        assert_eq!(
            events[1],
            TaskEvent::Result(TranslationResult::failure("Unsupported source language: xx"))
        );
    }

    // ---- failures ---

    #[test]
    fn work_error_becomes_error_event() {
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.submit(Task::new("x", || anyhow::bail!("net down"))));

        let events = events_until_completed(&mut dispatcher);
        assert_eq!(events.len(), 3);
        assert_eq!(error_message(&events), "net down");
        assert_eq!(events[2], TaskEvent::Completed);
    }

    #[test]
    fn error_context_is_kept() {
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.submit(Task::new("x", || {
            Err(anyhow::anyhow!("connection refused").context("translate request"))
        })));

        let message = error_message(&events_until_completed(&mut dispatcher));
        assert_eq!(message, "translate request: connection refused");
    }

    #[test]
    fn empty_error_gets_a_description() {
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.submit(Task::new("x", || Err(anyhow::anyhow!("")))));

        let message = error_message(&events_until_completed(&mut dispatcher));
        assert!(!message.trim().is_empty());
    }

    #[test]
    fn panic_becomes_error_event() {
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.submit(Task::new("x", || panic!("boom"))));

        let events = events_until_completed(&mut dispatcher);
        assert_eq!(events.len(), 3);
        assert!(error_message(&events).contains("boom"));
    }

    #[test]
    fn malformed_result_becomes_error_event() {
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.submit(Task::new("x", || Ok(TranslationResult::failure("  ")))));

        let events = events_until_completed(&mut dispatcher);
        assert!(!error_message(&events).trim().is_empty());
    }

    // ---- busy policy ---

    #[test]
    fn submit_while_busy_is_rejected_silently() {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let second_ran = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = TaskDispatcher::new();

        assert!(dispatcher.submit(Task::new("first", move || {
            let _ = gate_rx.recv();
            Ok(TranslationResult::success("one"))
        })));
        assert_eq!(dispatcher.try_next_event(), Some(started("first")));

        let counter = Arc::clone(&second_ran);
        let rejected = !dispatcher.submit(Task::new("second", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(TranslationResult::success("two"))
        }));
        assert!(rejected);
        assert_eq!(dispatcher.try_next_event(), None);

        gate_tx.send(()).unwrap();
        let events = events_until_completed(&mut dispatcher);
        assert_eq!(events[0], TaskEvent::Result(TranslationResult::success("one")));
        assert_eq!(second_ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn resubmit_requires_observing_completed() {
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.submit(Task::new("first", || Ok(TranslationResult::success("a")))));

        // The worker is finished, but Completed has not been consumed yet.
        assert!(dispatcher.shutdown(WAIT));
        assert!(!dispatcher.submit(Task::new("early", || Ok(TranslationResult::success("b")))));

        let events = dispatcher.drain_events();
        assert_eq!(events.last(), Some(&TaskEvent::Completed));
        assert!(!dispatcher.is_busy());

        assert!(dispatcher.submit(Task::new("second", || Ok(TranslationResult::success("c")))));
        let events = events_until_completed(&mut dispatcher);
        assert_eq!(events[0], started("second"));
        assert_eq!(events[1], TaskEvent::Result(TranslationResult::success("c")));
    }

    #[test]
    fn dispatcher_is_reusable_after_failure() {
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.submit(Task::new("x", || panic!("first"))));
        events_until_completed(&mut dispatcher);

        assert!(dispatcher.submit(Task::new("y", || Ok(TranslationResult::success("ok")))));
        let events = events_until_completed(&mut dispatcher);
        assert_eq!(events[1], TaskEvent::Result(TranslationResult::success("ok")));
    }

    // ---- cleanup ---

    #[test]
    fn cleanup_removes_temp_file_after_success() {
        let path = temp_file();
        let mut dispatcher = TaskDispatcher::new();
        let task = Task::new("ocr", || Ok(TranslationResult::success("hola")))
            .remove_file_on_completion(path.clone());
        assert!(dispatcher.submit(task));

        events_until_completed(&mut dispatcher);
        assert!(!path.exists());
    }

    #[test]
    fn cleanup_removes_temp_file_after_failure() {
        let path = temp_file();
        let mut dispatcher = TaskDispatcher::new();
        let task = Task::new("ocr", || anyhow::bail!("tesseract missing"))
            .remove_file_on_completion(path.clone());
        assert!(dispatcher.submit(task));

        let events = events_until_completed(&mut dispatcher);
        assert_eq!(error_message(&events), "tesseract missing");
        assert!(!path.exists());
    }

    #[test]
    fn cleanup_runs_before_completed() {
        let path = temp_file();
        let mut dispatcher = TaskDispatcher::new();
        let probe = path.clone();
        let task = Task::new("ocr", || Ok(TranslationResult::success("")))
            .remove_file_on_completion(path.clone());
        assert!(dispatcher.submit(task));

        while let Some(event) = dispatcher.next_event_timeout(WAIT) {
            if event == TaskEvent::Completed {
                assert!(!probe.exists());
                return;
            }
        }
        panic!("no Completed event");
    }

    #[test]
    fn cleanup_failure_is_not_surfaced() {
        let mut dispatcher = TaskDispatcher::new();
        let task = Task::new("x", || Ok(TranslationResult::success("hola")))
            .with_cleanup(|| anyhow::bail!("disk full"));
        assert!(dispatcher.submit(task));

        let events = events_until_completed(&mut dispatcher);
        assert_eq!(
            events,
            vec![
                started("x"),
                TaskEvent::Result(TranslationResult::success("hola")),
                TaskEvent::Completed,
            ]
        );
    }

    #[test]
    fn cleanup_panic_is_not_surfaced() {
        let mut dispatcher = TaskDispatcher::new();
        let task = Task::new("x", || anyhow::bail!("net down")).with_cleanup(|| panic!("oops"));
        assert!(dispatcher.submit(task));

        let events = events_until_completed(&mut dispatcher);
        assert_eq!(events.len(), 3);
        assert_eq!(error_message(&events), "net down");
    }

    // ---- shutdown ---

    #[test]
    fn shutdown_when_idle_is_immediate() {
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.shutdown(Duration::from_millis(1)));
    }

    #[test]
    fn shutdown_times_out_on_stuck_task() {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let mut dispatcher = TaskDispatcher::new();
        assert!(dispatcher.submit(Task::new("slow", move || {
            let _ = gate_rx.recv();
            Ok(TranslationResult::success("late"))
        })));

        assert!(!dispatcher.shutdown(Duration::from_millis(50)));

        gate_tx.send(()).unwrap();
        assert!(dispatcher.shutdown(WAIT));
    }

    // ---- helpers ---

    #[test]
    fn panic_payloads_are_described() {
        assert_eq!(describe_panic(&"boom"), "Task panicked: boom");
        assert_eq!(describe_panic(&String::from("bang")), "Task panicked: bang");
        assert_eq!(describe_panic(&42_u32), "Task panicked");
    }
}
