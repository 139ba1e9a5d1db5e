//! Background task dispatcher.
//!
//! * [`Task`]: a work closure plus an optional cleanup step.
//! * [`TaskDispatcher`]: runs one task at a time on a worker thread and
//!   reports [`TaskEvent`]s back to the owning (UI) thread.
//! * [`DispatcherState`]: `Idle` / `Busy`.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use polar_translate::dispatch::{Task, TaskDispatcher, TaskEvent};
//! use polar_translate::translate::TranslationResult;
//!
//! let mut dispatcher = TaskDispatcher::new();
//! let accepted = dispatcher.submit(Task::new("Translating...", || {
//!     Ok(TranslationResult::success("hola"))
//! }));
//! assert!(accepted);
//!
//! while let Some(event) = dispatcher.next_event_timeout(Duration::from_secs(1)) {
//!     if event == TaskEvent::Completed {
//!         break;
//!     }
//! }
//! ```

pub mod dispatcher;
pub mod state;
pub mod task;

pub use dispatcher::TaskDispatcher;
pub use state::{DispatcherState, TaskEvent};
pub use task::Task;
