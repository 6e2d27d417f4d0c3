#![forbid(unsafe_code)]

//! UI-thread task queue and marshaller.
//!
//! Every control write must happen on one designated thread. This module
//! provides the two halves of that rule:
//!
//! - [`UiRuntime`] lives on the UI thread and owns the receiving end of the
//!   task queue. The host event loop drains it with
//!   [`process_pending`](UiRuntime::process_pending) or
//!   [`pump`](UiRuntime::pump).
//! - [`Marshaller`] is a cheap, cloneable handle that any thread uses to
//!   get a closure executed on the UI thread, optionally waiting for it.
//!
//! # Queue discipline
//!
//! The queue is a bounded channel with a single slot
//! ([`QUEUE_CAPACITY`]). A submitter blocks while the slot is occupied, which
//! throttles bursts of background updates to the UI thread's throughput.
//! Tasks run in dequeue order.
//!
//! # Invariants
//!
//! 1. A task submitted from the UI thread runs inline, before `execute`
//!    returns.
//! 2. A blocking `execute` returns only after the task ran, or with an error
//!    once it is certain the task never will.
//! 3. A headless marshaller runs every task inline on the caller and builds
//!    no-op view updaters.
//!
//! # Failure Modes
//!
//! - **UI runtime dropped**: submissions fail with
//!   [`MarshalError::UiThreadGone`]; queued tasks are discarded and their
//!   blocking submitters get [`MarshalError::TaskAbandoned`].
//! - **Task panics on the UI thread**: the panic propagates out of the
//!   draining call; a blocking submitter gets `TaskAbandoned`.
//! - **UI thread alive but never draining**: a blocking submitter waits
//!   forever. Draining the queue is the host's responsibility.

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};
use std::time::Duration;

use bindwire_core::{Accessors, Control};
use tracing::{info, trace, warn};

use crate::config::MarshallerConfig;

/// Capacity of the task queue: the single pending-call slot.
pub const QUEUE_CAPACITY: usize = 1;

/// Poll interval used by [`UiRuntime::run_until`].
const RUN_UNTIL_TICK: Duration = Duration::from_millis(5);

type Task = Box<dyn FnOnce() + Send>;

/// Reusable, thread-safe callback produced by
/// [`Marshaller::wrap_for_repeated_ui_update`].
pub type UiUpdater = Arc<dyn Fn() + Send + Sync>;

// ============================================================================
// Errors
// ============================================================================

/// Errors from marshaller setup and task submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarshalError {
    /// Attempted to attach to a UI runtime from a different thread.
    NotOnUiThread,
    /// The UI runtime was dropped; nothing will drain the queue.
    UiThreadGone,
    /// The task was dropped without completing (UI runtime dropped with the
    /// task queued, or the task panicked).
    TaskAbandoned,
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOnUiThread => {
                write!(f, "marshaller must be initialized on the UI thread")
            }
            Self::UiThreadGone => write!(f, "UI runtime is gone; task was not queued"),
            Self::TaskAbandoned => write!(f, "UI task was dropped before it completed"),
        }
    }
}

impl std::error::Error for MarshalError {}

// ============================================================================
// UI runtime
// ============================================================================

/// The UI thread's end of the task queue.
///
/// Created on the designated UI thread. Draining calls made from any other
/// thread are refused, so tasks only ever run where the runtime was created.
pub struct UiRuntime {
    thread: ThreadId,
    sender: SyncSender<Task>,
    receiver: Receiver<Task>,
}

impl UiRuntime {
    /// Create the runtime; the calling thread becomes the UI thread.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::sync_channel::<Task>(QUEUE_CAPACITY);
        Self {
            thread: thread::current().id(),
            sender,
            receiver,
        }
    }

    #[must_use]
    pub fn thread_id(&self) -> ThreadId {
        self.thread
    }

    /// A marshaller attached to this runtime with default configuration.
    ///
    /// Shorthand for `Marshaller::initialize(Some(self))`: fails with
    /// [`MarshalError::NotOnUiThread`] when called off the runtime's thread.
    pub fn marshaller(&self) -> Result<Marshaller, MarshalError> {
        Marshaller::initialize(Some(self))
    }

    fn on_own_thread(&self) -> bool {
        let current = thread::current().id();
        if current != self.thread {
            warn!(
                ui_thread = ?self.thread,
                caller = ?current,
                "UI queue drained off the UI thread; refusing"
            );
            return false;
        }
        true
    }

    /// Run every task currently queued. Returns how many ran.
    pub fn process_pending(&self) -> usize {
        if !self.on_own_thread() {
            return 0;
        }
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "Drained UI tasks");
        }
        ran
    }

    /// Wait up to `timeout` for a task, then drain the queue.
    pub fn pump(&self, timeout: Duration) -> usize {
        if !self.on_own_thread() {
            return 0;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(task) => {
                task();
                1 + self.process_pending()
            }
            // The runtime holds a sender, so the queue never disconnects.
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Pump until `done` returns true. Returns how many tasks ran.
    ///
    /// Returns immediately when called off the UI thread.
    pub fn run_until(&self, mut done: impl FnMut() -> bool) -> usize {
        if !self.on_own_thread() {
            return 0;
        }
        let mut ran = self.process_pending();
        while !done() {
            ran += self.pump(RUN_UNTIL_TICK);
        }
        ran
    }
}

impl Default for UiRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UiRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiRuntime")
            .field("thread", &self.thread)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Marshaller
// ============================================================================

#[derive(Clone)]
enum Mode {
    Headless,
    Attached {
        ui_thread: ThreadId,
        sender: SyncSender<Task>,
    },
}

/// Handle for running closures on the UI thread.
#[derive(Clone)]
pub struct Marshaller {
    mode: Mode,
    config: MarshallerConfig,
}

impl Marshaller {
    /// Attach to `runtime`, or go headless when there is none.
    ///
    /// Must be called on the runtime's thread. Calling it again for the same
    /// runtime yields an equivalent handle.
    pub fn initialize(runtime: Option<&UiRuntime>) -> Result<Self, MarshalError> {
        Self::initialize_with_config(runtime, MarshallerConfig::default())
    }

    pub fn initialize_with_config(
        runtime: Option<&UiRuntime>,
        config: MarshallerConfig,
    ) -> Result<Self, MarshalError> {
        match runtime {
            Some(runtime) if !config.headless => {
                if thread::current().id() != runtime.thread {
                    warn!(
                        ui_thread = ?runtime.thread,
                        caller = ?thread::current().id(),
                        "Marshaller initialized off the UI thread"
                    );
                    return Err(MarshalError::NotOnUiThread);
                }
                info!(ui_thread = ?runtime.thread, ?config, "Marshaller attached to UI runtime");
                Ok(Self::attach(runtime, config))
            }
            _ => {
                info!(
                    "Running without a UI runtime; callbacks run on the caller's thread \
                     and view updates are ignored"
                );
                Ok(Self {
                    mode: Mode::Headless,
                    config,
                })
            }
        }
    }

    /// A headless marshaller.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            mode: Mode::Headless,
            config: MarshallerConfig::headless(),
        }
    }

    fn attach(runtime: &UiRuntime, config: MarshallerConfig) -> Self {
        Self {
            mode: Mode::Attached {
                ui_thread: runtime.thread,
                sender: runtime.sender.clone(),
            },
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> MarshallerConfig {
        self.config
    }

    #[must_use]
    pub fn is_headless(&self) -> bool {
        matches!(self.mode, Mode::Headless)
    }

    /// Whether the calling thread is the UI thread. Always true when headless.
    #[must_use]
    pub fn on_ui_thread(&self) -> bool {
        match &self.mode {
            Mode::Headless => true,
            Mode::Attached { ui_thread, .. } => thread::current().id() == *ui_thread,
        }
    }

    /// Run `task` on the UI thread.
    ///
    /// On the UI thread (or headless) the task runs inline. Otherwise it is
    /// queued; with `blocking` the call waits until it has run.
    pub fn execute<F>(&self, task: F, blocking: bool) -> Result<(), MarshalError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = match &self.mode {
            Mode::Attached { ui_thread, sender } if thread::current().id() != *ui_thread => sender,
            _ => {
                task();
                return Ok(());
            }
        };

        if !blocking {
            trace!("Queueing UI task");
            return sender
                .send(Box::new(task))
                .map_err(|_| MarshalError::UiThreadGone);
        }

        let (done_tx, done_rx) = mpsc::sync_channel::<()>(1);
        let wrapped: Task = Box::new(move || {
            task();
            let _ = done_tx.send(());
        });
        trace!("Queueing blocking UI task");
        sender.send(wrapped).map_err(|_| MarshalError::UiThreadGone)?;
        done_rx.recv().map_err(|_| MarshalError::TaskAbandoned)
    }

    /// Build a reusable updater that pushes a model value into a control.
    ///
    /// Each call reads the value through `supply` on the calling thread,
    /// then marshals only the write. The control's change signals are
    /// blocked for the duration of the write. `supply` returning `None`
    /// (for example because the model was dropped) skips the update, as
    /// does a dropped control.
    ///
    /// Headless marshallers return a no-op.
    pub fn wrap_for_repeated_ui_update<V, S>(
        &self,
        control: Weak<dyn Control>,
        accessors: Accessors<V>,
        supply: S,
    ) -> UiUpdater
    where
        V: Send + 'static,
        S: Fn() -> Option<V> + Send + Sync + 'static,
    {
        if self.is_headless() {
            return Arc::new(|| {});
        }
        let marshaller = self.clone();
        let blocking = self.config.blocking_view_updates;
        Arc::new(move || {
            let Some(value) = supply() else {
                return;
            };
            let control = control.clone();
            let accessors = accessors.clone();
            let write = move || {
                let Some(control) = control.upgrade() else {
                    return;
                };
                let _blocked = control.signals().block();
                if !accessors.write(control.as_ref(), value) {
                    warn!(
                        control_type = control.control_type().name(),
                        "View update could not reach its component"
                    );
                }
            };
            if let Err(err) = marshaller.execute(write, blocking) {
                warn!(error = %err, "View update was not delivered");
            }
        })
    }
}

impl fmt::Debug for Marshaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Marshaller");
        match &self.mode {
            Mode::Headless => s.field("mode", &"headless"),
            Mode::Attached { ui_thread, .. } => s.field("ui_thread", ui_thread),
        };
        s.field("config", &self.config).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
