//! The console context shared by every command in a tree.
//!
//! A [`ShellContext`] is created once per session and handed to every command
//! when it is registered. It gives commands access to the console, delivers
//! registration notifications to observers and holds lines that commands want
//! the session to execute next.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::command::Command;
use crate::console::{Console, OutputLevel};
use crate::help::HelpIndex;

/// Notification delivered once per successful registration.
#[derive(Debug, Clone, Copy)]
pub struct CommandRegistered<'a> {
    /// The command that was attached.
    pub command: &'a Command,
    /// Primary name of the container it was attached to.
    pub container: &'a str,
}

type Observer = Arc<dyn Fn(&CommandRegistered<'_>) + Send + Sync>;

/// Cheap-to-clone handle to the console and session-wide bookkeeping.
#[derive(Clone)]
pub struct ShellContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    console: Arc<dyn Console>,
    observers: RwLock<Vec<Observer>>,
    notifying: AtomicBool,
    pending: Mutex<VecDeque<String>>,
    help: Arc<HelpIndex>,
}

impl ShellContext {
    /// Create a context around `console`.
    ///
    /// The context starts with one observer that feeds its [`HelpIndex`].
    pub fn new(console: Arc<dyn Console>) -> Self {
        let help = Arc::new(HelpIndex::new());
        let context = Self {
            inner: Arc::new(ContextInner {
                console,
                observers: RwLock::new(Vec::new()),
                notifying: AtomicBool::new(false),
                pending: Mutex::new(VecDeque::new()),
                help: Arc::clone(&help),
            }),
        };
        context.subscribe(move |event| help.record(event));
        context
    }

    /// The console port.
    pub fn console(&self) -> &dyn Console {
        self.inner.console.as_ref()
    }

    /// A shared handle to the console port.
    pub fn console_handle(&self) -> Arc<dyn Console> {
        Arc::clone(&self.inner.console)
    }

    /// Shorthand for `console().write(..)`.
    pub fn write(&self, text: &str, level: OutputLevel) {
        self.inner.console.write(text, level);
    }

    /// Whether both handles refer to the same context.
    pub fn same_as(&self, other: &ShellContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------
    // Registration events
    // ------------------------------------------------------------------

    /// Add an observer for registration notifications.
    ///
    /// Observers must not register commands; doing so through this context
    /// fails with [`ShellError::ReentrantRegistration`](crate::ShellError::ReentrantRegistration).
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&CommandRegistered<'_>) + Send + Sync + 'static,
    {
        self.inner.observers.write().push(Arc::new(observer));
    }

    /// Whether a registration notification is being delivered right now.
    pub fn is_notifying(&self) -> bool {
        self.inner.notifying.load(Ordering::Acquire)
    }

    pub(crate) fn notify_registered(&self, event: &CommandRegistered<'_>) {
        let observers = self.inner.observers.read().clone();
        let _guard = NotifyingGuard::enter(&self.inner.notifying);
        for observer in &observers {
            observer(event);
        }
    }

    /// Flattened help index built from registration notifications.
    pub fn help_index(&self) -> &HelpIndex {
        &self.inner.help
    }

    // ------------------------------------------------------------------
    // Pending input
    // ------------------------------------------------------------------

    /// Queue lines for the session loop to execute before reading the console.
    ///
    /// The lines run in order and ahead of anything already pending, so a
    /// script that queues another script runs it inline.
    pub fn inject_lines<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let mut pending = self.inner.pending.lock();
        for line in lines.into_iter().rev() {
            pending.push_front(line);
        }
    }

    /// Take the next pending line, if any.
    pub fn next_pending_line(&self) -> Option<String> {
        self.inner.pending.lock().pop_front()
    }

    /// Number of pending lines.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Drop all pending lines.
    pub fn clear_pending(&self) {
        self.inner.pending.lock().clear();
    }
}

impl fmt::Debug for ShellContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellContext")
            .field("observers", &self.inner.observers.read().len())
            .field("notifying", &self.is_notifying())
            .field("pending", &self.pending_len())
            .finish()
    }
}

/// Resets the notifying flag even if an observer panics.
struct NotifyingGuard<'a> {
    flag: &'a AtomicBool,
    previous: bool,
}

impl<'a> NotifyingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        let previous = flag.swap(true, Ordering::AcqRel);
        Self { flag, previous }
    }
}

impl Drop for NotifyingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(self.previous, Ordering::Release);
    }
}
