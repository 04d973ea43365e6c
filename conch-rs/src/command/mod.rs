//! The command tree.
//!
//! A [`Command`] is either an [`ActionCommand`] (a leaf that does work) or a
//! [`ContainerCommand`] (a named group that routes to its children). Both
//! share a [`CommandMeta`] and go through the same guarded entry point,
//! [`Command::invoke_with_guard`].

mod action;
mod container;

pub use action::{action_fn, Action, ActionCommand, FnAction, Invocation};
pub use container::ContainerCommand;
pub(crate) use container::suggestions;

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;

use crate::context::ShellContext;
use crate::error::{ShellError, ShellResult};

// ============================================================================
// Metadata
// ============================================================================

/// Which variant a command is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Action,
    Container,
}

/// Names, description and flags common to every command.
#[derive(Debug, Clone)]
pub struct CommandMeta {
    names: Vec<String>,
    description: String,
    help: Vec<String>,
    is_default: bool,
}

impl CommandMeta {
    /// Create metadata with a primary name and no aliases.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            description: description.into(),
            help: Vec::new(),
            is_default: false,
        }
    }

    /// Primary name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    /// Primary name followed by aliases.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Aliases only.
    pub fn aliases(&self) -> &[String] {
        &self.names[1..]
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Extra help lines shown by the `help` command.
    pub fn help_lines(&self) -> &[String] {
        &self.help
    }

    /// Whether the owning container runs this command when no name is given.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Case-insensitive match against the primary name and aliases.
    pub fn matches(&self, token: &str) -> bool {
        self.names.iter().any(|name| same_name(name, token))
    }

    /// Add an alias. Aliases equal to an existing name are ignored.
    pub fn add_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        if !self.matches(&alias) {
            self.names.push(alias);
        }
    }

    pub fn add_help(&mut self, line: impl Into<String>) {
        self.help.push(line.into());
    }

    pub fn set_default(&mut self, is_default: bool) {
        self.is_default = is_default;
    }

    /// Every name must be reachable by the tokenizer.
    pub(crate) fn validate(&self) -> ShellResult<()> {
        for name in &self.names {
            let invalid =
                name.is_empty() || name.contains('"') || name.chars().any(char::is_whitespace);
            if invalid {
                return Err(ShellError::InvalidCommandName { name: name.clone() });
            }
        }
        Ok(())
    }
}

/// Case-insensitive name comparison.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

// ============================================================================
// Command
// ============================================================================

/// A node in the command tree.
pub enum Command {
    Action(ActionCommand),
    Container(ContainerCommand),
}

impl Command {
    pub fn meta(&self) -> &CommandMeta {
        match self {
            Command::Action(action) => action.meta(),
            Command::Container(container) => container.meta(),
        }
    }

    pub fn name(&self) -> &str {
        self.meta().name()
    }

    pub fn names(&self) -> &[String] {
        self.meta().names()
    }

    pub fn description(&self) -> &str {
        self.meta().description()
    }

    pub fn help_lines(&self) -> &[String] {
        self.meta().help_lines()
    }

    pub fn is_default(&self) -> bool {
        self.meta().is_default()
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Action(_) => CommandKind::Action,
            Command::Container(_) => CommandKind::Container,
        }
    }

    /// The container variant, if this is one.
    pub fn as_container(&self) -> Option<&ContainerCommand> {
        match self {
            Command::Container(container) => Some(container),
            Command::Action(_) => None,
        }
    }

    /// Whether the command may run right now.
    ///
    /// Evaluated on every invocation; never cached.
    pub fn can_execute(&self) -> bool {
        match self {
            Command::Action(action) => action.can_execute(),
            Command::Container(container) => container.can_execute(),
        }
    }

    /// The only public execution entry point.
    ///
    /// Checks [`can_execute`](Self::can_execute) and fails with
    /// [`ShellError::NotExecutable`] without running anything when it is
    /// false. Otherwise runs the command with `params` as its parameter
    /// text. `Ok(false)` asks the session to end.
    pub fn invoke_with_guard<'a>(&'a self, params: &'a str) -> BoxFuture<'a, ShellResult<bool>> {
        match self {
            Command::Action(action) => action.invoke_with_guard(params),
            Command::Container(container) => container.invoke_with_guard(params),
        }
    }

    /// Context the command is bound to. `None` for an action not yet registered.
    pub fn context(&self) -> Option<&ShellContext> {
        match self {
            Command::Action(action) => action.context(),
            Command::Container(container) => Some(container.context()),
        }
    }

    /// Bind to the parent's context. `attached` marks a subtree that joined a tree.
    pub(crate) fn on_registered(&mut self, context: &ShellContext, attached: bool) {
        match self {
            Command::Action(action) => action.on_registered(context),
            Command::Container(container) if attached => container.attach(),
            Command::Container(_) => {}
        }
    }
}

impl From<ActionCommand> for Command {
    fn from(action: ActionCommand) -> Self {
        Command::Action(action)
    }
}

impl From<ContainerCommand> for Command {
    fn from(container: ContainerCommand) -> Self {
        Command::Container(container)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Action(action) => action.fmt(f),
            Command::Container(container) => container.fmt(f),
        }
    }
}

/// Shared guard: `body` is only polled once `can_execute` has returned true.
pub(crate) fn guarded<'a, C, F>(
    name: &'a str,
    can_execute: C,
    body: F,
) -> BoxFuture<'a, ShellResult<bool>>
where
    C: FnOnce() -> bool + Send + 'a,
    F: Future<Output = ShellResult<bool>> + Send + 'a,
{
    async move {
        if !can_execute() {
            tracing::debug!(command = %name, "Invocation refused by guard");
            return Err(ShellError::NotExecutable {
                command: name.to_string(),
            });
        }
        body.await
    }
    .boxed()
}
