//! Leaf commands.

use std::fmt;

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::{guarded, CommandMeta};
use crate::console::{Console, OutputLevel};
use crate::context::ShellContext;
use crate::error::{ShellError, ShellResult};
use crate::param::{FromParam, ParamBinder, ParamSlot};
use crate::tokenize::{split_first, tokenize};

/// Behavior of a leaf command.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use conch::{Action, Invocation, ShellResult};
///
/// struct Greet;
///
/// #[async_trait]
/// impl Action for Greet {
///     async fn invoke(&self, inv: &mut Invocation<'_>) -> ShellResult<bool> {
///         let name: String = inv.next_param("Name").await?;
///         inv.info(format!("Hello, {}!", name));
///         Ok(true)
///     }
/// }
/// ```
#[async_trait]
pub trait Action: Send + Sync {
    /// Whether the action may run right now. Checked before every invocation.
    fn can_execute(&self) -> bool {
        true
    }

    /// Run the action. Return `Ok(false)` to end the session.
    async fn invoke(&self, inv: &mut Invocation<'_>) -> ShellResult<bool>;
}

/// Adapter turning a synchronous closure into an [`Action`].
pub struct FnAction<F>(F);

/// Build an action from a closure that needs no prompting.
///
/// ```rust
/// use conch::{action_fn, ActionCommand};
///
/// let exit = ActionCommand::new("exit", "Leave the shell", action_fn(|_inv| Ok(false)));
/// assert_eq!(exit.meta().name(), "exit");
/// ```
pub fn action_fn<F>(f: F) -> FnAction<F>
where
    F: Fn(&mut Invocation<'_>) -> ShellResult<bool> + Send + Sync,
{
    FnAction(f)
}

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: Fn(&mut Invocation<'_>) -> ShellResult<bool> + Send + Sync,
{
    async fn invoke(&self, inv: &mut Invocation<'_>) -> ShellResult<bool> {
        (self.0)(inv)
    }
}

// ============================================================================
// ActionCommand
// ============================================================================

/// A leaf node of the command tree.
pub struct ActionCommand {
    meta: CommandMeta,
    context: Option<ShellContext>,
    action: Box<dyn Action>,
}

impl ActionCommand {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        action: impl Action + 'static,
    ) -> Self {
        Self {
            meta: CommandMeta::new(name, description),
            context: None,
            action: Box::new(action),
        }
    }

    /// Add an alternate name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.meta.add_alias(alias);
        self
    }

    /// Add a line of help text.
    pub fn help(mut self, line: impl Into<String>) -> Self {
        self.meta.add_help(line);
        self
    }

    /// Run this command when the container is invoked without a name.
    pub fn as_default(mut self) -> Self {
        self.meta.set_default(true);
        self
    }

    pub fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    /// The context received at registration, if registered.
    pub fn context(&self) -> Option<&ShellContext> {
        self.context.as_ref()
    }

    /// An unregistered action has no console and cannot run.
    pub fn can_execute(&self) -> bool {
        self.context.is_some() && self.action.can_execute()
    }

    pub fn invoke_with_guard<'a>(&'a self, params: &'a str) -> BoxFuture<'a, ShellResult<bool>> {
        guarded(self.meta.name(), move || self.can_execute(), self.invoke(params))
    }

    pub(crate) fn on_registered(&mut self, context: &ShellContext) {
        match &self.context {
            None => self.context = Some(context.clone()),
            Some(existing) if existing.same_as(context) => {}
            Some(_) => {
                tracing::warn!(command = %self.meta.name(), "Command already bound to another context");
            }
        }
    }

    async fn invoke(&self, params: &str) -> ShellResult<bool> {
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| ShellError::NotExecutable {
                command: self.meta.name().to_string(),
            })?;

        tracing::trace!(command = %self.meta.name(), params = %params, "Invoking action");
        let mut inv = Invocation::new(context, self.meta.name(), params);
        self.action.invoke(&mut inv).await
    }
}

impl fmt::Debug for ActionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCommand")
            .field("names", &self.meta.names())
            .field("registered", &self.context.is_some())
            .finish()
    }
}

// ============================================================================
// Invocation
// ============================================================================

/// What an action body sees while it runs.
///
/// Holds the parameter text left over after resolution. Parameters can be
/// consumed one token at a time with [`next_param`](Self::next_param), or all
/// at once with [`rest_param`](Self::rest_param). Missing parameters are
/// prompted for.
pub struct Invocation<'a> {
    context: &'a ShellContext,
    command: &'a str,
    params: &'a str,
    remaining: &'a str,
}

impl<'a> Invocation<'a> {
    pub fn new(context: &'a ShellContext, command: &'a str, params: &'a str) -> Self {
        Self {
            context,
            command,
            params,
            remaining: params,
        }
    }

    /// Primary name of the running command.
    pub fn command(&self) -> &str {
        self.command
    }

    /// The full parameter text, as resolved.
    pub fn params(&self) -> &str {
        self.params
    }

    /// Parameter text not yet consumed.
    pub fn remaining(&self) -> &str {
        self.remaining
    }

    /// The full parameter text, tokenized.
    pub fn tokens(&self) -> Vec<String> {
        tokenize(self.params)
    }

    pub fn context(&self) -> &ShellContext {
        self.context
    }

    pub fn console(&self) -> &dyn Console {
        self.context.console()
    }

    pub fn output(&self, text: impl AsRef<str>, level: OutputLevel) {
        self.context.write(text.as_ref(), level);
    }

    pub fn info(&self, text: impl AsRef<str>) {
        self.output(text, OutputLevel::Information);
    }

    pub fn warn(&self, text: impl AsRef<str>) {
        self.output(text, OutputLevel::Warning);
    }

    pub fn error(&self, text: impl AsRef<str>) {
        self.output(text, OutputLevel::Error);
    }

    /// Binder on this invocation's console.
    pub fn binder(&self) -> ParamBinder<'_> {
        ParamBinder::new(self.context.console())
    }

    /// Bind `supplied`, prompting for `slot` when it is empty.
    pub async fn query_param<T: FromParam>(&self, slot: &str, supplied: &str) -> ShellResult<T> {
        self.binder().query_param(slot, supplied).await
    }

    /// Bind the next token of the remaining parameter text.
    pub async fn next_param<T: FromParam>(&mut self, slot: &str) -> ShellResult<T> {
        self.next_slot(&ParamSlot::new(slot)).await
    }

    /// Bind the next token against a declared slot.
    pub async fn next_slot<T: FromParam>(&mut self, slot: &ParamSlot<T>) -> ShellResult<T> {
        let (token, rest) = split_first(self.remaining);
        self.remaining = rest;
        self.binder().query_slot(slot, &token).await
    }

    /// Bind everything that remains, verbatim.
    pub async fn rest_param<T: FromParam>(&mut self, slot: &str) -> ShellResult<T> {
        let rest = std::mem::take(&mut self.remaining);
        self.binder().query_param(slot, rest.trim()).await
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("command", &self.command)
            .field("params", &self.params)
            .field("remaining", &self.remaining)
            .finish()
    }
}
