//! Container commands and recursive resolution.

use std::fmt;

use futures::future::BoxFuture;

use super::{guarded, Command, CommandMeta};
use crate::context::{CommandRegistered, ShellContext};
use crate::error::{ShellError, ShellResult};
use crate::tokenize::split_first;

/// A named group of child commands.
///
/// Children keep their registration order. Resolution takes the first token
/// of the parameter text, finds the child whose name or alias matches it
/// (case-insensitively) and hands the untouched remainder to that child.
///
/// A container built with [`new`](Self::new) is detached: registrations into
/// it are not announced to the context's observers until it is itself
/// registered into an attached container. [`root`](Self::root) builds the
/// attached top of a tree.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use conch::{action_fn, ActionCommand, ContainerCommand, ShellContext};
/// use conch::console::MemoryConsole;
///
/// let context = ShellContext::new(Arc::new(MemoryConsole::new()));
/// let mut exec = ContainerCommand::new(&context, "exec", "Execute command features.");
/// exec.register(ActionCommand::new("file", "Run a file", action_fn(|_| Ok(true))).alias("f"))
///     .unwrap();
///
/// assert!(exec.find("F").is_some());
/// assert!(exec.register(ActionCommand::new("f", "", action_fn(|_| Ok(true)))).is_err());
/// assert!(context.help_index().is_empty());
///
/// let mut root = ContainerCommand::root(&context, "root", "");
/// root.register(exec).unwrap();
/// assert_eq!(context.help_index().len(), 2);
/// ```
pub struct ContainerCommand {
    meta: CommandMeta,
    context: ShellContext,
    children: Vec<Command>,
    attached: bool,
}

impl ContainerCommand {
    /// Create an empty container bound to `context`.
    pub fn new(
        context: &ShellContext,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            meta: CommandMeta::new(name, description),
            context: context.clone(),
            children: Vec::new(),
            attached: false,
        }
    }

    /// Create the top of a tree. Registrations into it are announced at once.
    pub fn root(
        context: &ShellContext,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut root = Self::new(context, name, description);
        root.attached = true;
        root
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

    /// Run this container when its parent is invoked without a name.
    pub fn as_default(mut self) -> Self {
        self.meta.set_default(true);
        self
    }

    pub fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    pub fn context(&self) -> &ShellContext {
        &self.context
    }

    /// Attach `child`.
    ///
    /// Fails without changing the tree when any of the child's names collides
    /// with a name or alias of an existing child, when a second default child
    /// is added, when the child is bound to another context, or when called
    /// from inside a registration notification. On success the child is bound
    /// to this container's context. If this container is attached, observers
    /// are notified of the child and of every command below it.
    pub fn register(&mut self, child: impl Into<Command>) -> ShellResult<()> {
        let mut child = child.into();

        if self.context.is_notifying() {
            return Err(ShellError::ReentrantRegistration {
                name: child.name().to_string(),
            });
        }

        child.meta().validate()?;

        if child
            .context()
            .is_some_and(|bound| !bound.same_as(&self.context))
        {
            return Err(ShellError::ForeignContext {
                name: child.name().to_string(),
                container: self.meta.name().to_string(),
            });
        }

        if let Some(name) = child
            .names()
            .iter()
            .find(|name| self.find(name.as_str()).is_some())
        {
            return Err(ShellError::DuplicateCommandName {
                name: name.clone(),
                container: self.meta.name().to_string(),
            });
        }

        if child.is_default() && self.default_child().is_some() {
            return Err(ShellError::DuplicateDefaultCommand {
                name: child.name().to_string(),
                container: self.meta.name().to_string(),
            });
        }

        child.on_registered(&self.context, self.attached);
        self.children.push(child);

        if let Some(child) = self.children.last() {
            tracing::info!(
                container = %self.meta.name(),
                command = %child.name(),
                attached = self.attached,
                "Command registered"
            );
            if self.attached {
                self.announce(child);
            }
        }
        Ok(())
    }

    /// Whether registrations into this container reach the observers.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, child: impl Into<Command>) -> ShellResult<Self> {
        self.register(child)?;
        Ok(self)
    }

    /// Children in registration order.
    pub fn children(&self) -> &[Command] {
        &self.children
    }

    /// Child addressed by `token`, by primary name or alias.
    pub fn find(&self, token: &str) -> Option<&Command> {
        self.children
            .iter()
            .find(|child| child.meta().matches(token))
    }

    /// The child run when no name is given.
    pub fn default_child(&self) -> Option<&Command> {
        self.children.iter().find(|child| child.is_default())
    }

    /// Primary names of the children, in registration order.
    pub fn child_names(&self) -> Vec<String> {
        self.children
            .iter()
            .map(|child| child.name().to_string())
            .collect()
    }

    /// A container is only useful while at least one child can run.
    pub fn can_execute(&self) -> bool {
        self.children.iter().any(Command::can_execute)
    }

    pub fn invoke_with_guard<'a>(&'a self, params: &'a str) -> BoxFuture<'a, ShellResult<bool>> {
        guarded(self.meta.name(), move || self.can_execute(), self.invoke(params))
    }

    pub(crate) fn attach(&mut self) {
        self.attached = true;
        for child in &mut self.children {
            if let Command::Container(container) = child {
                container.attach();
            }
        }
    }

    // Pre-order: the child, then everything registered below it.
    fn announce(&self, child: &Command) {
        self.context.notify_registered(&CommandRegistered {
            command: child,
            container: self.meta.name(),
        });
        if let Command::Container(container) = child {
            for grandchild in &container.children {
                container.announce(grandchild);
            }
        }
    }

    /// Resolve `params` against the children without gating this container.
    pub(crate) async fn resolve(&self, params: &str) -> ShellResult<bool> {
        self.invoke(params).await
    }

    async fn invoke(&self, params: &str) -> ShellResult<bool> {
        let (first, rest) = split_first(params);
        tracing::trace!(container = %self.meta.name(), token = %first, "Resolving");

        if first.is_empty() {
            if let Some(default) = self.default_child() {
                return default.invoke_with_guard(rest).await;
            }
            return Err(self.unknown(first));
        }

        match self.find(&first) {
            Some(child) => child.invoke_with_guard(rest).await,
            None => Err(self.unknown(first)),
        }
    }

    fn unknown(&self, token: String) -> ShellError {
        ShellError::UnknownCommand {
            token,
            available: self.child_names(),
        }
    }
}

impl fmt::Debug for ContainerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerCommand")
            .field("names", &self.meta.names())
            .field("attached", &self.attached)
            .field("children", &self.children)
            .finish()
    }
}

/// Names at one level that start with `token`, or all of them if none do.
pub(crate) fn suggestions(available: &[String], token: &str) -> Vec<String> {
    let lowered = token.to_lowercase();
    let matching: Vec<String> = available
        .iter()
        .filter(|name| !token.is_empty() && name.to_lowercase().starts_with(&lowered))
        .cloned()
        .collect();
    if matching.is_empty() {
        available.to_vec()
    } else {
        matching
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{action_fn, same_name, Action, ActionCommand, Invocation};
    use crate::console::MemoryConsole;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Records the parameter text of every call.
    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Action for Recorder {
        async fn invoke(&self, inv: &mut Invocation<'_>) -> ShellResult<bool> {
            self.calls.lock().push(inv.params().to_string());
            Ok(true)
        }
    }

    struct Toggle(Arc<AtomicBool>);

    #[async_trait]
    impl Action for Toggle {
        fn can_execute(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }

        async fn invoke(&self, _inv: &mut Invocation<'_>) -> ShellResult<bool> {
            Ok(true)
        }
    }

    fn context() -> ShellContext {
        ShellContext::new(Arc::new(MemoryConsole::new()))
    }

    fn noop(name: &str) -> ActionCommand {
        ActionCommand::new(name, "", action_fn(|_| Ok(true)))
    }

    #[test]
    fn test_register_preserves_order() {
        let context = context();
        let mut container = ContainerCommand::new(&context, "exec", "");
        container.register(noop("sleep")).unwrap();
        container.register(noop("file")).unwrap();
        container.register(noop("again")).unwrap();

        assert_eq!(container.child_names(), vec!["sleep", "file", "again"]);
    }

    #[test]
    fn test_duplicate_alias_leaves_tree_unchanged() {
        let context = context();
        let mut container = ContainerCommand::root(&context, "exec", "");
        container.register(noop("file").alias("f")).unwrap();

        let err = container
            .register(noop("fetch").alias("F"))
            .unwrap_err();
        assert!(matches!(err, ShellError::DuplicateCommandName { ref name, .. } if name == "F"));

        let err = container.register(noop("FILE")).unwrap_err();
        assert!(matches!(err, ShellError::DuplicateCommandName { .. }));

        assert_eq!(container.children().len(), 1);
        assert_eq!(context.help_index().len(), 1);
    }

    #[test]
    fn test_second_default_is_rejected() {
        let context = context();
        let mut container = ContainerCommand::new(&context, "exec", "");
        container.register(noop("file").as_default()).unwrap();

        let err = container.register(noop("sleep").as_default()).unwrap_err();
        assert!(matches!(err, ShellError::DuplicateDefaultCommand { .. }));
        assert_eq!(container.children().len(), 1);
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let context = context();
        let mut container = ContainerCommand::new(&context, "exec", "");
        let err = container.register(noop("two words")).unwrap_err();
        assert!(matches!(err, ShellError::InvalidCommandName { .. }));
    }

    #[test]
    fn test_registration_notifies_once_per_attach() {
        let context = context();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        context.subscribe(move |event| {
            sink.lock()
                .push(format!("{}/{}", event.container, event.command.name()));
        });

        let mut exec = ContainerCommand::root(&context, "exec", "");
        exec.register(noop("file")).unwrap();
        exec.register(noop("sleep")).unwrap();
        let _ = exec.register(noop("file"));

        assert_eq!(*seen.lock(), vec!["exec/file", "exec/sleep"]);
    }

    #[test]
    fn test_reentrant_registration_is_rejected() {
        let context = context();
        let observer_context = context.clone();
        let outcome = Arc::new(Mutex::new(None));
        let sink = outcome.clone();
        context.subscribe(move |event| {
            if event.command.name() != "outer" {
                return;
            }
            let mut nested = ContainerCommand::new(&observer_context, "nested", "");
            let result = nested.register(ActionCommand::new("inner", "", action_fn(|_| Ok(true))));
            *sink.lock() = Some(result.is_err());
        });

        let mut root = ContainerCommand::root(&context, "root", "");
        root.register(noop("outer")).unwrap();

        assert_eq!(*outcome.lock(), Some(true));
        assert!(!context.is_notifying());
    }

    #[test]
    fn test_detached_subtree_is_announced_on_attach() {
        let context = context();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        context.subscribe(move |event| {
            sink.lock()
                .push(format!("{}/{}", event.container, event.command.name()));
        });

        let mut db = ContainerCommand::new(&context, "db", "");
        db.register(noop("query")).unwrap();
        let mut app = ContainerCommand::new(&context, "app", "");
        app.register(noop("deploy")).unwrap();
        app.register(db).unwrap();
        assert!(seen.lock().is_empty());

        let mut root = ContainerCommand::root(&context, "root", "");
        root.register(app).unwrap();

        assert_eq!(
            *seen.lock(),
            vec!["root/app", "app/deploy", "app/db", "db/query"]
        );

        // Registering below an attached subtree is announced right away.
        let Some(Command::Container(app)) = root.children.first_mut() else {
            panic!("app should be a container");
        };
        assert!(app.is_attached());
        app.register(noop("status")).unwrap();
        assert_eq!(seen.lock().last().map(String::as_str), Some("app/status"));
    }

    #[test]
    fn test_failed_attach_leaves_no_help_entries() {
        let context = context();
        let mut root = ContainerCommand::root(&context, "root", "");
        root.register(noop("exec")).unwrap();

        let mut exec = ContainerCommand::new(&context, "exec", "");
        exec.register(noop("deploy")).unwrap();

        let err = root.register(exec).unwrap_err();
        assert!(matches!(err, ShellError::DuplicateCommandName { .. }));
        assert_eq!(context.help_index().len(), 1);
        assert!(context.help_index().lookup("deploy").is_empty());
    }

    #[test]
    fn test_foreign_context_is_rejected() {
        let other = context();
        let context = context();
        let mut root = ContainerCommand::root(&context, "root", "");

        let mut app = ContainerCommand::new(&other, "app", "");
        app.register(noop("ping")).unwrap();
        let err = root.register(app).unwrap_err();
        assert!(matches!(err, ShellError::ForeignContext { ref name, .. } if name == "app"));
        assert!(err.is_registration_error());

        let mut bound = noop("ping");
        bound.on_registered(&other);
        let err = root.register(bound).unwrap_err();
        assert!(matches!(err, ShellError::ForeignContext { .. }));

        assert!(root.children().is_empty());
        assert!(context.help_index().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_forwards_raw_remainder() {
        let context = context();
        let recorder = Recorder::default();
        let mut exec = ContainerCommand::new(&context, "exec", "");
        exec.register(ActionCommand::new("file", "", recorder.clone()).alias("f"))
            .unwrap();
        let mut root = ContainerCommand::new(&context, "root", "");
        root.register(exec).unwrap();

        assert!(root.invoke_with_guard(r#"exec file "run me.txt""#).await.unwrap());
        assert!(root.invoke_with_guard(r#"EXEC F "run me.txt""#).await.unwrap());

        assert_eq!(
            *recorder.calls.lock(),
            vec![r#""run me.txt""#, r#""run me.txt""#]
        );
    }

    #[tokio::test]
    async fn test_unknown_token_lists_level_names() {
        let context = context();
        let mut exec = ContainerCommand::new(&context, "exec", "");
        exec.register(noop("file")).unwrap();
        exec.register(noop("sleep")).unwrap();

        let err = exec.invoke_with_guard("bogus 1").await.unwrap_err();
        match err {
            ShellError::UnknownCommand { token, available } => {
                assert_eq!(token, "bogus");
                assert_eq!(available, vec!["file", "sleep"]);
            }
            other => panic!("Expected UnknownCommand, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_token_uses_default_child() {
        let context = context();
        let recorder = Recorder::default();
        let mut exec = ContainerCommand::new(&context, "exec", "");
        exec.register(noop("file")).unwrap();
        exec.register(ActionCommand::new("list", "", recorder.clone()).as_default())
            .unwrap();

        assert!(exec.invoke_with_guard("   ").await.unwrap());
        assert_eq!(*recorder.calls.lock(), vec![""]);
    }

    #[tokio::test]
    async fn test_empty_token_without_default_is_unknown() {
        let context = context();
        let mut exec = ContainerCommand::new(&context, "exec", "");
        exec.register(noop("file")).unwrap();

        let err = exec.invoke_with_guard("").await.unwrap_err();
        assert!(matches!(err, ShellError::UnknownCommand { ref token, .. } if token.is_empty()));
    }

    #[tokio::test]
    async fn test_guard_is_reevaluated_each_call() {
        let context = context();
        let enabled = Arc::new(AtomicBool::new(false));
        let mut root = ContainerCommand::new(&context, "root", "");
        root.register(noop("help")).unwrap();
        root.register(ActionCommand::new("db", "", Toggle(enabled.clone())))
            .unwrap();

        let err = root.invoke_with_guard("db").await.unwrap_err();
        assert!(matches!(err, ShellError::NotExecutable { ref command } if command == "db"));

        enabled.store(true, Ordering::SeqCst);
        assert!(root.invoke_with_guard("db").await.unwrap());
    }

    #[tokio::test]
    async fn test_container_without_runnable_children_is_not_executable() {
        let context = context();
        let enabled = Arc::new(AtomicBool::new(false));
        let mut db = ContainerCommand::new(&context, "db", "");
        db.register(ActionCommand::new("query", "", Toggle(enabled.clone())))
            .unwrap();
        let mut root = ContainerCommand::new(&context, "root", "");
        root.register(noop("help")).unwrap();
        root.register(db).unwrap();

        let err = root.invoke_with_guard("db query").await.unwrap_err();
        assert!(matches!(err, ShellError::NotExecutable { ref command } if command == "db"));
    }

    #[test]
    fn test_suggestions_prefer_prefix_matches() {
        let names = vec!["file".to_string(), "find".to_string(), "sleep".to_string()];
        assert_eq!(suggestions(&names, "FI"), vec!["file", "find"]);
        assert_eq!(suggestions(&names, "zzz"), names);
        assert_eq!(suggestions(&names, ""), names);
    }

    #[test]
    fn test_same_name_helper() {
        assert!(same_name("Exec", "exec"));
        assert!(!same_name("exec", "exe"));
    }
}
