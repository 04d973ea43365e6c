//! # conch: an embeddable interactive command shell
//!
//! Expose a tree of named, composable commands to an operator typing at a
//! console.
//!
//! ## Core Principles
//!
//! - **Tree routing**: containers route the first token of a line to a child,
//!   recursively, until a leaf action is reached
//! - **Aliases**: every command can be addressed by its name or any alias,
//!   case-insensitively
//! - **Prompt if missing**: parameters not supplied on the line are asked for
//! - **Guarded execution**: every invocation checks `can_execute` first
//! - **Pluggable console**: all I/O goes through the [`Console`] trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use conch::{Action, ActionCommand, ContainerCommand, Invocation, Shell, ShellConfig, ShellResult};
//!
//! struct Deploy;
//!
//! #[async_trait]
//! impl Action for Deploy {
//!     async fn invoke(&self, inv: &mut Invocation<'_>) -> ShellResult<bool> {
//!         let target: String = inv.next_param("Target").await?;
//!         let replicas: u32 = inv.next_param("Replicas").await?;
//!         inv.info(format!("Deploying {} x{}", target, replicas));
//!         Ok(true)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     conch::init_subscriber()?;
//!
//!     let mut shell = Shell::terminal(ShellConfig::from_file("shell.json")?)?;
//!     let app = ContainerCommand::new(shell.context(), "app", "Application commands.")
//!         .with(ActionCommand::new("deploy", "Deploy a build.", Deploy).alias("d"))?;
//!     shell.register(app)?;
//!
//!     // `app deploy staging 3`, `APP D staging` (prompts for Replicas), `help app`, `exit`
//!     shell.run().await?;
//!     Ok(())
//! }
//! ```

pub use conch_macros::ParamEnum;

pub mod command;
pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod help;
pub mod param;
pub mod shell;
pub mod table;
pub mod tokenize;
pub mod tracing_support;

#[cfg(feature = "builtins")]
pub mod builtins;

// Re-export commonly used items
pub use command::{
    action_fn, Action, ActionCommand, Command, CommandKind, CommandMeta, ContainerCommand,
    Invocation,
};
pub use config::{ConfigError, ShellConfig};
pub use console::{Console, OutputLevel};
pub use context::{CommandRegistered, ShellContext};
pub use error::{ConsoleError, ShellError, ShellResult};
pub use help::{HelpEntry, HelpIndex};
pub use param::{FromParam, ParamBinder, ParamSlot};
pub use shell::Shell;

pub use tracing_support::init_subscriber;

#[cfg(feature = "tracing")]
pub use tracing_support::{init_subscriber_with_config, TracingConfig, TracingFormat};
