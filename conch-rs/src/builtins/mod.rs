//! Built-in commands.
//!
//! | Command | Aliases | Purpose |
//! |---------|---------|---------|
//! | `help [topic]` | `?` | List registered commands |
//! | `exit` | `quit` | End the session |
//! | `exec file <path>` | `exec f` | Run each line of a file as a command |
//! | `exec sleep <ms>` | | Pause |
//! | `sh <command line>` | `shell` | Run a line with the system shell |

mod exec;
mod session;
mod system;

pub use exec::{exec_container, ExecuteFile, Sleep};
pub use session::{Exit, Help};
pub use system::SystemShell;

use crate::command::{ActionCommand, ContainerCommand};
use crate::error::ShellResult;

/// Register every built-in command in `root`.
pub fn register_builtins(root: &mut ContainerCommand) -> ShellResult<()> {
    let root_name = root.meta().name().to_string();
    root.register(
        ActionCommand::new("help", "Show available commands.", Help::new(root_name))
            .alias("?")
            .help("help          lists the top-level commands")
            .help("help <name>   shows a command, or the commands inside a group"),
    )?;
    root.register(ActionCommand::new("exit", "Leave the shell.", Exit).alias("quit"))?;

    let exec = exec_container(root.context())?;
    root.register(exec)?;

    root.register(
        ActionCommand::new("sh", "Run a command line with the system shell.", SystemShell)
            .alias("shell")
            .help("Ex.")
            .help("sh ls -la"),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MemoryConsole;
    use crate::context::ShellContext;
    use crate::shell::ROOT_NAME;
    use std::sync::Arc;

    #[test]
    fn test_builtins_register_cleanly() {
        let context = ShellContext::new(Arc::new(MemoryConsole::new()));
        let mut root = ContainerCommand::new(&context, ROOT_NAME, "");
        register_builtins(&mut root).unwrap();

        assert_eq!(root.child_names(), vec!["help", "exit", "exec", "sh"]);
        assert!(root.find("quit").is_some());
        assert!(root.find("?").is_some());
        assert!(root.can_execute());
    }

    #[test]
    fn test_builtins_collide_with_themselves() {
        let context = ShellContext::new(Arc::new(MemoryConsole::new()));
        let mut root = ContainerCommand::new(&context, ROOT_NAME, "");
        register_builtins(&mut root).unwrap();

        let err = register_builtins(&mut root).unwrap_err();
        assert!(err.is_registration_error());
        assert_eq!(root.children().len(), 4);
    }
}
