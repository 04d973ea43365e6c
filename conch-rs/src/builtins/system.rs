use async_trait::async_trait;
use tokio::process::Command;

use crate::command::{Action, Invocation};
use crate::console::OutputLevel;
use crate::error::{ShellError, ShellResult};

/// Runs the remaining text with the platform shell and prints what it wrote.
///
/// No timeout is applied; the command runs until the child process exits.
#[derive(Debug, Clone, Copy)]
pub struct SystemShell;

impl SystemShell {
    fn command(input: &str) -> Command {
        if cfg!(windows) {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(input);
            command
        } else {
            let mut command = Command::new("sh");
            command.arg("-c").arg(input);
            command
        }
    }
}

#[async_trait]
impl Action for SystemShell {
    async fn invoke(&self, inv: &mut Invocation<'_>) -> ShellResult<bool> {
        let input: String = inv.rest_param("Input").await?;

        tracing::debug!(input = %input, "Spawning system shell");
        let output = Self::command(&input)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ShellError::failed(inv.command(), e))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            inv.output(line, OutputLevel::Default);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            inv.output(line, OutputLevel::Warning);
        }
        if !output.status.success() {
            inv.warn(format!("Process exited with {}.", output.status));
        }
        Ok(true)
    }
}
