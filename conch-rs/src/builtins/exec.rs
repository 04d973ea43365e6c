use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::command::{Action, ActionCommand, ContainerCommand, Invocation};
use crate::context::ShellContext;
use crate::error::{ShellError, ShellResult};
use crate::param::ParamSlot;

/// The `exec` group with its `file` and `sleep` commands.
pub fn exec_container(context: &ShellContext) -> ShellResult<ContainerCommand> {
    ContainerCommand::new(context, "exec", "Execute command features.")
        .with(
            ActionCommand::new("file", "Execute the commands in a file.", ExecuteFile)
                .alias("f")
                .help("Blank lines and lines starting with # are skipped."),
        )?
        .with(ActionCommand::new(
            "sleep",
            "Pause for a number of milliseconds.",
            Sleep,
        ))
}

/// Queues every command line of a file for the session loop.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteFile;

#[async_trait]
impl Action for ExecuteFile {
    async fn invoke(&self, inv: &mut Invocation<'_>) -> ShellResult<bool> {
        let path: PathBuf = inv.next_param("File").await?;

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ShellError::failed(inv.command(), format!("{}: {}", path.display(), e)))?;

        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();

        tracing::debug!(path = %path.display(), lines = lines.len(), "Queued script");
        inv.info(format!("Executing {} lines from {}.", lines.len(), path.display()));
        inv.context().inject_lines(lines);
        Ok(true)
    }
}

/// Waits before returning.
#[derive(Debug, Clone, Copy)]
pub struct Sleep;

#[async_trait]
impl Action for Sleep {
    async fn invoke(&self, inv: &mut Invocation<'_>) -> ShellResult<bool> {
        let slot = ParamSlot::<u64>::new("Milliseconds").default(1000);
        let millis = inv.next_slot(&slot).await?;

        inv.info(format!("Sleeping {} ms.", millis));
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::console::{MemoryConsole, OutputLevel};
    use crate::{Shell, ShellConfig};
    use std::sync::Arc;

    fn shell(console: Arc<MemoryConsole>) -> Shell {
        Shell::with_config(console, ShellConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_sleep_uses_supplied_value() {
        let console = Arc::new(MemoryConsole::new());
        let shell = shell(console.clone());

        assert!(shell.dispatch("exec sleep 5").await.unwrap());
        assert_eq!(
            console.lines_at(OutputLevel::Information),
            vec!["Sleeping 5 ms."]
        );
        assert!(console.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_sleep_prompts_when_missing() {
        let console = Arc::new(MemoryConsole::with_input(["abc", "1"]));
        let shell = shell(console.clone());

        assert!(shell.dispatch("exec sleep").await.unwrap());
        assert_eq!(
            console.prompts(),
            vec!["Milliseconds [1000]: ", "Milliseconds [1000]: "]
        );
        assert_eq!(console.lines_at(OutputLevel::Warning).len(), 1);
        assert_eq!(
            console.lines_at(OutputLevel::Information),
            vec!["Sleeping 1 ms."]
        );
    }

    #[tokio::test]
    async fn test_sleep_rejects_bad_supplied_value() {
        let console = Arc::new(MemoryConsole::new());
        let shell = shell(console.clone());

        assert!(shell.dispatch("exec sleep soon").await.unwrap());
        let errors = console.lines_at(OutputLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'soon'"));
        assert!(console.lines_at(OutputLevel::Information).is_empty());
    }

    #[tokio::test]
    async fn test_execute_file_queues_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.txt");
        std::fs::write(&path, "# setup\nexec sleep 1\n\n  help  \n").unwrap();

        let console = Arc::new(MemoryConsole::new());
        let shell = shell(console.clone());

        let line = format!("exec f \"{}\"", path.display());
        assert!(shell.dispatch(&line).await.unwrap());

        let context = shell.context();
        assert_eq!(context.next_pending_line().as_deref(), Some("exec sleep 1"));
        assert_eq!(context.next_pending_line().as_deref(), Some("help"));
        assert_eq!(context.next_pending_line(), None);
    }

    #[tokio::test]
    async fn test_execute_missing_file_fails_softly() {
        let dir = tempfile::tempdir().unwrap();
        let console = Arc::new(MemoryConsole::new());
        let shell = shell(console.clone());

        let line = format!("exec file \"{}\"", dir.path().join("missing.txt").display());
        assert!(shell.dispatch(&line).await.unwrap());

        let errors = console.lines_at(OutputLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Command 'file' failed"));
        assert_eq!(shell.context().pending_len(), 0);
    }
}
