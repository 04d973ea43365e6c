use async_trait::async_trait;

use crate::command::{Action, Invocation};
use crate::console::OutputLevel;
use crate::error::ShellResult;
use crate::help::HelpIndex;

/// Lists commands from the context's help index.
#[derive(Debug, Clone)]
pub struct Help {
    root: String,
}

impl Help {
    /// `root` is the primary name of the container that holds top-level commands.
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Action for Help {
    async fn invoke(&self, inv: &mut Invocation<'_>) -> ShellResult<bool> {
        let index = inv.context().help_index();
        let topic = inv.tokens().into_iter().next();

        let entries = match &topic {
            Some(topic) => index.lookup(topic),
            None => index.top_level(&self.root),
        };

        if entries.is_empty() {
            if let Some(topic) = topic {
                inv.warn(format!("No help for '{}'.", topic));
            }
            return Ok(true);
        }

        for line in HelpIndex::render(&entries).lines() {
            inv.output(line, OutputLevel::Help);
        }

        // Extra help lines for a single named command.
        if let Some(topic) = &topic {
            for entry in entries.iter().filter(|entry| entry.is_named(topic)) {
                for line in &entry.help {
                    inv.output(line, OutputLevel::Help);
                }
            }
        }
        Ok(true)
    }
}

/// Ends the session.
#[derive(Debug, Clone, Copy)]
pub struct Exit;

#[async_trait]
impl Action for Exit {
    async fn invoke(&self, _inv: &mut Invocation<'_>) -> ShellResult<bool> {
        tracing::debug!("Exit requested");
        Ok(false)
    }
}
