//! Help index built from registration notifications.

use parking_lot::RwLock;
use serde::Serialize;

use crate::command::{same_name, CommandKind};
use crate::context::CommandRegistered;
use crate::table::format_table;

/// One registered command, as seen by help.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    /// Primary name of the container the command lives in.
    pub container: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub kind: CommandKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub help: Vec<String>,
}

impl HelpEntry {
    fn from_event(event: &CommandRegistered<'_>) -> Self {
        let meta = event.command.meta();
        Self {
            container: event.container.to_string(),
            name: meta.name().to_string(),
            aliases: meta.aliases().to_vec(),
            description: meta.description().to_string(),
            kind: event.command.kind(),
            help: meta.help_lines().to_vec(),
        }
    }

    /// Whether `token` is this command's name or one of its aliases.
    pub fn is_named(&self, token: &str) -> bool {
        same_name(&self.name, token) || self.aliases.iter().any(|alias| same_name(alias, token))
    }
}

/// Flattened list of every command in the tree, in the order it was announced.
#[derive(Debug, Default)]
pub struct HelpIndex {
    entries: RwLock<Vec<HelpEntry>>,
}

impl HelpIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registration. Subscribed by [`ShellContext`](crate::ShellContext).
    pub fn record(&self, event: &CommandRegistered<'_>) {
        self.entries.write().push(HelpEntry::from_event(event));
    }

    pub fn entries(&self) -> Vec<HelpEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Entries in the container `root`, i.e. the top level of the shell.
    pub fn top_level(&self, root: &str) -> Vec<HelpEntry> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.container == root)
            .cloned()
            .collect()
    }

    /// Entries named `topic`, followed by the children of any container named `topic`.
    pub fn lookup(&self, topic: &str) -> Vec<HelpEntry> {
        let entries = self.entries.read();
        let named = entries.iter().filter(|entry| entry.is_named(topic));
        let children = entries
            .iter()
            .filter(|entry| same_name(&entry.container, topic));
        named.chain(children).cloned().collect()
    }

    /// Render entries as a table with a header row.
    pub fn render(entries: &[HelpEntry]) -> String {
        let mut rows = vec![vec![
            "Command".to_string(),
            "Aliases".to_string(),
            "Description".to_string(),
        ]];
        rows.extend(entries.iter().map(|entry| {
            let name = match entry.kind {
                CommandKind::Container => format!("{} ...", entry.name),
                CommandKind::Action => entry.name.clone(),
            };
            vec![name, entry.aliases.join(", "), entry.description.clone()]
        }));
        format_table(&rows)
    }

    /// The whole index as JSON, for generated documentation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.entries.read())
    }
}
