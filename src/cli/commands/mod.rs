use std::collections::HashMap;

pub mod browse;
pub mod entity;
pub mod system;

use crate::cli::errors::CommandError;
use crate::cli::session::{CommandOutcome, Session};

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(entity::definitions());
    commands.extend(browse::definitions());
    commands.extend(system::definitions());
    commands
}

/// Every verb and alias, for tab completion.
pub fn verb_names() -> Vec<&'static str> {
    CommandRegistry::new(all_definitions()).names().collect()
}

pub type CommandHandler = fn(&mut Session, &str) -> CommandOutcome;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub usage: &'static str,
    pub details: &'static [&'static str],
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            aliases: &[],
            description,
            usage,
            details: &[],
            handler,
        }
    }

    pub fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_details(mut self, details: &'static [&'static str]) -> Self {
        self.details = details;
        self
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    aliases: HashMap<&'static str, &'static str>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut aliases = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            for alias in definition.aliases {
                aliases.insert(*alias, definition.name);
            }
            commands.insert(definition.name, definition);
        }
        Self {
            commands,
            aliases,
            order,
        }
    }

    /// Looks up a verb or one of its aliases.
    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        let name = self.aliases.get(name).copied().unwrap_or(name);
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.iter()
            .flat_map(|definition| std::iter::once(definition.name).chain(definition.aliases.iter().copied()))
    }
}

/// Splits `rest` into whitespace-separated arguments, refusing more than `max`.
pub(crate) fn split_args<'a>(
    verb: &'static str,
    rest: &'a str,
    max: usize,
) -> Result<Vec<&'a str>, CommandError> {
    let args: Vec<&str> = rest.split_whitespace().collect();
    if args.len() > max {
        return Err(CommandError::usage(
            verb,
            format!("Unexpected argument `{}`", args[max]),
        ));
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_their_verb() {
        let registry = CommandRegistry::new(all_definitions());
        assert_eq!(registry.get("cd").map(|d| d.name), Some("chggrp"));
        assert_eq!(registry.get("ls").map(|d| d.name), Some("list"));
        assert_eq!(registry.get("clear").map(|d| d.name), Some("cls"));
        assert_eq!(registry.get("exit").map(|d| d.name), Some("quit"));
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn grammar_covers_every_verb() {
        let names = verb_names();
        for verb in [
            "add", "chggrp", "cd", "chgpwd", "delete", "edit", "find", "getpass", "list", "ls",
            "show", "help", "reload", "cls", "clear", "quit", "exit",
        ] {
            assert!(names.contains(&verb), "missing {verb}");
        }
    }

    #[test]
    fn extra_arguments_are_a_usage_error() {
        assert_eq!(split_args("show", "entry  x", 2).expect("ok"), vec!["entry", "x"]);
        assert!(matches!(
            split_args("list", "now", 0),
            Err(CommandError::Usage { verb: "list", .. })
        ));
    }
}
