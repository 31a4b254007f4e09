use crate::cli::commands::{CommandDefinition, CommandRegistry};
use crate::cli::console::Console;
use crate::cli::output::MessageKind;

pub fn print_overview(console: &mut dyn Console, registry: &CommandRegistry) {
    console.emit(MessageKind::Section, "Available commands");
    for definition in registry.iter() {
        console.line(&format!("  {:<16} {}", display_name(definition), definition.description));
    }
    console.info("Use `help <command>` for details.");
}

pub fn print_command(console: &mut dyn Console, definition: &CommandDefinition) {
    console.emit(MessageKind::Section, &format!("Help: {}", definition.name));
    console.line(&format!("  Description: {}", definition.description));
    console.line(&format!("  Usage: {}", definition.usage));
    if !definition.aliases.is_empty() {
        console.line(&format!("  Aliases: {}", definition.aliases.join(", ")));
    }
    for detail in definition.details {
        console.line(&format!("  {detail}"));
    }
}

fn display_name(definition: &CommandDefinition) -> String {
    std::iter::once(definition.name)
        .chain(definition.aliases.iter().copied())
        .collect::<Vec<_>>()
        .join("/")
}
