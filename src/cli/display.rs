//! Entry cards, group headers and entry tables.

use chrono::{DateTime, Local, Utc};

use super::console::Console;
use super::output::{field_label, MessageKind, RULE_WIDTH};
use crate::store::{Database, Entry, Group};

pub const ROOT_LABEL: &str = "Root";
const PATH_SEPARATOR: &str = " > ";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";
const SECRET_MASK: &str = "-----------------";
const SECRET_UNSET: &str = "-- Nothing set --";
const ID_COLUMN: usize = 36;
const TITLE_COLUMN: usize = 52;

/// Joins path components with ` > `; the empty path is the root.
pub fn pretty_path(path: &[String]) -> String {
    if path.is_empty() {
        ROOT_LABEL.to_string()
    } else {
        path.join(PATH_SEPARATOR)
    }
}

pub fn format_timestamp(stamp: DateTime<Utc>) -> String {
    stamp.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

fn or_blank(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

/// Lines of an entry card, without the framing rules.
pub fn entry_card(entry: &Entry, path: &[String], color: bool) -> Vec<String> {
    let label = |text: &str| field_label(text, color);
    let secret = if entry.has_secret() {
        SECRET_MASK
    } else {
        SECRET_UNSET
    };
    vec![
        format!(
            "{}{}     {}{}",
            label("   Entry: "),
            entry.title_or_empty(),
            label("UUID: "),
            entry.id
        ),
        format!("{}{}", label("    Path: "), pretty_path(path)),
        format!("{}{}", label("    User: "), or_blank(entry.username.as_deref())),
        format!("{}{}", label("Password: "), secret),
        format!("{}{}", label("     URL: "), or_blank(entry.url.as_deref())),
        format!(
            "{}{} {}{}",
            label("Modified: "),
            format_timestamp(entry.times.modified),
            label("Created: "),
            format_timestamp(entry.times.created)
        ),
        label("   Notes:"),
        or_blank(entry.notes.as_deref()).to_string(),
    ]
}

pub fn group_card(group: &Group, path: &[String], color: bool) -> Vec<String> {
    let label = |text: &str| field_label(text, color);
    vec![
        format!("{}{}    {}{}", label("Group: "), group.name, label("UUID: "), group.id),
        format!("{}{}", label(" Path: "), pretty_path(path)),
        format!(
            "{}{} {}{}",
            label(" Modified: "),
            format_timestamp(group.times.modified),
            label("Created: "),
            format_timestamp(group.times.created)
        ),
        format!(
            "{}{} {}{}",
            label(" Entries: "),
            group.entries.len(),
            label("Subgroups: "),
            group.groups.len()
        ),
        label(" Notes:"),
        or_blank(group.notes.as_deref()).to_string(),
    ]
}

/// Fixed-width `UUID | Title` table.
pub fn entries_table(entries: &[&Entry]) -> Vec<String> {
    if entries.is_empty() {
        return vec![" -- No entries found --".to_string()];
    }
    let rule = "-".repeat(RULE_WIDTH);
    let mut lines = vec![
        rule.clone(),
        table_row(" UUID", "Title"),
        rule.clone(),
    ];
    lines.extend(
        entries
            .iter()
            .map(|entry| table_row(&entry.id.to_string(), entry.title_or_empty())),
    );
    lines.push(rule);
    lines
}

fn table_row(id: &str, title: &str) -> String {
    format!(
        "{:<id_width$} | {:<title_width$} |",
        clip(id, ID_COLUMN),
        clip(title, TITLE_COLUMN),
        id_width = ID_COLUMN,
        title_width = TITLE_COLUMN
    )
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn framed(console: &mut dyn Console, lines: Vec<String>) {
    console.emit(MessageKind::Rule, "");
    for line in lines {
        console.line(&line);
    }
    console.emit(MessageKind::Rule, "");
}

pub fn show_entry(console: &mut dyn Console, entry: &Entry, path: &[String]) {
    let color = console.color();
    framed(console, entry_card(entry, path, color));
}

pub fn show_group_header(console: &mut dyn Console, group: &Group, path: &[String]) {
    let color = console.color();
    framed(console, group_card(group, path, color));
}

pub fn show_entries(console: &mut dyn Console, entries: &[&Entry]) {
    for line in entries_table(entries) {
        console.line(&line);
    }
}

/// Header plus entry table for a group that lives in `database`.
pub fn show_group(console: &mut dyn Console, database: &Database, group: &Group) {
    let path = database.group_path(group.id).unwrap_or_default();
    show_group_header(console, group, &path);
    let entries: Vec<&Entry> = group.entries.iter().collect();
    show_entries(console, &entries);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EntryDraft, Times};
    use uuid::Uuid;

    fn fixed_entry(id: &str, title: &str) -> Entry {
        let mut entry = EntryDraft::new(title, "", "", "", None).build();
        entry.id = Uuid::parse_str(id).expect("uuid");
        entry.times = Times::now();
        entry
    }

    #[test]
    fn root_path_renders_as_root() {
        assert_eq!(pretty_path(&[]), "Root");
        assert_eq!(
            pretty_path(&["Email".to_string(), "Work".to_string()]),
            "Email > Work"
        );
    }

    #[test]
    fn entries_table_layout() {
        let mail = fixed_entry("6f0c1a52-3f5e-4c1b-9a53-0d2b8f1f4e01", "Mail");
        let bank = fixed_entry("0b9e7a8c-1d2e-4f3a-8b5c-6d7e8f9a0b1c", "Bank");
        let table = entries_table(&[&mail, &bank]).join("\n");
        insta::assert_snapshot!(table, @r###"
        ---------------------------------------------------------------------------------------------
         UUID                                | Title                                                |
        ---------------------------------------------------------------------------------------------
        6f0c1a52-3f5e-4c1b-9a53-0d2b8f1f4e01 | Mail                                                 |
        0b9e7a8c-1d2e-4f3a-8b5c-6d7e8f9a0b1c | Bank                                                 |
        ---------------------------------------------------------------------------------------------
        "###);
    }

    #[test]
    fn rows_line_up_with_the_rules() {
        let mail = fixed_entry("6f0c1a52-3f5e-4c1b-9a53-0d2b8f1f4e01", "Mail");
        for line in entries_table(&[&mail]) {
            assert_eq!(line.chars().count(), RULE_WIDTH, "{line}");
        }
    }

    #[test]
    fn empty_table_has_placeholder() {
        assert_eq!(entries_table(&[]), vec![" -- No entries found --"]);
    }

    #[test]
    fn secret_is_never_shown_on_cards() {
        let entry = EntryDraft::new("Mail", "bob", "pw1", "", None).build();
        let card = entry_card(&entry, &[], false).join("\n");
        assert!(!card.contains("pw1"));
        assert!(card.contains(SECRET_MASK));

        let empty = EntryDraft::new("Mail", "bob", "", "", None).build();
        assert!(entry_card(&empty, &[], false).join("\n").contains(SECRET_UNSET));
    }

    #[test]
    fn redisplay_is_stable() {
        let entry = EntryDraft::new("Mail", "bob", "pw1", "https://mail", Some("n")).build();
        let path = vec!["Email".to_string()];
        assert_eq!(entry_card(&entry, &path, false), entry_card(&entry, &path, false));
    }
}
