//! Tree node types for the credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Creation and last-modification stamps shared by entries and groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Times {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Times {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created: now,
            modified: now,
        }
    }

    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

/// A single credential record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub times: Times,
}

impl Entry {
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn has_secret(&self) -> bool {
        self.secret.as_deref().is_some_and(|secret| !secret.is_empty())
    }

    /// Copies the draft's fields over this entry, keeping identity and stamps.
    pub fn apply(&mut self, draft: &EntryDraft) {
        self.title = draft.title.clone();
        self.username = draft.username.clone();
        self.secret = draft.secret.clone();
        self.url = draft.url.clone();
        if let Some(notes) = &draft.notes {
            self.notes = notes.clone();
        }
    }
}

/// A named container of entries and sub-groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub times: Times,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            notes: None,
            times: Times::now(),
            entries: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn apply(&mut self, draft: &GroupDraft) {
        self.name = draft.name.clone();
        if let Some(notes) = &draft.notes {
            self.notes = notes.clone();
        }
    }

    /// Number of entries in this group and every descendant.
    pub fn total_entries(&self) -> usize {
        self.entries.len()
            + self
                .groups
                .iter()
                .map(Group::total_entries)
                .sum::<usize>()
    }

    pub(crate) fn visit<'a>(&'a self, out: &mut Vec<&'a Group>) {
        out.push(self);
        for child in &self.groups {
            child.visit(out);
        }
    }
}

/// Field values for an entry that has not been placed in the tree.
///
/// `notes: None` leaves the stored notes untouched when applied to an
/// existing entry; `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: Option<String>,
    pub username: Option<String>,
    pub secret: Option<String>,
    pub url: Option<String>,
    pub notes: Option<Option<String>>,
}

impl EntryDraft {
    pub fn new(
        title: &str,
        username: &str,
        secret: &str,
        url: &str,
        notes: Option<&str>,
    ) -> Self {
        Self {
            title: non_blank(title),
            username: non_blank(username),
            secret: non_blank(secret),
            url: non_blank(url),
            notes: notes.map(non_blank),
        }
    }

    /// Materializes the draft as a brand new entry with a fresh id.
    pub fn build(&self) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            title: self.title.clone(),
            username: self.username.clone(),
            secret: self.secret.clone(),
            url: self.url.clone(),
            notes: self.notes.clone().flatten(),
            times: Times::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDraft {
    pub name: String,
    pub notes: Option<Option<String>>,
}

impl GroupDraft {
    pub fn new(name: &str, notes: Option<&str>) -> Self {
        Self {
            name: name.trim().to_string(),
            notes: notes.map(non_blank),
        }
    }

    pub fn build(&self) -> Group {
        let mut group = Group::new(self.name.clone());
        group.notes = self.notes.clone().flatten();
        group
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
