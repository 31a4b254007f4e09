use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Entry, EntryDraft, Group, GroupDraft};
use crate::errors::StoreError;

type Result<T> = std::result::Result<T, StoreError>;

pub const ROOT_GROUP_NAME: &str = "Root";
pub const RECYCLE_BIN_NAME: &str = "Recycle Bin";

/// Text fields that support pattern search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Title,
    Username,
}

impl EntryField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "username" => Some(Self::Username),
            _ => None,
        }
    }

    fn read<'a>(&self, entry: &'a Entry) -> Option<&'a str> {
        match self {
            EntryField::Title => entry.title.as_deref(),
            EntryField::Username => entry.username.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFilter {
    Id(Uuid),
    /// Case-insensitive search over one field, optionally limited to a subtree.
    Matching {
        field: EntryField,
        pattern: String,
        within: Option<Uuid>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupFilter {
    Id(Uuid),
    NameMatching(String),
}

/// The whole credential tree plus the recycle-bin designation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    root: Group,
    #[serde(default)]
    recycle_bin: Option<Uuid>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        Self {
            root: Group::new(ROOT_GROUP_NAME),
            recycle_bin: None,
        }
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub fn root_id(&self) -> Uuid {
        self.root.id
    }

    pub fn group(&self, id: Uuid) -> Option<&Group> {
        find_group(&self.root, id)
    }

    pub fn group_mut(&mut self, id: Uuid) -> Option<&mut Group> {
        find_group_mut(&mut self.root, id)
    }

    pub fn entry(&self, id: Uuid) -> Option<&Entry> {
        self.entry_parent(id)
            .and_then(|group| group.entries.iter().find(|entry| entry.id == id))
    }

    pub fn entry_mut(&mut self, id: Uuid) -> Option<&mut Entry> {
        entry_owner_mut(&mut self.root, id)
            .and_then(|group| group.entries.iter_mut().find(|entry| entry.id == id))
    }

    pub fn entry_parent(&self, id: Uuid) -> Option<&Group> {
        entry_owner(&self.root, id)
    }

    pub fn group_parent(&self, id: Uuid) -> Option<&Group> {
        group_owner(&self.root, id)
    }

    /// Group names from the root (exclusive) down to `id` (inclusive).
    pub fn group_path(&self, id: Uuid) -> Option<Vec<String>> {
        let mut trail = Vec::new();
        if path_to(&self.root, id, &mut trail) {
            Some(trail)
        } else {
            None
        }
    }

    /// The path of the group that currently owns the entry.
    pub fn entry_path(&self, id: Uuid) -> Option<Vec<String>> {
        let parent = self.entry_parent(id)?;
        self.group_path(parent.id)
    }

    /// Every group in pre-order, root first.
    pub fn groups(&self) -> Vec<&Group> {
        let mut out = Vec::new();
        self.root.visit(&mut out);
        out
    }

    pub fn entries(&self) -> Vec<&Entry> {
        self.groups()
            .into_iter()
            .flat_map(|group| group.entries.iter())
            .collect()
    }

    pub fn contains_id(&self, id: Uuid) -> bool {
        self.groups()
            .into_iter()
            .any(|group| group.id == id || group.entries.iter().any(|entry| entry.id == id))
    }

    pub fn find_entries(&self, filter: &EntryFilter) -> Vec<&Entry> {
        match filter {
            EntryFilter::Id(id) => self.entry(*id).into_iter().collect(),
            EntryFilter::Matching {
                field,
                pattern,
                within,
            } => {
                let Some(matcher) = text_matcher(pattern) else {
                    return Vec::new();
                };
                let scope = match within {
                    Some(id) => match self.group(*id) {
                        Some(group) => group,
                        None => return Vec::new(),
                    },
                    None => &self.root,
                };
                let mut groups = Vec::new();
                scope.visit(&mut groups);
                groups
                    .into_iter()
                    .flat_map(|group| group.entries.iter())
                    .filter(|entry| field.read(entry).is_some_and(|text| matcher.is_match(text)))
                    .collect()
            }
        }
    }

    pub fn find_groups(&self, filter: &GroupFilter) -> Vec<&Group> {
        match filter {
            GroupFilter::Id(id) => self.group(*id).into_iter().collect(),
            GroupFilter::NameMatching(pattern) => {
                let Some(matcher) = text_matcher(pattern) else {
                    return Vec::new();
                };
                self.groups()
                    .into_iter()
                    .filter(|group| matcher.is_match(&group.name))
                    .collect()
            }
        }
    }

    /// Places an already-built entry under `parent`.
    pub fn insert_entry(&mut self, parent: Uuid, entry: Entry) -> Result<Uuid> {
        if self.contains_id(entry.id) {
            return Err(StoreError::Refused(format!(
                "identifier {} already in use",
                entry.id
            )));
        }
        let id = entry.id;
        let group = self
            .group_mut(parent)
            .ok_or_else(|| StoreError::InvalidRef(format!("group {parent}")))?;
        group.entries.push(entry);
        Ok(id)
    }

    pub fn insert_group(&mut self, parent: Uuid, group: Group) -> Result<Uuid> {
        let mut incoming = Vec::new();
        group.visit(&mut incoming);
        for node in &incoming {
            if self.contains_id(node.id) || node.entries.iter().any(|e| self.contains_id(e.id)) {
                return Err(StoreError::Refused(format!(
                    "identifier {} already in use",
                    node.id
                )));
            }
        }
        let id = group.id;
        let target = self
            .group_mut(parent)
            .ok_or_else(|| StoreError::InvalidRef(format!("group {parent}")))?;
        target.groups.push(group);
        Ok(id)
    }

    pub fn add_entry(&mut self, parent: Uuid, draft: &EntryDraft) -> Result<Uuid> {
        self.insert_entry(parent, draft.build())
    }

    pub fn add_group(&mut self, parent: Uuid, draft: &GroupDraft) -> Result<Uuid> {
        self.insert_group(parent, draft.build())
    }

    pub fn delete_entry(&mut self, id: Uuid) -> Result<Entry> {
        let owner = entry_owner_mut(&mut self.root, id)
            .ok_or_else(|| StoreError::InvalidRef(format!("entry {id}")))?;
        let position = owner
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| StoreError::InvalidRef(format!("entry {id}")))?;
        Ok(owner.entries.remove(position))
    }

    /// Removes the group and its whole subtree.
    pub fn delete_group(&mut self, id: Uuid) -> Result<Group> {
        if id == self.root.id {
            return Err(StoreError::Refused("the root group cannot be removed".into()));
        }
        let owner = group_owner_mut(&mut self.root, id)
            .ok_or_else(|| StoreError::InvalidRef(format!("group {id}")))?;
        let position = owner
            .groups
            .iter()
            .position(|group| group.id == id)
            .ok_or_else(|| StoreError::InvalidRef(format!("group {id}")))?;
        let removed = owner.groups.remove(position);
        if let Some(bin) = self.recycle_bin {
            if find_group(&removed, bin).is_some() {
                self.recycle_bin = None;
            }
        }
        Ok(removed)
    }

    pub fn move_entry(&mut self, id: Uuid, new_parent: Uuid) -> Result<()> {
        if self.group(new_parent).is_none() {
            return Err(StoreError::InvalidRef(format!("group {new_parent}")));
        }
        match self.entry_parent(id) {
            Some(parent) if parent.id == new_parent => return Ok(()),
            Some(_) => {}
            None => return Err(StoreError::InvalidRef(format!("entry {id}"))),
        }
        let entry = self.delete_entry(id)?;
        let target = self
            .group_mut(new_parent)
            .ok_or_else(|| StoreError::InvalidRef(format!("group {new_parent}")))?;
        target.entries.push(entry);
        Ok(())
    }

    pub fn move_group(&mut self, id: Uuid, new_parent: Uuid) -> Result<()> {
        if id == self.root.id {
            return Err(StoreError::Refused("the root group cannot be moved".into()));
        }
        if self.is_within(id, new_parent) {
            return Err(StoreError::Refused(
                "a group cannot be moved into its own subtree".into(),
            ));
        }
        if self.group(new_parent).is_none() {
            return Err(StoreError::InvalidRef(format!("group {new_parent}")));
        }
        match self.group_parent(id) {
            Some(parent) if parent.id == new_parent => return Ok(()),
            Some(_) => {}
            None => return Err(StoreError::InvalidRef(format!("group {id}"))),
        }
        let bin = self.recycle_bin;
        let group = self.delete_group(id)?;
        self.recycle_bin = bin;
        let target = self
            .group_mut(new_parent)
            .ok_or_else(|| StoreError::InvalidRef(format!("group {new_parent}")))?;
        target.groups.push(group);
        Ok(())
    }

    /// True when `id` is `ancestor` itself or lives somewhere beneath it.
    pub fn is_within(&self, ancestor: Uuid, id: Uuid) -> bool {
        self.group(ancestor)
            .is_some_and(|group| find_group(group, id).is_some())
    }

    pub fn recycle_bin(&self) -> Option<&Group> {
        self.recycle_bin.and_then(|id| self.group(id))
    }

    pub fn recycle_bin_id(&self) -> Option<Uuid> {
        self.recycle_bin().map(|group| group.id)
    }

    pub fn set_recycle_bin(&mut self, id: Option<Uuid>) -> Result<()> {
        if let Some(id) = id {
            if self.group(id).is_none() {
                return Err(StoreError::InvalidRef(format!("group {id}")));
            }
        }
        self.recycle_bin = id;
        Ok(())
    }

    /// Returns the designated recycle bin, creating one under the root when absent.
    pub fn ensure_recycle_bin(&mut self) -> Uuid {
        if let Some(id) = self.recycle_bin_id() {
            return id;
        }
        let bin = Group::new(RECYCLE_BIN_NAME);
        let id = bin.id;
        self.root.groups.push(bin);
        self.recycle_bin = Some(id);
        tracing::info!(%id, "created recycle bin group");
        id
    }

    /// Moves the entry under the recycle bin and returns the bin's id.
    pub fn trash_entry(&mut self, id: Uuid) -> Result<Uuid> {
        if self.entry(id).is_none() {
            return Err(StoreError::InvalidRef(format!("entry {id}")));
        }
        let bin = self.ensure_recycle_bin();
        self.move_entry(id, bin)?;
        Ok(bin)
    }

    pub fn trash_group(&mut self, id: Uuid) -> Result<Uuid> {
        if self.group(id).is_none() {
            return Err(StoreError::InvalidRef(format!("group {id}")));
        }
        if let Some(bin) = self.recycle_bin_id() {
            if self.is_within(id, bin) {
                return Err(StoreError::Refused(
                    "the group holds the recycle bin".into(),
                ));
            }
        }
        let bin = self.ensure_recycle_bin();
        self.move_group(id, bin)?;
        Ok(bin)
    }

    pub fn touch_entry(&mut self, id: Uuid) -> Result<()> {
        let entry = self
            .entry_mut(id)
            .ok_or_else(|| StoreError::InvalidRef(format!("entry {id}")))?;
        entry.times.touch();
        Ok(())
    }

    pub fn touch_group(&mut self, id: Uuid) -> Result<()> {
        let group = self
            .group_mut(id)
            .ok_or_else(|| StoreError::InvalidRef(format!("group {id}")))?;
        group.times.touch();
        Ok(())
    }

    /// An entry counts as recycled when its parent path equals the bin's path.
    pub fn is_entry_recycled(&self, id: Uuid) -> bool {
        match (self.recycle_bin_path(), self.entry_path(id)) {
            (Some(bin), Some(path)) => bin == path,
            _ => false,
        }
    }

    pub fn is_group_recycled(&self, id: Uuid) -> bool {
        let parent_path = self
            .group_parent(id)
            .and_then(|parent| self.group_path(parent.id));
        match (self.recycle_bin_path(), parent_path) {
            (Some(bin), Some(path)) => bin == path,
            _ => false,
        }
    }

    fn recycle_bin_path(&self) -> Option<Vec<String>> {
        self.recycle_bin_id().and_then(|id| self.group_path(id))
    }

    /// Checks identifier uniqueness after loading and drops a dangling bin reference.
    pub fn validate(&mut self) -> Result<()> {
        let mut seen = HashSet::new();
        for group in self.groups() {
            if !seen.insert(group.id) {
                return Err(StoreError::Corrupt(format!(
                    "duplicate identifier {}",
                    group.id
                )));
            }
            for entry in &group.entries {
                if !seen.insert(entry.id) {
                    return Err(StoreError::Corrupt(format!(
                        "duplicate identifier {}",
                        entry.id
                    )));
                }
            }
        }
        if let Some(bin) = self.recycle_bin {
            if self.group(bin).is_none() {
                tracing::warn!(%bin, "recycle bin reference points at a missing group");
                self.recycle_bin = None;
            }
        }
        Ok(())
    }
}

fn text_matcher(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

fn find_group(group: &Group, id: Uuid) -> Option<&Group> {
    if group.id == id {
        return Some(group);
    }
    group.groups.iter().find_map(|child| find_group(child, id))
}

fn find_group_mut(group: &mut Group, id: Uuid) -> Option<&mut Group> {
    if group.id == id {
        return Some(group);
    }
    group
        .groups
        .iter_mut()
        .find_map(|child| find_group_mut(child, id))
}

fn entry_owner(group: &Group, id: Uuid) -> Option<&Group> {
    if group.entries.iter().any(|entry| entry.id == id) {
        return Some(group);
    }
    group.groups.iter().find_map(|child| entry_owner(child, id))
}

fn entry_owner_mut(group: &mut Group, id: Uuid) -> Option<&mut Group> {
    if group.entries.iter().any(|entry| entry.id == id) {
        return Some(group);
    }
    group
        .groups
        .iter_mut()
        .find_map(|child| entry_owner_mut(child, id))
}

fn group_owner(group: &Group, id: Uuid) -> Option<&Group> {
    if group.groups.iter().any(|child| child.id == id) {
        return Some(group);
    }
    group.groups.iter().find_map(|child| group_owner(child, id))
}

fn group_owner_mut(group: &mut Group, id: Uuid) -> Option<&mut Group> {
    if group.groups.iter().any(|child| child.id == id) {
        return Some(group);
    }
    group
        .groups
        .iter_mut()
        .find_map(|child| group_owner_mut(child, id))
}

fn path_to(group: &Group, id: Uuid, trail: &mut Vec<String>) -> bool {
    if group.id == id {
        return true;
    }
    for child in &group.groups {
        trail.push(child.name.clone());
        if path_to(child, id, trail) {
            return true;
        }
        trail.pop();
    }
    false
}
