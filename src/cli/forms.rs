//! Field-by-field data entry used by every create and edit command.
//!
//! A form is an ordered list of [`FieldDescriptor`]s. [`FormEngine`] walks the
//! fields with an explicit [`FlowState`] machine: an interrupt at any prompt
//! moves to a cancel confirmation, and declining it returns to the same field
//! with everything collected so far intact. The engine never touches the store;
//! it hands the collected values back and the caller decides what to commit.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::console::{Console, LinePrompt, Prompted};
use super::errors::CommandError;
use super::resolver::choose_group;
use crate::store::{Database, Entry, EntryDraft, Group, GroupDraft};

/// Lifecycle of a field-collection flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Prompting(usize),
    /// Waiting on "Cancel ...?" after an interrupt at field `n`.
    ConfirmCancel(usize),
    ReviewConfirm,
    Committed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    FieldCompleted,
    Interrupted,
    CancelConfirmed,
    CancelDeclined,
    ReviewAccepted,
    ReviewDeclined,
}

impl FlowState {
    pub fn initial(field_count: usize) -> Self {
        if field_count == 0 {
            FlowState::ReviewConfirm
        } else {
            FlowState::Prompting(0)
        }
    }

    /// Applies `event`; events that do not apply to the state leave it unchanged.
    pub fn next(self, event: FlowEvent, field_count: usize) -> Self {
        use FlowEvent::*;
        use FlowState::*;
        match (self, event) {
            (Prompting(index), FieldCompleted) if index + 1 < field_count => Prompting(index + 1),
            (Prompting(_), FieldCompleted) => ReviewConfirm,
            (Prompting(index), Interrupted) => ConfirmCancel(index),
            (ConfirmCancel(index), CancelDeclined) => Prompting(index),
            (ConfirmCancel(_), CancelConfirmed) => Aborted,
            (ReviewConfirm, ReviewAccepted) => Committed,
            (ReviewConfirm, ReviewDeclined) => Aborted,
            (state, _) => state,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FlowState::Committed | FlowState::Aborted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Secret,
    MultiLine,
    /// Whole-tree group selection.
    Group,
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Asked first; answering no leaves the field untouched.
    pub edit_question: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
            edit_question: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn ask_before_editing(mut self, question: &'static str) -> Self {
        self.edit_question = Some(question);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FormDescriptor {
    /// Lower-case operation name, e.g. `adding entry`.
    pub operation: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

impl FormDescriptor {
    pub fn new(operation: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self { operation, fields }
    }

    pub fn cancel_prompt(&self) -> String {
        format!("Cancel {}?", self.operation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Group(Uuid),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<Uuid> {
        match self {
            FieldValue::Group(id) => Some(*id),
            FieldValue::Text(_) => None,
        }
    }
}

/// Values collected by a flow, keyed by field key. Untouched fields are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues(BTreeMap<&'static str, FieldValue>);

impl FieldValues {
    pub fn insert(&mut self, key: &'static str, value: FieldValue) {
        self.0.insert(key, value);
    }

    pub fn with_text(mut self, key: &'static str, value: Option<&str>) -> Self {
        self.insert(key, FieldValue::Text(value.unwrap_or_default().to_string()));
        self
    }

    pub fn with_group(mut self, key: &'static str, id: Uuid) -> Self {
        self.insert(key, FieldValue::Group(id));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn group(&self, key: &str) -> Option<Uuid> {
        self.get(key).and_then(FieldValue::as_group)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome<T> {
    Completed(T),
    Aborted,
}

/// Describes one form and turns its collected values into a typed result.
pub trait FormFlow {
    type Output;

    fn descriptor(&self) -> &FormDescriptor;

    /// Pre-filled answers; empty for text fields in create mode.
    fn defaults(&self) -> &FieldValues;

    fn build(&self, values: &FieldValues) -> Self::Output;
}

enum FieldAnswer {
    Value(FieldValue),
    Untouched,
    Interrupted,
    Rejected(String),
}

pub struct FormEngine<'a, F: FormFlow> {
    flow: &'a F,
}

impl<'a, F: FormFlow> FormEngine<'a, F> {
    pub fn new(flow: &'a F) -> Self {
        Self { flow }
    }

    /// Collects every field. Returns `Aborted` only when the user confirmed a
    /// cancel; console failures propagate as errors.
    pub fn run(
        &self,
        console: &mut dyn Console,
        database: &Database,
    ) -> Result<FlowOutcome<F::Output>, CommandError> {
        let descriptor = self.flow.descriptor();
        let defaults = self.flow.defaults();
        let count = descriptor.fields.len();
        let mut values = FieldValues::default();
        let mut state = FlowState::initial(count);

        loop {
            state = match state {
                FlowState::Prompting(index) => {
                    let field = &descriptor.fields[index];
                    match prompt_field(console, database, field, defaults.get(field.key))? {
                        FieldAnswer::Value(value) => {
                            values.insert(field.key, value);
                            state.next(FlowEvent::FieldCompleted, count)
                        }
                        FieldAnswer::Untouched => state.next(FlowEvent::FieldCompleted, count),
                        FieldAnswer::Interrupted => {
                            tracing::debug!(field = field.key, "prompt interrupted");
                            state.next(FlowEvent::Interrupted, count)
                        }
                        FieldAnswer::Rejected(message) => {
                            console.warning(&message);
                            state
                        }
                    }
                }
                FlowState::ConfirmCancel(_) => {
                    let event = if console.confirm_or_decline(&descriptor.cancel_prompt())? {
                        FlowEvent::CancelConfirmed
                    } else {
                        FlowEvent::CancelDeclined
                    };
                    state.next(event, count)
                }
                FlowState::ReviewConfirm | FlowState::Committed => {
                    return Ok(FlowOutcome::Completed(self.flow.build(&values)));
                }
                FlowState::Aborted => {
                    tracing::info!(operation = descriptor.operation, "flow cancelled by user");
                    return Ok(FlowOutcome::Aborted);
                }
            };
        }
    }
}

fn prompt_field(
    console: &mut dyn Console,
    database: &Database,
    field: &FieldDescriptor,
    default: Option<&FieldValue>,
) -> Result<FieldAnswer, CommandError> {
    if let Some(question) = field.edit_question {
        if !console.confirm_or_decline(question)? {
            return Ok(FieldAnswer::Untouched);
        }
    }

    if field.kind == FieldKind::Group {
        let default = default.and_then(FieldValue::as_group);
        return Ok(match choose_group(console, database, default)? {
            Prompted::Value(id) => FieldAnswer::Value(FieldValue::Group(id)),
            Prompted::Interrupted => FieldAnswer::Interrupted,
        });
    }

    let mut prompt =
        LinePrompt::new(field.label).with_default(default.and_then(FieldValue::as_text));
    match field.kind {
        FieldKind::Secret => prompt = prompt.masked(),
        FieldKind::MultiLine => prompt = prompt.multiline(),
        FieldKind::Text | FieldKind::Group => {}
    }

    Ok(match console.prompt_line(prompt)? {
        Prompted::Value(text) if field.required && text.trim().is_empty() => {
            FieldAnswer::Rejected(format!("{} cannot be empty", field.label))
        }
        Prompted::Value(text) => FieldAnswer::Value(FieldValue::Text(text)),
        Prompted::Interrupted => FieldAnswer::Interrupted,
    })
}

const TITLE: &str = "title";
const GROUP: &str = "group";
const USERNAME: &str = "username";
const SECRET: &str = "secret";
const URL: &str = "url";
const NOTES: &str = "notes";
const NAME: &str = "name";

/// Values collected for an entry: the candidate fields and its destination group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFormData {
    pub parent: Uuid,
    pub draft: EntryDraft,
}

pub struct EntryWizard {
    descriptor: FormDescriptor,
    defaults: FieldValues,
}

impl EntryWizard {
    pub fn new_create(default_parent: Uuid) -> Self {
        Self {
            descriptor: FormDescriptor::new("adding entry", entry_fields(false)),
            defaults: FieldValues::default().with_group(GROUP, default_parent),
        }
    }

    pub fn new_edit(entry: &Entry, parent: Uuid) -> Self {
        let defaults = FieldValues::default()
            .with_text(TITLE, entry.title.as_deref())
            .with_group(GROUP, parent)
            .with_text(USERNAME, entry.username.as_deref())
            .with_text(SECRET, entry.secret.as_deref())
            .with_text(URL, entry.url.as_deref())
            .with_text(NOTES, entry.notes.as_deref());
        Self {
            descriptor: FormDescriptor::new("editing entry", entry_fields(true)),
            defaults,
        }
    }
}

fn entry_fields(editing: bool) -> Vec<FieldDescriptor> {
    let mut notes = FieldDescriptor::new(NOTES, "Notes", FieldKind::MultiLine);
    if editing {
        notes = notes.ask_before_editing("Edit entry notes?");
    }
    vec![
        FieldDescriptor::new(TITLE, "Title", FieldKind::Text),
        FieldDescriptor::new(GROUP, "Group", FieldKind::Group),
        FieldDescriptor::new(USERNAME, "Username", FieldKind::Text),
        FieldDescriptor::new(SECRET, "Password", FieldKind::Secret),
        FieldDescriptor::new(URL, "URL", FieldKind::Text),
        notes,
    ]
}

impl FormFlow for EntryWizard {
    type Output = EntryFormData;

    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> &FieldValues {
        &self.defaults
    }

    fn build(&self, values: &FieldValues) -> EntryFormData {
        let text = |key: &str| values.text(key).unwrap_or_default();
        EntryFormData {
            parent: values
                .group(GROUP)
                .or_else(|| self.defaults.group(GROUP))
                .unwrap_or_default(),
            draft: EntryDraft::new(
                text(TITLE),
                text(USERNAME),
                text(SECRET),
                text(URL),
                values.text(NOTES),
            ),
        }
    }
}

/// Values collected for a group. `parent` is only set when creating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFormData {
    pub parent: Option<Uuid>,
    pub draft: GroupDraft,
}

pub struct GroupWizard {
    descriptor: FormDescriptor,
    defaults: FieldValues,
}

impl GroupWizard {
    pub fn new_create(default_parent: Uuid) -> Self {
        let fields = vec![
            FieldDescriptor::new(NAME, "Name", FieldKind::Text).required(),
            FieldDescriptor::new(GROUP, "Parent group", FieldKind::Group),
            FieldDescriptor::new(NOTES, "Notes", FieldKind::MultiLine),
        ];
        Self {
            descriptor: FormDescriptor::new("adding group", fields),
            defaults: FieldValues::default().with_group(GROUP, default_parent),
        }
    }

    pub fn new_edit(group: &Group) -> Self {
        let fields = vec![
            FieldDescriptor::new(NAME, "Name", FieldKind::Text).required(),
            FieldDescriptor::new(NOTES, "Notes", FieldKind::MultiLine)
                .ask_before_editing("Edit group notes?"),
        ];
        let defaults = FieldValues::default()
            .with_text(NAME, Some(&group.name))
            .with_text(NOTES, group.notes.as_deref());
        Self {
            descriptor: FormDescriptor::new("editing group", fields),
            defaults,
        }
    }
}

impl FormFlow for GroupWizard {
    type Output = GroupFormData;

    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> &FieldValues {
        &self.defaults
    }

    fn build(&self, values: &FieldValues) -> GroupFormData {
        GroupFormData {
            parent: values.group(GROUP),
            draft: GroupDraft::new(values.text(NAME).unwrap_or_default(), values.text(NOTES)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::script::ScriptedConsole;

    #[test]
    fn state_machine_transitions() {
        let count = 2;
        let start = FlowState::initial(count);
        assert_eq!(start, FlowState::Prompting(0));
        let second = start.next(FlowEvent::FieldCompleted, count);
        assert_eq!(second, FlowState::Prompting(1));
        let confirm = second.next(FlowEvent::Interrupted, count);
        assert_eq!(confirm, FlowState::ConfirmCancel(1));
        assert_eq!(confirm.next(FlowEvent::CancelDeclined, count), FlowState::Prompting(1));
        assert_eq!(confirm.next(FlowEvent::CancelConfirmed, count), FlowState::Aborted);
        let review = second.next(FlowEvent::FieldCompleted, count);
        assert_eq!(review, FlowState::ReviewConfirm);
        assert_eq!(review.next(FlowEvent::ReviewAccepted, count), FlowState::Committed);
        assert_eq!(review.next(FlowEvent::ReviewDeclined, count), FlowState::Aborted);
        assert!(FlowState::Aborted.next(FlowEvent::FieldCompleted, count).is_terminal());
    }

    #[test]
    fn create_entry_collects_all_fields() {
        let db = Database::new();
        let wizard = EntryWizard::new_create(db.root_id());
        let mut console =
            ScriptedConsole::new(["Mail", "", "bob", "pw1", "https://mail", "hello", "."]);
        let outcome = FormEngine::new(&wizard).run(&mut console, &db).expect("run");
        let FlowOutcome::Completed(data) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(data.parent, db.root_id());
        assert_eq!(data.draft, EntryDraft::new("Mail", "bob", "pw1", "https://mail", Some("hello")));
    }

    #[test]
    fn confirmed_cancel_aborts() {
        let db = Database::new();
        let wizard = EntryWizard::new_create(db.root_id());
        let mut console = ScriptedConsole::new(["Mail", "", "<INTERRUPT>", "y"]);
        let outcome = FormEngine::new(&wizard).run(&mut console, &db).expect("run");
        assert_eq!(outcome, FlowOutcome::Aborted);
        assert!(console.transcript().contains("Cancel adding entry? [y/N]"));
    }

    #[test]
    fn declined_cancel_reprompts_same_field_with_original_default() {
        let mut db = Database::new();
        let root = db.root_id();
        let id = db
            .add_entry(root, &EntryDraft::new("Mail", "bob", "pw1", "", Some("n")))
            .expect("entry");
        let entry = db.entry(id).cloned().expect("entry");
        let wizard = EntryWizard::new_edit(&entry, root);
        let mut console = ScriptedConsole::new([
            "Mail 2",      // title
            "",            // group: keep
            "<INTERRUPT>", // username
            "n",           // do not cancel
            "",            // username: keep default
            "",            // password: keep
            "",            // url
            "n",           // leave notes alone
        ]);
        let transcript = console.transcript();
        let outcome = FormEngine::new(&wizard).run(&mut console, &db).expect("run");
        let FlowOutcome::Completed(data) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(transcript.count("Username [bob] >"), 2);
        assert_eq!(data.draft.title.as_deref(), Some("Mail 2"));
        assert_eq!(data.draft.username.as_deref(), Some("bob"));
        assert_eq!(data.draft.secret.as_deref(), Some("pw1"));
        assert_eq!(data.draft.notes, None);
    }

    #[test]
    fn interrupt_during_group_choice_asks_to_cancel() {
        let db = Database::new();
        let wizard = GroupWizard::new_create(db.root_id());
        let mut console =
            ScriptedConsole::new(["Work", "<INTERRUPT>", "n", "1", "notes", "."]);
        let outcome = FormEngine::new(&wizard).run(&mut console, &db).expect("run");
        let FlowOutcome::Completed(data) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(data.parent, Some(db.root_id()));
        assert_eq!(data.draft.name, "Work");
        assert_eq!(data.draft.notes, Some(Some("notes".into())));
    }

    #[test]
    fn required_field_is_asked_again_when_blank() {
        let mut db = Database::new();
        let root = db.root_id();
        let gid = db.add_group(root, &GroupDraft::new("Old", None)).expect("group");
        let group = db.group(gid).cloned().expect("group");
        let wizard = GroupWizard::new_edit(&group);
        let mut console = ScriptedConsole::new(["<BLANK>", "New", "n"]);
        let outcome = FormEngine::new(&wizard).run(&mut console, &db).expect("run");
        assert!(console.transcript().contains("Name cannot be empty"));
        let FlowOutcome::Completed(data) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(data.draft, GroupDraft::new("New", None));
        assert_eq!(data.parent, None);
    }
}
