//! Yes/no confirmation collaborator for destructive actions.

use crate::model::{GroupId, RowId};
use std::fmt;

/// A destructive action awaiting the user's go-ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    /// Removing a group that rows still reference; they become ungrouped.
    RemoveGroupWithRows {
        /// Group being removed.
        group: GroupId,
        /// Number of rows tagged with it.
        rows: usize,
    },
    /// Removing a field clears its value on every row.
    RemoveField {
        /// Field being removed.
        name: String,
    },
    /// Deleting the selected rows.
    DeleteRows {
        /// Existing rows in the selection.
        rows: Vec<RowId>,
    },
}

impl fmt::Display for ConfirmPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmPrompt::RemoveGroupWithRows { group, rows } => write!(
                f,
                "Group {group} still holds {rows} row(s); they will lose their group. Remove it?"
            ),
            ConfirmPrompt::RemoveField { name } => write!(
                f,
                "Remove field '{name}'? Its data will be cleared from every row."
            ),
            ConfirmPrompt::DeleteRows { rows } => {
                write!(f, "Delete the {} selected row(s)?", rows.len())
            }
        }
    }
}

/// Answers confirmation prompts.
pub trait Confirm {
    /// `true` to go ahead with the action described by `prompt`.
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&ConfirmPrompt) -> bool,
{
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool {
        self(prompt)
    }
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysAnswer(pub bool);

impl Confirm for AlwaysAnswer {
    fn confirm(&mut self, _prompt: &ConfirmPrompt) -> bool {
        self.0
    }
}
