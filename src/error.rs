//! Error types for the dashboard core.
//!
//! Validation failures carry a field-keyed message map and never mutate state.
//! Store errors are caller contract violations (wrong section, wrong column kind).
//! Not-found on delete/move is not an error at all; those operations report a no-op.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::fields::Section;

/// A label that does not name any known value of a field enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised value '{input}'")]
pub struct ParseFieldError {
    pub input: String,
}

impl ParseFieldError {
    pub fn new(input: &str) -> Self {
        Self { input: input.to_string() }
    }
}

/// Draft fields that validation can reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DraftField {
    Title,
    Probability,
    DealValue,
}

impl DraftField {
    pub fn name(self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::Probability => "probability",
            DraftField::DealValue => "dealValue",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field-keyed validation messages for a rejected draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_messages(.errors))]
pub struct ValidationErrors {
    errors: BTreeMap<DraftField, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: DraftField, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: DraftField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DraftField, &str)> {
        self.errors.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn join_messages(errors: &BTreeMap<DraftField, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Caller errors raised by the section store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("section '{0}' has no task board")]
    NotABoardSection(Section),

    #[error("task {id} in section '{section}' does not match the section's task shape")]
    DetailsMismatch { id: u64, section: Section },

    #[error("column '{column}' does not belong to the '{section}' board")]
    ColumnMismatch { column: String, section: Section },
}

/// Errors surfaced by dashboard commands.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("invalid task")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("team member name must not be empty")]
    EmptyMemberName,
}

/// Failures reading or writing the on-disk state.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} does not exist", .path.display())]
    Missing { path: PathBuf },
}
