//! Task data structures, drafts and validation.
//!
//! A `Task` is the stored record shared by every board. Sponsorship tasks carry an
//! additional `Sponsorship` block with the pipeline stage and deal figures; its
//! `expectedRevenue` is always derived from the deal value and probability when the
//! task is saved. A `TaskDraft` is the editable, unvalidated form of a task as it
//! arrives from a caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DraftField, ValidationErrors};
use crate::fields::*;

/// An optional point in time that remembers whether it was absent or explicitly `null`.
///
/// `None` is absent, `Some(None)` is an explicit `null`, `Some(Some(t))` is a timestamp.
pub type NullableDate = Option<Option<DateTime<Utc>>>;

/// Treat a present field as `Some`, so that `null` becomes `Some(None)` instead of `None`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A work item on one of the department boards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    pub id: u64,
    pub section: Section,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_present")]
    pub deadline: NullableDate,
    pub status: Status,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub sponsorship: Option<Sponsorship>,
}

/// Wire names of the `Sponsorship` fields flattened into a task record.
const SPONSORSHIP_KEYS: [&str; 10] = [
    "pipelineStage",
    "dealValue",
    "probability",
    "expectedRevenue",
    "company",
    "contactName",
    "lastContacted",
    "nextFollowUp",
    "source",
    "stageNotes",
];

/// A stored task as read from disk, with the sponsorship keys still unparsed.
///
/// Deal data is parsed strictly: one bad field fails the whole task.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: u64,
    section: Section,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    deadline: NullableDate,
    status: Status,
    priority: Priority,
    #[serde(default)]
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = serde_json::Error;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let has_deal_data = record.rest.keys().any(|k| SPONSORSHIP_KEYS.contains(&k.as_str()));
        let sponsorship = if has_deal_data {
            let s = serde_json::from_value(serde_json::Value::Object(record.rest)).map_err(|e| {
                <serde_json::Error as serde::de::Error>::custom(format!(
                    "task {}: invalid sponsorship data: {e}",
                    record.id
                ))
            })?;
            Some(s)
        } else {
            None
        };
        Ok(Task {
            id: record.id,
            section: record.section,
            title: record.title,
            description: record.description,
            owner: record.owner,
            deadline: record.deadline,
            status: record.status,
            priority: record.priority,
            notes: record.notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
            sponsorship,
        })
    }
}

/// Pipeline and deal data carried by tasks on the sponsorship board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsorship {
    pub pipeline_stage: PipelineStage,
    pub deal_value: f64,
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_revenue: Option<f64>,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_present")]
    pub last_contacted: NullableDate,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_present")]
    pub next_follow_up: NullableDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_notes: Option<String>,
}

impl Default for Sponsorship {
    fn default() -> Self {
        Sponsorship {
            pipeline_stage: PipelineStage::Identified,
            deal_value: 0.0,
            probability: 0.0,
            expected_revenue: Some(0.0),
            company: String::new(),
            contact_name: String::new(),
            last_contacted: None,
            next_follow_up: None,
            source: None,
            stage_notes: None,
        }
    }
}

/// Probability-weighted value of a deal: `deal_value * probability / 100`.
pub fn expected_revenue(deal_value: f64, probability: f64) -> f64 {
    deal_value * probability / 100.0
}

impl Sponsorship {
    /// Overwrite the stored expected revenue with the value derived from the deal figures.
    pub fn recompute_expected_revenue(&mut self) {
        self.expected_revenue = Some(expected_revenue(self.deal_value, self.probability));
    }

    /// Stored expected revenue, or the derived value for records saved without one.
    pub fn expected_or_derived(&self) -> f64 {
        self.expected_revenue
            .unwrap_or_else(|| expected_revenue(self.deal_value, self.probability))
    }
}

impl Task {
    /// Create a task with the defaults of a freshly added card.
    pub fn new(id: u64, section: Section, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Task {
            id,
            section,
            title: title.into(),
            description: None,
            owner: None,
            deadline: None,
            status: Status::NotStarted,
            priority: Priority::Medium,
            notes: None,
            created_at: now,
            updated_at: now,
            sponsorship: section.uses_pipeline().then(Sponsorship::default),
        }
    }

    pub fn deadline_at(&self) -> Option<DateTime<Utc>> {
        self.deadline.flatten()
    }

    pub fn is_sponsorship(&self) -> bool {
        self.section.uses_pipeline()
    }

    /// The kanban column this task currently sits in.
    pub fn column(&self) -> Column {
        match &self.sponsorship {
            Some(s) => Column::Stage(s.pipeline_stage),
            None => Column::Status(self.status),
        }
    }
}

/// Editable sponsorship fields, with the numeric inputs still in text form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SponsorshipDraft {
    pub pipeline_stage: PipelineStage,
    pub company: String,
    pub contact_name: String,
    pub deal_value: String,
    pub probability: String,
    pub last_contacted: Option<DateTime<Utc>>,
    pub next_follow_up: Option<DateTime<Utc>>,
    pub source: String,
    pub stage_notes: String,
}

/// A task as submitted by a caller, before validation and normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    /// Id of the task being edited, `None` when adding.
    pub id: Option<u64>,
    pub section: Section,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Status,
    pub priority: Priority,
    pub notes: String,
    pub sponsorship: Option<SponsorshipDraft>,
}

impl TaskDraft {
    /// A blank draft for a new task in `section`.
    pub fn new(section: Section, title: impl Into<String>) -> Self {
        TaskDraft {
            id: None,
            section,
            title: title.into(),
            description: String::new(),
            owner: String::new(),
            deadline: None,
            status: Status::NotStarted,
            priority: Priority::Medium,
            notes: String::new(),
            sponsorship: section.uses_pipeline().then(|| SponsorshipDraft {
                probability: "0".into(),
                ..SponsorshipDraft::default()
            }),
        }
    }

    /// A draft pre-filled from an existing task, for editing.
    pub fn from_task(task: &Task) -> Self {
        TaskDraft {
            id: Some(task.id),
            section: task.section,
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            owner: task.owner.clone().unwrap_or_default(),
            deadline: task.deadline_at(),
            status: task.status,
            priority: task.priority,
            notes: task.notes.clone().unwrap_or_default(),
            sponsorship: task.sponsorship.as_ref().map(|s| SponsorshipDraft {
                pipeline_stage: s.pipeline_stage,
                company: s.company.clone(),
                contact_name: s.contact_name.clone(),
                deal_value: s.deal_value.to_string(),
                probability: s.probability.to_string(),
                last_contacted: s.last_contacted.flatten(),
                next_follow_up: s.next_follow_up.flatten(),
                source: s.source.clone().unwrap_or_default(),
                stage_notes: s.stage_notes.clone().unwrap_or_default(),
            }),
        }
    }

    /// Validate, then build the normalised task record.
    ///
    /// `created_at` is kept as given; `updated_at` is stamped by the store on upsert.
    pub fn into_task(self, id: u64, created_at: DateTime<Utc>) -> Result<Task, ValidationErrors> {
        validate_draft(&self)?;

        let sponsorship = if self.section.uses_pipeline() {
            let draft = self.sponsorship.unwrap_or_default();
            let mut s = Sponsorship {
                pipeline_stage: draft.pipeline_stage,
                deal_value: parse_amount(&draft.deal_value).unwrap_or(0.0),
                probability: parse_amount(&draft.probability).unwrap_or(0.0),
                expected_revenue: None,
                company: draft.company.trim().to_string(),
                contact_name: draft.contact_name.trim().to_string(),
                last_contacted: Some(draft.last_contacted),
                next_follow_up: Some(draft.next_follow_up),
                source: non_empty(&draft.source),
                stage_notes: non_empty(&draft.stage_notes),
            };
            s.recompute_expected_revenue();
            Some(s)
        } else {
            None
        };

        Ok(Task {
            id,
            section: self.section,
            title: self.title.trim().to_string(),
            description: non_empty(&self.description),
            owner: non_empty(&self.owner),
            deadline: Some(self.deadline),
            status: self.status,
            priority: self.priority,
            notes: non_empty(&self.notes),
            created_at,
            updated_at: created_at,
            sponsorship,
        })
    }
}

/// Check a draft before anything is saved.
///
/// The title must be non-empty after trimming. On the sponsorship board the probability
/// must be a number in `[0, 100]` and the deal value a non-negative number; empty numeric
/// inputs count as zero.
pub fn validate_draft(draft: &TaskDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if draft.title.trim().is_empty() {
        errors.insert(DraftField::Title, "Title is required.");
    }

    if draft.section.uses_pipeline() {
        if let Some(s) = &draft.sponsorship {
            match parse_amount(&s.probability) {
                Some(p) if (0.0..=100.0).contains(&p) => {}
                _ => errors.insert(DraftField::Probability, "Probability must be between 0 and 100."),
            }
            match parse_amount(&s.deal_value) {
                Some(v) if v >= 0.0 => {}
                _ => errors.insert(DraftField::DealValue, "Deal value must be a non-negative number."),
            }
        }
    }

    errors.into_result()
}

/// Parse a numeric form input; blank input is zero, non-finite values are rejected.
fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}
