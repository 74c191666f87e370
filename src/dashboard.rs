//! The dashboard command interface.
//!
//! `Dashboard` owns the section store, the settings and a clock, and exposes the commands
//! a caller (the CLI, or any other front end) issues. Each command validates its input
//! before touching state, so a rejected command leaves everything as it was.

use chrono::{DateTime, Utc};

use crate::error::DashboardError;
use crate::fields::*;
use crate::settings::{parse_amount_or_zero, Settings};
use crate::store::{SectionStore, Upserted};
use crate::summary::{summarize, Summary};
use crate::task::TaskDraft;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// Result of saving a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Saved {
    pub id: u64,
    pub section: Section,
    pub outcome: Upserted,
}

pub struct Dashboard<C: Clock = SystemClock> {
    store: SectionStore,
    settings: Settings,
    clock: C,
}

impl Dashboard<SystemClock> {
    pub fn new(store: SectionStore, settings: Settings) -> Self {
        Dashboard::with_clock(store, settings, SystemClock)
    }
}

impl<C: Clock> Dashboard<C> {
    pub fn with_clock(store: SectionStore, settings: Settings, clock: C) -> Self {
        Dashboard { store, settings, clock }
    }

    pub fn store(&self) -> &SectionStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn into_parts(self) -> (SectionStore, Settings) {
        (self.store, self.settings)
    }

    /// Validate and save a draft, adding a new task or updating an existing one.
    ///
    /// When the draft names an existing task, that task's section and creation time are
    /// kept whatever the draft says. Unknown ids are treated as new tasks in the draft's
    /// section and keep the given id.
    pub fn create_or_update_task(&mut self, mut draft: TaskDraft) -> Result<Saved, DashboardError> {
        let now = self.clock.now();
        let existing = draft.id.and_then(|id| self.store.find(id)).map(|t| (t.id, t.section, t.created_at));

        let (id, created_at) = match existing {
            Some((id, section, created_at)) => {
                if draft.section != section {
                    tracing::debug!(id, from = %draft.section, to = %section, "ignoring section change on update");
                    draft.section = section;
                }
                (id, created_at)
            }
            None => (draft.id.unwrap_or_else(|| self.store.next_id()), now),
        };

        if !draft.section.is_board() {
            return Err(crate::error::StoreError::NotABoardSection(draft.section).into());
        }

        let task = draft.into_task(id, created_at)?;
        let section = task.section;
        let outcome = self.store.upsert(task, now)?;
        tracing::info!(id, section = %section, ?outcome, "saved task");
        Ok(Saved { id, section, outcome })
    }

    /// Delete a task from a section. Unknown ids are a no-op.
    pub fn delete_task(&mut self, id: u64, section: Section) -> bool {
        let removed = self.store.delete(section, id);
        if !removed {
            tracing::debug!(id, section = %section, "delete matched nothing");
        }
        removed
    }

    /// Move a task to a kanban column of its board. Unknown ids are a no-op.
    pub fn move_task(&mut self, id: u64, section: Section, column: Column) -> Result<bool, DashboardError> {
        let now = self.clock.now();
        Ok(self.store.move_to(section, id, column, now)?)
    }

    pub fn set_revenue_target(&mut self, value: f64) {
        self.settings.set_revenue_target(value);
    }

    pub fn set_manual_adjustment(&mut self, value: f64) {
        self.settings.set_manual_adjustment(value);
    }

    /// Text form of `set_revenue_target`: unparsable input becomes 0.
    pub fn set_revenue_target_input(&mut self, input: &str) {
        self.settings.set_revenue_target(parse_amount_or_zero(input));
    }

    /// Text form of `set_manual_adjustment`: unparsable input becomes 0.
    pub fn set_manual_adjustment_input(&mut self, input: &str) {
        self.settings.set_manual_adjustment(parse_amount_or_zero(input));
    }

    pub fn add_team_member(&mut self, name: &str, email: Option<&str>) -> Result<u64, DashboardError> {
        self.settings.add_member(name, email)
    }

    pub fn rename_team_member(&mut self, id: u64, name: &str) -> Result<bool, DashboardError> {
        self.settings.rename_member(id, name)
    }

    pub fn remove_team_member(&mut self, id: u64) -> bool {
        self.settings.remove_member(id)
    }

    /// Summary figures computed from the current state and the clock's `now`.
    pub fn summary(&self) -> Summary {
        summarize(&self.store, &self.settings, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DraftField;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap()
    }

    fn dashboard() -> Dashboard<fn() -> DateTime<Utc>> {
        Dashboard::with_clock(SectionStore::new(), Settings::default(), fixed as fn() -> DateTime<Utc>)
    }

    #[test]
    fn adding_assigns_ids_and_defaults() {
        let mut d = dashboard();
        let a = d.create_or_update_task(TaskDraft::new(Section::Merchandise, "Hoodies")).unwrap();
        let b = d.create_or_update_task(TaskDraft::new(Section::Sponsorship, "Acme")).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.outcome, Upserted::Inserted);

        let task = d.store().find(1).unwrap();
        assert_eq!(task.status, Status::NotStarted);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.created_at, fixed());
    }

    #[test]
    fn update_keeps_section_and_created_at() {
        let mut d = dashboard();
        let saved = d.create_or_update_task(TaskDraft::new(Section::Merchandise, "Hoodies")).unwrap();
        let created = d.store().find(saved.id).unwrap().created_at;

        let mut draft = TaskDraft::from_task(d.store().find(saved.id).unwrap());
        draft.section = Section::FinanceAndLegal;
        draft.title = "Hoodies v2".into();
        let again = d.create_or_update_task(draft).unwrap();

        assert_eq!(again.section, Section::Merchandise);
        assert_eq!(again.outcome, Upserted::Replaced);
        assert!(d.store().tasks(Section::FinanceAndLegal).is_empty());
        let task = d.store().find(saved.id).unwrap();
        assert_eq!(task.title, "Hoodies v2");
        assert_eq!(task.created_at, created);
        assert!(task.updated_at > created);
    }

    #[test]
    fn invalid_draft_leaves_state_untouched() {
        let mut d = dashboard();
        let mut draft = TaskDraft::new(Section::Sponsorship, "Acme");
        draft.sponsorship.as_mut().unwrap().probability = "150".into();
        let before = d.store().clone();

        match d.create_or_update_task(draft) {
            Err(DashboardError::Validation(errors)) => {
                assert!(errors.get(DraftField::Probability).is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(d.store(), &before);
    }

    #[test]
    fn reusing_an_id_cannot_bypass_validation_or_duplicate_it() {
        let mut d = dashboard();
        d.create_or_update_task(TaskDraft::new(Section::Merchandise, "Hoodies")).unwrap();

        let mut draft = TaskDraft::new(Section::Sponsorship, "   ");
        draft.id = Some(1);
        let s = draft.sponsorship.as_mut().unwrap();
        s.probability = "150".into();
        s.deal_value = "1000".into();
        let before = d.store().clone();
        assert!(matches!(d.create_or_update_task(draft), Err(DashboardError::Validation(_))));
        assert_eq!(d.store(), &before);

        let mut draft = TaskDraft::new(Section::Sponsorship, "Acme");
        draft.id = Some(1);
        let saved = d.create_or_update_task(draft).unwrap();
        assert_eq!(saved.section, Section::Merchandise);
        assert_eq!(d.store().iter().filter(|t| t.id == 1).count(), 1);
        assert_eq!(d.summary().pipeline_expected_revenue, 0.0);
    }

    #[test]
    fn summary_section_cannot_hold_tasks() {
        let mut d = dashboard();
        let err = d
            .create_or_update_task(TaskDraft::new(Section::DashboardSummary, "x"))
            .unwrap_err();
        assert!(matches!(err, DashboardError::Store(_)));
    }

    #[test]
    fn settings_commands_coerce_input() {
        let mut d = dashboard();
        d.set_revenue_target_input("not a number");
        assert_eq!(d.settings().revenue_target, 0.0);
        d.set_manual_adjustment_input("2500");
        assert_eq!(d.settings().manual_revenue_adjustment, 2500.0);
    }

    #[test]
    fn removing_a_member_leaves_owners_alone() {
        let mut d = dashboard();
        let mut draft = TaskDraft::new(Section::MarketingCommunication, "Newsletter");
        draft.owner = "Comms Team".into();
        let saved = d.create_or_update_task(draft).unwrap();
        assert!(d.remove_team_member(1));
        assert_eq!(d.store().find(saved.id).unwrap().owner.as_deref(), Some("Comms Team"));
    }
}
