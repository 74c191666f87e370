use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use ops_dashboard::fields::{Column, PipelineStage, Section, Status};
use ops_dashboard::task::{expected_revenue, Sponsorship};
use ops_dashboard::{SectionStore, Task, TaskDraft};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap()
}

fn board() -> impl Strategy<Value = Section> {
    prop::sample::select(Section::BOARDS.to_vec())
}

fn stage() -> impl Strategy<Value = PipelineStage> {
    prop::sample::select(PipelineStage::ALL.to_vec())
}

fn status() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL.to_vec())
}

fn seeded(sections: &[Section]) -> SectionStore {
    let mut store = SectionStore::new();
    for (i, section) in sections.iter().enumerate() {
        let task = Task::new(i as u64 + 1, *section, format!("task {i}"), t0());
        store.upsert(task, t0()).unwrap();
    }
    store
}

proptest! {
    #[test]
    fn stored_expected_revenue_follows_deal_figures(
        deal in 0.0f64..1_000_000.0,
        probability in 0.0f64..=100.0,
        stage in stage(),
    ) {
        let mut store = SectionStore::new();
        let mut task = Task::new(1, Section::Sponsorship, "deal", t0());
        task.sponsorship = Some(Sponsorship {
            pipeline_stage: stage,
            deal_value: deal,
            probability,
            expected_revenue: Some(-1.0),
            ..Sponsorship::default()
        });
        store.upsert(task, t0()).unwrap();

        let stored = store.get(Section::Sponsorship, 1).unwrap().sponsorship.clone().unwrap();
        prop_assert_eq!(stored.expected_revenue, Some(expected_revenue(deal, probability)));
        prop_assert_eq!(stored.expected_revenue, Some(deal * probability / 100.0));
    }

    #[test]
    fn move_only_changes_the_column_and_stamp(
        sections in prop::collection::vec(board(), 1..8),
        pick in any::<prop::sample::Index>(),
        new_status in status(),
        new_stage in stage(),
    ) {
        let mut store = seeded(&sections);
        let victim = pick.get(&sections);
        let idx = sections.iter().position(|s| s == victim).unwrap();
        let id = idx as u64 + 1;
        let before = store.clone();
        let column = if victim.uses_pipeline() {
            Column::Stage(new_stage)
        } else {
            Column::Status(new_status)
        };

        let later = t0() + Duration::minutes(5);
        prop_assert!(store.move_to(*victim, id, column, later).unwrap());

        let old = before.get(*victim, id).unwrap();
        let new = store.get(*victim, id).unwrap();
        prop_assert_eq!(new.column(), column);
        prop_assert!(new.updated_at > old.updated_at);

        let mut restored = new.clone();
        restored.status = old.status;
        restored.updated_at = old.updated_at;
        if let (Some(r), Some(o)) = (restored.sponsorship.as_mut(), old.sponsorship.as_ref()) {
            r.pipeline_stage = o.pipeline_stage;
        }
        prop_assert_eq!(&restored, old);

        for section in Section::BOARDS {
            for task in before.tasks(section).iter().filter(|t| t.id != id) {
                prop_assert_eq!(store.get(section, task.id), Some(task));
            }
        }
    }

    #[test]
    fn upsert_leaves_other_sections_alone(
        sections in prop::collection::vec(board(), 0..8),
        target in board(),
    ) {
        let mut store = seeded(&sections);
        let before = store.clone();
        let id = store.next_id();
        store.upsert(Task::new(id, target, "new", t0()), t0()).unwrap();

        for section in Section::BOARDS.into_iter().filter(|s| *s != target) {
            prop_assert_eq!(store.tasks(section), before.tasks(section));
        }
        prop_assert_eq!(store.tasks(target).len(), before.tasks(target).len() + 1);
    }

    #[test]
    fn deleting_twice_is_the_same_as_once(
        sections in prop::collection::vec(board(), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut store = seeded(&sections);
        let victim = pick.get(&sections);
        let id = sections.iter().position(|s| s == victim).unwrap() as u64 + 1;

        prop_assert!(store.delete(*victim, id));
        let once = store.clone();
        prop_assert!(!store.delete(*victim, id));
        prop_assert_eq!(store, once);
    }

    #[test]
    fn saved_titles_are_trimmed_and_stamps_ordered(
        title in "[ \t]{0,3}[A-Za-z][A-Za-z ]{0,20}[ \t]{0,3}",
        section in board(),
    ) {
        let task = TaskDraft::new(section, title.clone()).into_task(1, t0()).unwrap();
        prop_assert_eq!(task.title.as_str(), title.trim());

        let mut store = SectionStore::new();
        store.upsert(task, t0() - Duration::hours(1)).unwrap();
        let stored = store.get(section, 1).unwrap();
        prop_assert!(stored.updated_at >= stored.created_at);
    }
}
