//! On-disk storage and display helpers.
//!
//! State lives in a data directory as two JSON documents: `tasks.json` (the section
//! store) and `settings.json`. Writes go through a temp file and a rename. A missing
//! document loads as the default; an unreadable or corrupt one is logged and also
//! replaced by the default, so a damaged file never blocks the dashboard.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::dashboard::{Clock, Dashboard};
use crate::error::StorageError;
use crate::settings::Settings;
use crate::store::SectionStore;
use crate::task::Task;

pub const TASKS_FILE: &str = "tasks.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const BACKUP_DIR: &str = "backup";

/// JSON documents addressed by file name inside one data directory.
#[derive(Debug, Clone)]
pub struct Database {
    dir: PathBuf,
}

impl Database {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Database { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path(key).exists()
    }

    /// Load a document, falling back to `fallback()` when it is missing or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, fallback: impl FnOnce() -> T) -> T {
        let path = self.path(key);
        if !path.exists() {
            return fallback();
        }
        match fs::read_to_string(&path) {
            Ok(buf) => match serde_json::from_str(&buf) {
                Ok(value) => value,
                Err(e) => {
                    let kept = self.keep_unreadable(key);
                    tracing::warn!(
                        path = %path.display(),
                        kept = ?kept,
                        error = %e,
                        "failed to parse, starting fresh"
                    );
                    fallback()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read, starting fresh");
                fallback()
            }
        }
    }

    /// Copy an unparsable document to `<key>.corrupt` so the next save cannot overwrite it.
    fn keep_unreadable(&self, key: &str) -> Option<PathBuf> {
        let kept = self.dir.join(format!("{key}.corrupt"));
        match fs::copy(self.path(key), &kept) {
            Ok(_) => Some(kept),
            Err(e) => {
                tracing::warn!(path = %kept.display(), error = %e, "failed to keep unreadable document");
                None
            }
        }
    }

    /// Save a document using atomic write (temp file + rename).
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let path = self.path(key);
        let io_err = |source| StorageError::Io { path: path.clone(), source };

        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io { path: self.dir.clone(), source })?;
        let data = serde_json::to_string_pretty(value)
            .map_err(|source| StorageError::Encode { path: path.clone(), source })?;
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(io_err)?;
        f.write_all(data.as_bytes()).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "saved");
        Ok(())
    }

    pub fn load_store(&self) -> SectionStore {
        self.load(TASKS_FILE, SectionStore::new)
    }

    /// Settings on disk, or defaults using `default_target` as the revenue target.
    pub fn load_settings(&self, default_target: f64) -> Settings {
        self.load(SETTINGS_FILE, || Settings::with_revenue_target(default_target))
    }

    pub fn load_dashboard(&self, default_target: f64) -> Dashboard {
        Dashboard::new(self.load_store(), self.load_settings(default_target))
    }

    pub fn save_dashboard<C: Clock>(&self, dashboard: &Dashboard<C>) -> Result<(), StorageError> {
        self.save(TASKS_FILE, dashboard.store())?;
        self.save(SETTINGS_FILE, dashboard.settings())?;
        tracing::info!(dir = %self.dir.display(), tasks = dashboard.store().len(), "saved dashboard");
        Ok(())
    }

    /// Copy the state documents into `backup/` with a timestamp prefix.
    ///
    /// Returns the backup paths created. Fails when there is nothing to back up.
    pub fn backup(&self, at: DateTime<Local>) -> Result<Vec<PathBuf>, StorageError> {
        let backup_dir = self.dir.join(BACKUP_DIR);
        let timestamp = at.format("%Y-%m-%d_%H-%M-%S");
        let mut created = Vec::new();
        for key in [TASKS_FILE, SETTINGS_FILE] {
            let src = self.path(key);
            if !src.exists() {
                continue;
            }
            fs::create_dir_all(&backup_dir)
                .map_err(|source| StorageError::Io { path: backup_dir.clone(), source })?;
            let dst = backup_dir.join(format!("{timestamp}_{key}"));
            fs::copy(&src, &dst).map_err(|source| StorageError::Io { path: dst.clone(), source })?;
            created.push(dst);
        }
        if created.is_empty() {
            return Err(StorageError::Missing { path: self.path(TASKS_FILE) });
        }
        tracing::info!(count = created.len(), "backup created");
        Ok(created)
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn format_date_cell(d: Option<DateTime<Utc>>) -> String {
    d.map(|d| d.to_rfc3339()).unwrap_or_default()
}

/// Render tasks as CSV, one row per task, sponsorship columns blank for other sections.
pub fn tasks_to_csv(tasks: &[&Task]) -> String {
    let mut csv = String::from(
        "ID,Section,Title,Status,Priority,Owner,Deadline,PipelineStage,Company,ContactName,DealValue,Probability,ExpectedRevenue,CreatedUTC,UpdatedUTC,Description\n",
    );
    for t in tasks {
        let (stage, company, contact, deal, prob, expected) = match &t.sponsorship {
            Some(s) => (
                s.pipeline_stage.label().to_string(),
                s.company.clone(),
                s.contact_name.clone(),
                s.deal_value.to_string(),
                s.probability.to_string(),
                s.expected_or_derived().to_string(),
            ),
            None => Default::default(),
        };
        let row = [
            t.id.to_string(),
            t.section.label().to_string(),
            t.title.clone(),
            t.status.label().to_string(),
            t.priority.label().to_string(),
            t.owner.clone().unwrap_or_default(),
            format_date_cell(t.deadline_at()),
            stage,
            company,
            contact,
            deal,
            prob,
            expected,
            t.created_at.to_rfc3339(),
            t.updated_at.to_rfc3339(),
            t.description.clone().unwrap_or_default(),
        ];
        let cells: Vec<String> = row.iter().map(|c| escape_csv(c)).collect();
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }
    csv
}

/// Format a deadline relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_deadline_relative(deadline: Option<DateTime<Utc>>, today: NaiveDate) -> String {
    match deadline {
        None => "-".into(),
        Some(d) => {
            let days = (d.date_naive() - today).num_days();
            match days {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {n}d"),
                n => format!("{}d late", -n),
            }
        }
    }
}

/// Format a currency amount in whole euros with thousands separators ("€1,250,000").
pub fn format_money(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-€{grouped}")
    } else {
        format!("€{grouped}")
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Render tasks as a fixed-width table, deadlines relative to `today`.
pub fn format_table(tasks: &[&Task], today: NaiveDate) -> String {
    let mut out = format!(
        "{:<5} {:<24} {:<15} {:<9} {:<12} {:<16} {}\n",
        "ID", "Section", "Column", "Priority", "Deadline", "Owner", "Title"
    );
    for t in tasks {
        out.push_str(&format!(
            "{:<5} {:<24} {:<15} {:<9} {:<12} {:<16} {}\n",
            t.id,
            t.section.label(),
            t.column().label(),
            t.priority.label(),
            format_deadline_relative(t.deadline_at(), today),
            truncate(t.owner.as_deref().unwrap_or("-"), 16),
            t.title
        ));
    }
    out
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    print!("{}", format_table(tasks, today));
}
