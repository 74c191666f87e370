//! # opsdash - Event Operations Dashboard
//!
//! A command-line operations dashboard for an event organising committee: five task boards,
//! a sponsorship pipeline and a revenue summary.
//!
//! ## Key Features
//!
//! - **Sectioned Boards**: Marketing & Communication, Merchandise, Finance & Legal,
//!   School Relationships and Sponsorship, each a kanban of status columns
//! - **Sponsorship Pipeline**: Deals move through eight stages with value, probability and
//!   derived expected revenue
//! - **Revenue Summary**: Confirmed sponsors, secured revenue against target, pipeline value,
//!   upcoming deadlines and high-priority work
//! - **Local File Storage**: Two JSON documents with CSV export and timestamped backups
//!
//! ## Quick Start
//!
//! ```bash
//! opsdash init --sample
//! opsdash add sponsorship "Acme renewal" --company Acme --deal-value 50000 --probability 70
//! opsdash move 4 confirmed
//! opsdash summary
//! ```
//!
//! Data is stored in `~/.opsdash/` unless `--dir` or `OPSDASH_DIR` points elsewhere.

pub mod access;
pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod fields;
pub mod settings;
pub mod store;
pub mod summary;
pub mod task;

pub use dashboard::{Clock, Dashboard, SystemClock};
pub use error::{DashboardError, StoreError, ValidationErrors};
pub use settings::Settings;
pub use store::SectionStore;
pub use summary::{summarize, Summary};
pub use task::{Task, TaskDraft};
