//! statement-finder - locate client statement files and export them
//!
//! Statement files live under `<base>/<manager>/<year>/<month>/...`. A run
//! scans every manager folder (except `zz*` archive folders) once per
//! requested client, keeps the files whose names match the client and
//! statement type filters, then writes one CSV manifest and one ZIP archive
//! per client that had matches.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   one task per manager x client   ┌──────────────┐
//! │ ScanCoordinator  │ ────────────────────────────────▶ │ walk_manager │
//! │ (bounded pool)   │ ◀──────── records over mpsc ───── │ (+ matcher)  │
//! └────────┬─────────┘                                    └──────────────┘
//!          │ ResultSet (client → records)
//!          ▼
//! ┌──────────────────┐        ┌──────────────────┐
//! │ Exporter         │ ─────▶ │ ActivitySink     │
//! │ CSV + ZIP/client │        │ (audit entries)  │
//! └──────────────────┘        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! statement-finder find --base-dir "/srv/Client Statements" \
//!     --year 2024 --month 03-March --clients Jones,Smith --types K-1,CC
//! ```

pub mod audit;
pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod reporting;
pub mod scan;
pub mod utils;

pub use audit::{ActivityEntry, ActivitySink, FileActivityLog, NoopActivityLog};
pub use config::FinderConfig;
pub use errors::FinderError;
pub use models::{ResultSet, ScanRequest, ScanTask, StatementRecord};
pub use pipeline::{FinderPipeline, PipelineConfig, PipelineEvent, RunSummary};
pub use scan::{matches_client, matches_types};
