//! Diary domain model.
//!
//! # Responsibility
//! - Define the entry/tag/mood records shared by persistence and services.
//! - Keep the tag relation one-directional: entries own tag ids, tags own
//!   nothing persistent.
//!
//! # Invariants
//! - Every entry is identified by a stable `EntryId`.
//! - Transient hydrated fields (`DiaryEntry::tags`, `Tag::entries`) are
//!   never written to storage.

pub mod entry;
pub mod mood;
pub mod tag;

use chrono::{DateTime, SubsecRound, Utc};

/// Current UTC time truncated to the millisecond precision used by storage.
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
