//! Persistence gateway between diary use-cases and the document store.
//!
//! # Responsibility
//! - Map entries and tags to documents and back.
//! - Hydrate denormalized tag ids into tag values on every entry read.
//! - Own the tag-delete cascade that scrubs tag ids from entries.
//!
//! # Invariants
//! - Store failures surface unchanged as `StoreError`; absent records are
//!   `None`, never an error.
//! - Dangling tag ids are tolerated and silently dropped during hydration.

pub mod diary_repo;
