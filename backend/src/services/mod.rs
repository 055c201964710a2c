//! Business logic layer
//!
//! Account registration and session issuance for each identity variant.
//! Services receive the shared pool and the pre-computed token service;
//! they hold no state of their own.

mod companies;
mod students;

pub use companies::CompanyService;
pub use students::StudentService;

/// Store-level uniqueness is the source of truth under concurrent signups;
/// this detects the constraint firing so it can map to a conflict error.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
