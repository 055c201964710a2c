//! Data access layer
//!
//! One repository per identity variant, all over the single shared pool.
//! Password hashes never leave this layer except as the raw value the
//! services compare during login.

mod companies;
mod students;

pub use companies::{CompanyPatch, CompanyRecord, CompanyRepository, NewCompany};
pub use students::{NewStudent, StudentPatch, StudentRecord, StudentRepository};
