//! Enrollment persistence
//!
//! The core never talks to a database directly. Callers inject an
//! `EnrollmentStore`, keyed by principal id, holding at most one record per
//! principal.

use crate::error::StoreError;
use crate::types::{OtpSecret, PrincipalId};

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A principal's TOTP enrollment
#[derive(Clone, Debug)]
pub struct Enrollment {
    pub principal_id: PrincipalId,
    pub secret: OtpSecret,
    pub enabled: bool,
}

impl Enrollment {
    /// A confirmed, active enrollment
    pub fn enabled(principal_id: impl Into<PrincipalId>, secret: OtpSecret) -> Self {
        Self {
            principal_id: principal_id.into(),
            secret,
            enabled: true,
        }
    }
}

/// Key-value store for enrollment records
///
/// `upsert` replaces any existing record for the same principal. How
/// concurrent upserts for one principal resolve is up to the implementation.
pub trait EnrollmentStore {
    fn get(&self, principal_id: &str) -> Result<Option<Enrollment>, StoreError>;

    fn upsert(&self, enrollment: Enrollment) -> Result<(), StoreError>;
}

impl<S: EnrollmentStore + ?Sized> EnrollmentStore for &S {
    fn get(&self, principal_id: &str) -> Result<Option<Enrollment>, StoreError> {
        (**self).get(principal_id)
    }

    fn upsert(&self, enrollment: Enrollment) -> Result<(), StoreError> {
        (**self).upsert(enrollment)
    }
}

impl<S: EnrollmentStore + ?Sized> EnrollmentStore for Box<S> {
    fn get(&self, principal_id: &str) -> Result<Option<Enrollment>, StoreError> {
        (**self).get(principal_id)
    }

    fn upsert(&self, enrollment: Enrollment) -> Result<(), StoreError> {
        (**self).upsert(enrollment)
    }
}
