//! TOML-file enrollment store
//!
//! Records live in a single TOML document as an `[[enrollment]]` array.
//! Every mutation is a read-modify-write of the whole file, serialized
//! within the process by a mutex. The new document is written to a sibling
//! temporary file and renamed over the old one, so a concurrent reader (in
//! this process or another) sees either the previous or the next version.

use crate::error::StoreError;
use crate::store::{Enrollment, EnrollmentStore};
use crate::types::OtpSecret;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnrollmentRecord {
    principal_id: String,
    secret: String,
    enabled: bool,
}

impl From<&EnrollmentRecord> for Enrollment {
    fn from(record: &EnrollmentRecord) -> Self {
        Self {
            principal_id: record.principal_id.clone(),
            secret: OtpSecret::new(record.secret.clone()),
            enabled: record.enabled,
        }
    }
}

impl From<&Enrollment> for EnrollmentRecord {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            principal_id: enrollment.principal_id.clone(),
            secret: enrollment.secret.expose().to_string(),
            enabled: enrollment.enabled,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EnrollmentFile {
    #[serde(rename = "enrollment", default)]
    enrollments: Vec<EnrollmentRecord>,
}

/// Enrollment store persisted to a TOML file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<EnrollmentFile, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Enrollment file {:?} does not exist yet", self.path);
                return Ok(EnrollmentFile::default());
            }
            Err(e) => {
                return Err(StoreError::ReadFailed {
                    message: format!("{}: {}", self.path.display(), e),
                })
            }
        };

        toml::from_str(&contents).map_err(|e| StoreError::ReadFailed {
            message: format!("{}: {}", self.path.display(), e),
        })
    }

    /// Replace the file in one rename so readers never see a partial document
    fn save(&self, file: &EnrollmentFile) -> Result<(), StoreError> {
        let contents = toml::to_string_pretty(file).map_err(|e| StoreError::WriteFailed {
            message: e.to_string(),
        })?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| StoreError::WriteFailed {
            message: format!("Failed to create store directory: {}", e),
        })?;

        let write_failed = |e: std::io::Error| StoreError::WriteFailed {
            message: format!("{}: {}", self.path.display(), e),
        };
        let mut staged = NamedTempFile::new_in(parent).map_err(write_failed)?;
        staged.write_all(contents.as_bytes()).map_err(write_failed)?;
        staged.as_file().sync_all().map_err(write_failed)?;
        staged
            .persist(&self.path)
            .map_err(|e| write_failed(e.error))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::Unavailable {
            message: "enrollment file lock poisoned".to_string(),
        })
    }

    fn with_file(&self, mutate: impl FnOnce(&mut EnrollmentFile)) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let mut file = self.load()?;
        mutate(&mut file);
        self.save(&file)
    }
}

impl EnrollmentStore for FileStore {
    fn get(&self, principal_id: &str) -> Result<Option<Enrollment>, StoreError> {
        let _guard = self.lock()?;
        Ok(self
            .load()?
            .enrollments
            .iter()
            .find(|r| r.principal_id == principal_id)
            .map(Enrollment::from))
    }

    fn upsert(&self, enrollment: Enrollment) -> Result<(), StoreError> {
        if enrollment.principal_id.is_empty() {
            return Err(StoreError::Rejected {
                message: "principal_id must not be empty".to_string(),
            });
        }

        let record = EnrollmentRecord::from(&enrollment);
        self.with_file(|file| {
            match file
                .enrollments
                .iter_mut()
                .find(|r| r.principal_id == record.principal_id)
            {
                Some(existing) => *existing = record,
                None => file.enrollments.push(record),
            }
        })?;

        info!("Saved enrollment for principal {}", enrollment.principal_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("enrollments.toml"));
        assert!(store.get("nobody").unwrap().is_none());
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("enrollments.toml");

        FileStore::new(&path)
            .upsert(Enrollment::enabled("user-1", OtpSecret::from("JBSWY3DPEHPK3PXP")))
            .unwrap();

        let reopened = FileStore::new(&path);
        let record = reopened.get("user-1").unwrap().expect("record persisted");
        assert_eq!(record.secret.expose(), "JBSWY3DPEHPK3PXP");
        assert!(record.enabled);
    }

    #[test]
    fn test_upsert_replaces_by_principal() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("enrollments.toml"));

        store
            .upsert(Enrollment::enabled("user-1", OtpSecret::from("AAAAAAAA")))
            .unwrap();
        store
            .upsert(Enrollment::enabled("user-2", OtpSecret::from("CCCCCCCC")))
            .unwrap();
        store
            .upsert(Enrollment {
                principal_id: "user-1".to_string(),
                secret: OtpSecret::from("BBBBBBBB"),
                enabled: false,
            })
            .unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.matches("[[enrollment]]").count(), 2);

        let record = store.get("user-1").unwrap().unwrap();
        assert_eq!(record.secret.expose(), "BBBBBBBB");
        assert!(!record.enabled);
    }

    #[test]
    fn test_corrupt_file_is_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enrollments.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get("user-1"),
            Err(StoreError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_empty_principal_rejected() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("enrollments.toml"));
        let result = store.upsert(Enrollment::enabled("", OtpSecret::from("AAAAAAAA")));
        assert!(matches!(result, Err(StoreError::Rejected { .. })));
    }

    #[test]
    fn test_concurrent_reader_sees_enrolled_principal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enrollments.toml");
        let writer = FileStore::new(&path);
        writer
            .upsert(Enrollment::enabled("victim", OtpSecret::from("JBSWY3DPEHPK3PXP")))
            .unwrap();

        // separate handle with its own lock, as another process would have
        let reader = FileStore::new(&path);
        let done = AtomicBool::new(false);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for n in 0..200 {
                    writer
                        .upsert(Enrollment::enabled(format!("w{}", n), OtpSecret::from("AAAAAAAA")))
                        .unwrap();
                }
                done.store(true, Ordering::SeqCst);
            });

            for _ in 0..100_000 {
                let record = reader.get("victim").unwrap();
                assert!(record.is_some_and(|r| r.enabled), "enrolled principal read as missing");
                let same_handle = writer.get("victim").unwrap();
                assert!(same_handle.is_some());
                if done.load(Ordering::SeqCst) {
                    break;
                }
            }
        });

        assert!(reader.get("w199").unwrap().is_some());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "temporary files left next to the store");
    }
}
