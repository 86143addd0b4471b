//! Integration tests for the enrollment lifecycle
//!
//! Drives `TotpService` end to end over the file-backed store with a pinned
//! clock: generate → confirm → check → login verification → disable.

use shopauth_core::auth::totp::{self, TotpParams};
use shopauth_core::clock::FixedClock;
use shopauth_core::config::TotpConfig;
use shopauth_core::error::{RequestError, ShopAuthError};
use shopauth_core::identity::StaticDirectory;
use shopauth_core::service::{EnrollmentState, TotpService};
use shopauth_core::store::{EnrollmentStore, FileStore, MemoryStore};
use shopauth_core::types::OtpSecret;
use tempfile::tempdir;

const T: u64 = 1_700_000_000;

fn code_at(secret: &OtpSecret, unix: u64) -> String {
    totp::generate_code_at(secret, unix, &TotpParams::default())
        .unwrap()
        .expose()
        .to_string()
}

#[test]
fn test_full_enrollment_over_file_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("enrollments.toml");
    let directory = StaticDirectory::new().with_label("cust-42", "owner@example.com");
    let config = TotpConfig::default();

    let service = TotpService::new(FileStore::new(&path), &directory, FixedClock(T), &config);

    // unenrolled → pending: nothing written
    let provisioning = service.generate("cust-42").unwrap();
    assert!(!path.exists());
    assert!(provisioning.otpauth_uri.contains("owner%40example.com"));

    // pending → enabled after a valid code
    let code = code_at(&provisioning.secret, T);
    assert!(service
        .confirm("cust-42", provisioning.secret.expose(), &code)
        .unwrap());

    // a fresh service over the same file sees the enrollment
    let later = TotpService::new(FileStore::new(&path), &directory, FixedClock(T + 30), &config);
    let status = later.check("cust-42").unwrap();
    assert_eq!(status.state, EnrollmentState::Enabled);
    assert_eq!(
        status.secret.unwrap().expose(),
        provisioning.secret.expose()
    );

    // next login, one step later
    let login_code = code_at(&provisioning.secret, T + 30);
    assert!(later.verify_enrolled("cust-42", &login_code).unwrap());

    assert!(later.disable("cust-42").unwrap());
    assert!(!later.check("cust-42").unwrap().has_totp());
}

#[test]
fn test_regenerating_discards_previous_candidate() {
    let service = TotpService::new(
        MemoryStore::new(),
        StaticDirectory::new(),
        FixedClock(T),
        &TotpConfig::default(),
    );

    let first = service.generate("cust-1").unwrap();
    let second = service.generate("cust-1").unwrap();
    assert_ne!(first.secret.expose(), second.secret.expose());
    assert!(service.store().is_empty().unwrap());

    // confirming the newest candidate enrolls exactly that secret
    let code = code_at(&second.secret, T);
    assert!(service.confirm("cust-1", second.secret.expose(), &code).unwrap());
    assert_eq!(
        service.check("cust-1").unwrap().secret.unwrap().expose(),
        second.secret.expose()
    );
}

#[test]
fn test_window_tolerance() {
    let secret = OtpSecret::from("JBSWY3DPEHPK3PXP");
    let code = code_at(&secret, T);
    let step = T - T % 30;

    for (offset, accepted) in [(-60i64, false), (-30, true), (0, true), (29, true), (30, true), (60, false)] {
        let now = (step as i64 + offset) as u64;
        let service = TotpService::new(
            MemoryStore::new(),
            StaticDirectory::new(),
            FixedClock(now),
            &TotpConfig::default(),
        );
        assert_eq!(
            service.verify(Some(secret.expose()), Some(&code)).unwrap(),
            accepted,
            "offset {}",
            offset
        );
    }
}

#[test]
fn test_wider_skew_from_config() {
    let secret = OtpSecret::from("JBSWY3DPEHPK3PXP");
    let code = code_at(&secret, T);
    let config = TotpConfig {
        skew: 2,
        ..TotpConfig::default()
    };
    let service = TotpService::new(
        MemoryStore::new(),
        StaticDirectory::new(),
        FixedClock(T + 60),
        &config,
    );
    assert!(service.verify(Some(secret.expose()), Some(&code)).unwrap());
}

#[test]
fn test_wrong_token_rejected() {
    let service = TotpService::new(
        MemoryStore::new(),
        StaticDirectory::new(),
        FixedClock(T),
        &TotpConfig::default(),
    );
    let secret = OtpSecret::from("JBSWY3DPEHPK3PXP");
    let valid: Vec<String> = [T - 30, T, T + 30].iter().map(|&t| code_at(&secret, t)).collect();

    let wrong = (0..1_000_000)
        .map(|n| format!("{:06}", n))
        .find(|candidate| !valid.contains(candidate))
        .unwrap();
    assert!(!service.verify(Some(secret.expose()), Some(&wrong)).unwrap());
}

#[test]
fn test_missing_token_is_bad_request() {
    let service = TotpService::new(
        MemoryStore::new(),
        StaticDirectory::new(),
        FixedClock(T),
        &TotpConfig::default(),
    );
    let err = service.verify(Some("JBSWY3DPEHPK3PXP"), None).unwrap_err();
    assert!(matches!(
        err,
        ShopAuthError::Request(RequestError::MissingSecretOrToken)
    ));
}

#[test]
fn test_store_trait_object() {
    let store: Box<dyn EnrollmentStore> = Box::new(MemoryStore::new());
    let service = TotpService::new(store, StaticDirectory::new(), FixedClock(T), &TotpConfig::default());
    service.setup("cust-7", "JBSWY3DPEHPK3PXP").unwrap();
    assert!(service.check("cust-7").unwrap().has_totp());
}
