//! Enrollment operations
//!
//! `TotpService` ties the TOTP primitives to an injected enrollment store,
//! identity lookup and clock. Enrollment moves through
//! `unenrolled → pending → enabled`: `generate` hands out a candidate secret
//! without writing anything (pending lives with the caller), and only a
//! successful verification followed by `setup` persists it. `disable` is the
//! way back out.

use crate::auth::base32;
use crate::auth::provisioning::{self, Provisioning};
use crate::auth::totp::{self, SecretDecoding, TotpParams};
use crate::clock::Clock;
use crate::config::TotpConfig;
use crate::error::{RequestError, Result};
use crate::identity::IdentityLookup;
use crate::store::{Enrollment, EnrollmentStore};
use crate::types::{OtpSecret, FALLBACK_ACCOUNT_LABEL};
use tracing::{info, warn};

pub mod dispatch;

/// Persisted enrollment state of a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentState {
    /// No record
    Unenrolled,
    /// Confirmed and active
    Enabled,
    /// Record kept but switched off
    Disabled,
}

impl std::fmt::Display for EnrollmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrollmentState::Unenrolled => write!(f, "unenrolled"),
            EnrollmentState::Enabled => write!(f, "enabled"),
            EnrollmentState::Disabled => write!(f, "disabled"),
        }
    }
}

/// Result of `check`
#[derive(Debug, Clone)]
pub struct CheckStatus {
    pub state: EnrollmentState,
    /// The enrolled secret, present only while enabled
    pub secret: Option<OtpSecret>,
}

impl CheckStatus {
    pub fn has_totp(&self) -> bool {
        self.state == EnrollmentState::Enabled
    }
}

/// Treat absent and empty arguments alike
fn required<'a>(value: Option<&'a str>) -> Option<&'a str> {
    value.filter(|v| !v.is_empty())
}

fn require_principal(principal_id: &str) -> Result<()> {
    if principal_id.is_empty() {
        return Err(RequestError::MissingField {
            field: "userId".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Two-factor enrollment and verification service
pub struct TotpService<S, I, C> {
    store: S,
    identities: I,
    clock: C,
    issuer: String,
    params: TotpParams,
}

impl<S, I, C> TotpService<S, I, C>
where
    S: EnrollmentStore,
    I: IdentityLookup,
    C: Clock,
{
    pub fn new(store: S, identities: I, clock: C, config: &TotpConfig) -> Self {
        Self {
            store,
            identities,
            clock,
            issuer: config.issuer.clone(),
            params: config.params(),
        }
    }

    pub fn params(&self) -> &TotpParams {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Issue a candidate secret and its provisioning URI
    ///
    /// Nothing is persisted; calling again simply yields a new, unrelated
    /// candidate.
    pub fn generate(&self, principal_id: &str) -> Result<Provisioning> {
        require_principal(principal_id)?;

        let account = self
            .identities
            .display_label(principal_id)
            .unwrap_or_else(|| FALLBACK_ACCOUNT_LABEL.to_string());
        let secret = provisioning::generate_secret();
        let otpauth_uri =
            provisioning::provisioning_uri(&self.issuer, &account, &secret, &self.params);

        info!("Generated candidate TOTP secret for principal {}", principal_id);
        Ok(Provisioning {
            secret,
            otpauth_uri,
        })
    }

    /// Check a submitted token against a secret
    ///
    /// A missing or empty secret or token is a bad request; no code is
    /// computed in that case.
    pub fn verify(&self, secret: Option<&str>, token: Option<&str>) -> Result<bool> {
        let (Some(secret), Some(token)) = (required(secret), required(token)) else {
            return Err(RequestError::MissingSecretOrToken.into());
        };

        let valid = totp::verify_token(
            &OtpSecret::from(secret),
            token,
            &self.clock,
            &self.params,
        )?;
        info!(
            "TOTP verification: {}",
            if valid { "SUCCESS" } else { "FAILED" }
        );
        Ok(valid)
    }

    /// Persist `secret` as the principal's enabled enrollment
    pub fn setup(&self, principal_id: &str, secret: &str) -> Result<()> {
        require_principal(principal_id)?;
        if secret.is_empty() {
            return Err(RequestError::MissingField {
                field: "secret".to_string(),
            }
            .into());
        }
        if self.params.decoding == SecretDecoding::Strict {
            base32::decode_base32_strict(secret)?;
        }

        self.store
            .upsert(Enrollment::enabled(principal_id, OtpSecret::from(secret)))
            .map_err(|e| {
                warn!("Error saving TOTP secret: {}", e);
                e
            })?;

        info!("TOTP enabled for principal {}", principal_id);
        Ok(())
    }

    /// Report whether the principal has an enabled enrollment
    pub fn check(&self, principal_id: &str) -> Result<CheckStatus> {
        require_principal(principal_id)?;

        let status = match self.store.get(principal_id)? {
            None => CheckStatus {
                state: EnrollmentState::Unenrolled,
                secret: None,
            },
            Some(record) if record.enabled => CheckStatus {
                state: EnrollmentState::Enabled,
                secret: Some(record.secret),
            },
            Some(_) => CheckStatus {
                state: EnrollmentState::Disabled,
                secret: None,
            },
        };
        Ok(status)
    }

    /// Switch off an enrollment, returning whether one existed
    pub fn disable(&self, principal_id: &str) -> Result<bool> {
        require_principal(principal_id)?;

        let Some(mut record) = self.store.get(principal_id)? else {
            return Ok(false);
        };
        record.enabled = false;
        self.store.upsert(record)?;

        info!("TOTP disabled for principal {}", principal_id);
        Ok(true)
    }

    /// Complete a pending enrollment: verify `token` against the candidate
    /// secret and persist it only if the token is valid
    pub fn confirm(&self, principal_id: &str, secret: &str, token: &str) -> Result<bool> {
        require_principal(principal_id)?;
        if !self.verify(Some(secret), Some(token))? {
            return Ok(false);
        }
        self.setup(principal_id, secret)?;
        Ok(true)
    }

    /// Login second factor: verify `token` against the stored secret
    ///
    /// Principals without an enabled enrollment never pass.
    pub fn verify_enrolled(&self, principal_id: &str, token: &str) -> Result<bool> {
        let status = self.check(principal_id)?;
        match status.secret {
            Some(secret) => self.verify(Some(secret.expose()), Some(token)),
            None => Ok(false),
        }
    }
}
