//! Secret issuance and `otpauth://` provisioning URIs

use crate::auth::base32::ALPHABET;
use crate::auth::totp::TotpParams;
use crate::types::OtpSecret;
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes drawn per secret (one alphabet symbol each)
pub const SECRET_LEN: usize = 20;

/// Draw a fresh 20-character secret from the OS CSPRNG
///
/// Each random byte selects one alphabet symbol (`byte % 32`), so the
/// secret carries 100 bits of entropy.
pub fn generate_secret() -> OtpSecret {
    let mut bytes = [0u8; SECRET_LEN];
    OsRng.fill_bytes(&mut bytes);

    let secret: String = bytes
        .iter()
        .map(|b| ALPHABET[(b % 32) as usize] as char)
        .collect();
    OtpSecret::new(secret)
}

/// Build the key URI scanned by authenticator apps
pub fn provisioning_uri(
    issuer: &str,
    account: &str,
    secret: &OtpSecret,
    params: &TotpParams,
) -> String {
    let issuer = urlencoding::encode(issuer);
    format!(
        "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}&algorithm=SHA1&digits={digits}&period={period}",
        account = urlencoding::encode(account),
        secret = secret.expose(),
        digits = params.digits,
        period = params.period,
    )
}

/// A freshly issued, not yet confirmed secret
#[derive(Debug, Clone)]
pub struct Provisioning {
    pub secret: OtpSecret,
    pub otpauth_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::base32::is_base32_alphabet;

    #[test]
    fn test_secret_shape() {
        for _ in 0..50 {
            let secret = generate_secret();
            assert_eq!(secret.expose().len(), SECRET_LEN);
            assert!(secret
                .expose()
                .chars()
                .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
            assert!(is_base32_alphabet(secret.expose()));
        }
    }

    #[test]
    fn test_secrets_differ() {
        assert_ne!(generate_secret().expose(), generate_secret().expose());
    }

    #[test]
    fn test_uri_format() {
        let secret = OtpSecret::from("JBSWY3DPEHPK3PXP");
        let uri = provisioning_uri(
            "RL Auto Repair",
            "jane@example.com",
            &secret,
            &TotpParams::default(),
        );
        assert_eq!(
            uri,
            "otpauth://totp/RL%20Auto%20Repair:jane%40example.com?secret=JBSWY3DPEHPK3PXP&issuer=RL%20Auto%20Repair&algorithm=SHA1&digits=6&period=30"
        );
    }

    #[test]
    fn test_uri_encodes_separators_in_labels() {
        let secret = OtpSecret::from("JBSWY3DPEHPK3PXP");
        let uri = provisioning_uri("A&B", "x:y?z", &secret, &TotpParams::default());
        assert!(uri.starts_with("otpauth://totp/A%26B:x%3Ay%3Fz?"));
        assert!(uri.contains("&issuer=A%26B&"));
    }
}
