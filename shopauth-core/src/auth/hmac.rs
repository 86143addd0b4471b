//! HMAC-SHA1 signer for TOTP time steps
//!
//! RFC 2104 over SHA-1 (64-byte block, ipad 0x36, opad 0x5C). The TOTP
//! message is always the time-step counter as an 8-byte big-endian integer.

use sha1::{Digest, Sha1};

const BLOCK_SIZE: usize = 64;
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// Length of a SHA-1 digest in bytes
pub const DIGEST_LEN: usize = 20;

/// Compute HMAC-SHA1 of `message` under `key`
///
/// Keys longer than the block size are hashed first; shorter keys are
/// zero-padded to the block size.
pub fn hmac_sha1(key: &[u8], message: &[u8]) -> [u8; DIGEST_LEN] {
    let mut key_block = [0u8; BLOCK_SIZE];
    if key.len() > BLOCK_SIZE {
        key_block[..DIGEST_LEN].copy_from_slice(&Sha1::digest(key));
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let inner_key = key_block.map(|b| b ^ IPAD);
    let outer_key = key_block.map(|b| b ^ OPAD);

    let inner_hash = Sha1::new()
        .chain_update(inner_key)
        .chain_update(message)
        .finalize();

    let outer_hash = Sha1::new()
        .chain_update(outer_key)
        .chain_update(inner_hash)
        .finalize();

    outer_hash.into()
}

/// Sign a moving-factor counter (the HOTP message)
pub fn sign_counter(key: &[u8], counter: u64) -> [u8; DIGEST_LEN] {
    hmac_sha1(key, &counter.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc2202_case_1() {
        let result = hmac_sha1(&[0x0b; 20], b"Hi There");
        assert_eq!(
            hex::encode(result),
            "b617318655057264e28bc0b6fb378c8ef146be00"
        );
    }

    #[test]
    fn test_rfc2202_case_2() {
        let result = hmac_sha1(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(result),
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }

    #[test]
    fn test_rfc2202_case_3() {
        let result = hmac_sha1(&[0xaa; 20], &[0xdd; 50]);
        assert_eq!(
            hex::encode(result),
            "125d7342b9ac11cd91a39af48aa17b4f63f175d3"
        );
    }

    #[test]
    fn test_rfc2202_long_key() {
        // RFC 2202 test case 6: 80-byte key is hashed before use
        let result = hmac_sha1(&[0xaa; 80], b"Test Using Larger Than Block-Size Key - Hash Key First");
        assert_eq!(
            hex::encode(result),
            "aa4ae5e15272d00e95705637ce8a3b55ed402112"
        );
    }

    #[test]
    fn test_sign_counter_rfc4226_count_zero() {
        // RFC 4226 Appendix D, HMAC for count 0
        let result = sign_counter(b"12345678901234567890", 0);
        assert_eq!(
            hex::encode(result),
            "cc93cf18508d94934c64b65d8ba7667fb7cde4b0"
        );
    }

    #[test]
    fn test_sign_counter_is_big_endian() {
        let counter = 41152263u64;
        assert_eq!(
            sign_counter(b"key", counter),
            hmac_sha1(b"key", &[0, 0, 0, 0, 0x02, 0x73, 0xEF, 0x07])
        );
    }
}
