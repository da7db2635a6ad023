use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::{Choice, ConstantTimeEq};

type HmacSha1 = Hmac<Sha1>;

/// RFC 6238 time step.
pub const STEP_SECONDS: u64 = 30;
/// Code length in decimal digits.
pub const DIGITS: usize = 6;
/// Accepted clock drift, in steps, on either side of "now".
const DRIFT_STEPS: u64 = 1;

/// The current time step. Pre-epoch clocks degrade to step zero rather
/// than panicking.
pub fn current_step() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        / STEP_SECONDS
}

/// The RFC 4226 code for `secret` at a given time step, zero-padded to
/// [`DIGITS`].
pub fn code_at(secret: &[u8], step: u64) -> String {
    // HMAC-SHA1 accepts keys of any length.
    let mut mac = HmacSha1::new_from_slice(secret).expect("hmac accepts any key length");
    mac.update(&step.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // Dynamic truncation: low nibble of the last byte picks a 31-bit
    // big-endian window.
    let offset = (digest[digest.len() - 1] & 0xf) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);

    format!("{:0width$}", binary % 10u32.pow(DIGITS as u32), width = DIGITS)
}

/// Verify a candidate code against the current time window. Malformed
/// candidates fail verification, they never error.
pub fn verify(secret: &str, candidate: &str) -> bool {
    verify_at(secret, candidate, current_step())
}

/// Verification pinned to an explicit step, drift window included.
pub fn verify_at(secret: &str, candidate: &str, step: u64) -> bool {
    if candidate.len() != DIGITS || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    // Check every step in the window, accumulating in constant time
    // rather than short-circuiting on the first hit.
    let mut matched = Choice::from(0u8);
    let low = step.saturating_sub(DRIFT_STEPS);
    let high = step.saturating_add(DRIFT_STEPS);
    for s in low..=high {
        let expected = code_at(secret.as_bytes(), s);
        matched |= expected.as_bytes().ct_eq(candidate.as_bytes());
    }
    matched.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 6238 appendix B vectors (SHA-1), truncated to six digits.
    const RFC_SECRET: &[u8] = b"12345678901234567890";

    #[test]
    fn rfc6238_vectors() {
        let cases = [
            (59u64, "287082"),
            (1_111_111_109, "081804"),
            (1_111_111_111, "050471"),
            (1_234_567_890, "005924"),
            (2_000_000_000, "279037"),
            (20_000_000_000, "353130"),
        ];
        for (unix_secs, expected) in cases {
            assert_eq!(code_at(RFC_SECRET, unix_secs / STEP_SECONDS), expected);
        }
    }

    #[test]
    fn accepts_codes_within_drift_window() {
        let secret = "12345678901234567890";
        let code = code_at(secret.as_bytes(), 100);
        assert!(verify_at(secret, &code, 99));
        assert!(verify_at(secret, &code, 100));
        assert!(verify_at(secret, &code, 101));
        assert!(!verify_at(secret, &code, 102));
        assert!(!verify_at(secret, &code, 98));
    }

    #[test]
    fn malformed_candidates_fail_without_panicking() {
        assert!(!verify_at("secret", "", 100));
        assert!(!verify_at("secret", "12345", 100));
        assert!(!verify_at("secret", "1234567", 100));
        assert!(!verify_at("secret", "abcdef", 100));
        assert!(!verify_at("secret", "12345\u{30}8", 100));
    }

    #[test]
    fn codes_differ_across_secrets() {
        assert_ne!(code_at(b"secret-a", 100), code_at(b"secret-b", 100));
    }

    #[test]
    fn live_verify_accepts_current_code() {
        let code = code_at(b"s3cr3t", current_step());
        assert!(verify("s3cr3t", &code));
    }
}
