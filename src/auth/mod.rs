pub mod gate;
pub mod totp;

pub use gate::{authorize_admin, authorize_volume, Credentials, GateError, Op};

use subtle::ConstantTimeEq;

/// Constant-time equality for static secrets. Timing may depend on the
/// candidate's length but never on where the first mismatch occurs.
pub fn verify_static(secret: &str, candidate: &str) -> bool {
    secret.as_bytes().ct_eq(candidate.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_static_exact_match_only() {
        assert!(verify_static("s3cr3t", "s3cr3t"));
        assert!(!verify_static("s3cr3t", "s3cr3tx"));
        assert!(!verify_static("s3cr3t", "s3cr3"));
        assert!(!verify_static("s3cr3t", ""));
        assert!(!verify_static("", "s3cr3t"));
        assert!(verify_static("", ""));
    }
}
