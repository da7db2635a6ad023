use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use http::StatusCode;

use crate::registry::{FileOp, Registry, RegistryError, VolumeMeta};

use super::{totp, verify_static};

/// Operation a request wants to perform against a volume. `Manage`
/// covers the volume-management endpoints themselves, which are never
/// exempt from credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Get,
    Put,
    Delete,
    Manage,
}

impl Op {
    fn as_file_op(self) -> Option<FileOp> {
        match self {
            Op::Get => Some(FileOp::Get),
            Op::Put => Some(FileOp::Put),
            Op::Delete => Some(FileOp::Delete),
            Op::Manage => None,
        }
    }
}

/// The `otp` query parameter as presented. Exactly one value is well
/// formed; repeated parameters are malformed, not a candidate to verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpQuery {
    Missing,
    Single(String),
    Malformed,
}

/// Credential material extracted from a request. Extraction never
/// rejects; the gate decides what absence or malformation means.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub otp: OtpQuery,
    pub authorization: Option<String>,
}

impl Credentials {
    pub fn none() -> Self {
        Self {
            otp: OtpQuery::Missing,
            authorization: None,
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Credentials {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        let mut otp = OtpQuery::Missing;
        if let Some(query) = parts.uri.query() {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                if key == "otp" {
                    otp = match otp {
                        OtpQuery::Missing => OtpQuery::Single(value.into_owned()),
                        _ => OtpQuery::Malformed,
                    };
                }
            }
        }

        let authorization = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Self { otp, authorization })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Volume not found.")]
    UnknownVolume,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("registry error: {0}")]
    Registry(RegistryError),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = match &self {
            GateError::UnknownVolume => StatusCode::NOT_FOUND,
            GateError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GateError::Forbidden(_) => StatusCode::FORBIDDEN,
            GateError::Registry(e) => {
                tracing::error!("authorization gate registry failure: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "unknown server error")
                    .into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}

const MISSING_CREDENTIAL: &str =
    "Header `Authorization` with scheme `TOTP` or `Secret` is needed.";
const MISSING_ADMIN_CREDENTIAL: &str = "Header `Authorization` with scheme `Secret` is needed.";

/// Per-request authorization decision for a volume-scoped operation.
///
/// Resolves the volume first (absence short-circuits to 404 before any
/// credential work), grants exempt operations immediately, and otherwise
/// verifies credentials in fixed priority order: query OTP, then the
/// `Authorization` header.
pub async fn authorize_volume(
    registry: &Registry,
    volume: &str,
    op: Op,
    creds: &Credentials,
) -> Result<VolumeMeta, GateError> {
    let meta = registry.read(volume).await.map_err(|e| match e {
        RegistryError::NotFound => GateError::UnknownVolume,
        other => GateError::Registry(other),
    })?;

    if let Some(file_op) = op.as_file_op() {
        if meta.exempts(file_op) {
            return Ok(meta);
        }
    }

    check_credentials(&meta.secret, creds)?;
    Ok(meta)
}

fn check_credentials(secret: &str, creds: &Credentials) -> Result<(), GateError> {
    match &creds.otp {
        OtpQuery::Single(code) => {
            return if totp::verify(secret, code) {
                Ok(())
            } else {
                Err(GateError::Forbidden("Invalid OTP."))
            };
        }
        OtpQuery::Malformed => {
            return Err(GateError::Unauthorized("Exactly one query `otp` is needed."));
        }
        OtpQuery::Missing => {}
    }

    let header = creds
        .authorization
        .as_deref()
        .ok_or(GateError::Unauthorized(MISSING_CREDENTIAL))?;
    let (scheme, candidate) = header
        .split_once(' ')
        .ok_or(GateError::Unauthorized(MISSING_CREDENTIAL))?;

    match scheme {
        "TOTP" => {
            if totp::verify(secret, candidate) {
                Ok(())
            } else {
                Err(GateError::Forbidden("Invalid OTP."))
            }
        }
        "Secret" => {
            if verify_static(secret, candidate) {
                Ok(())
            } else {
                Err(GateError::Forbidden("Invalid secret."))
            }
        }
        _ => Err(GateError::Unauthorized(MISSING_CREDENTIAL)),
    }
}

/// Privilege gate for administrative endpoints. Volume-independent:
/// only the `Secret` scheme against the process-wide admin secret.
pub fn authorize_admin(admin_secret: &str, creds: &Credentials) -> Result<(), GateError> {
    let header = creds
        .authorization
        .as_deref()
        .ok_or(GateError::Unauthorized(MISSING_ADMIN_CREDENTIAL))?;
    let (scheme, candidate) = header
        .split_once(' ')
        .ok_or(GateError::Unauthorized(MISSING_ADMIN_CREDENTIAL))?;
    if scheme != "Secret" {
        return Err(GateError::Unauthorized(MISSING_ADMIN_CREDENTIAL));
    }
    if verify_static(admin_secret, candidate) {
        Ok(())
    } else {
        Err(GateError::Forbidden("Invalid secret."))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::registry::VolumeSpec;
    use crate::storage::MemoryMetaStore;

    async fn registry_with(volume: &str, spec: VolumeSpec) -> Registry {
        let registry = Registry::new(Arc::new(MemoryMetaStore::default()));
        registry.create(volume, spec).await.unwrap();
        registry
    }

    fn secret_header(value: &str) -> Credentials {
        Credentials {
            otp: OtpQuery::Missing,
            authorization: Some(format!("Secret {value}")),
        }
    }

    #[tokio::test]
    async fn unknown_volume_short_circuits_before_credentials() {
        let registry = Registry::new(Arc::new(MemoryMetaStore::default()));
        let err = authorize_volume(&registry, "ghost", Op::Get, &Credentials::none())
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::UnknownVolume));
    }

    #[tokio::test]
    async fn exempt_op_passes_without_credentials() {
        let registry = registry_with(
            "alice",
            VolumeSpec::with_exemptions("s3cr3t", [FileOp::Get]),
        )
        .await;
        authorize_volume(&registry, "alice", Op::Get, &Credentials::none())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_exempt_op_without_credentials_is_unauthorized() {
        let registry = registry_with(
            "alice",
            VolumeSpec::with_exemptions("s3cr3t", [FileOp::Get]),
        )
        .await;
        let err = authorize_volume(&registry, "alice", Op::Put, &Credentials::none())
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn manage_is_never_exempt() {
        let registry = registry_with(
            "alice",
            VolumeSpec::with_exemptions("s3cr3t", [FileOp::Get, FileOp::Put, FileOp::Delete]),
        )
        .await;
        let err = authorize_volume(&registry, "alice", Op::Manage, &Credentials::none())
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn static_secret_header_grants_and_denies() {
        let registry = registry_with("alice", VolumeSpec::locked("s3cr3t")).await;

        authorize_volume(&registry, "alice", Op::Put, &secret_header("s3cr3t"))
            .await
            .unwrap();

        let err = authorize_volume(&registry, "alice", Op::Put, &secret_header("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Forbidden(_)));
    }

    #[tokio::test]
    async fn totp_header_and_query_grant() {
        let registry = registry_with("alice", VolumeSpec::locked("s3cr3t")).await;
        let code = totp::code_at(b"s3cr3t", totp::current_step());

        let header = Credentials {
            otp: OtpQuery::Missing,
            authorization: Some(format!("TOTP {code}")),
        };
        authorize_volume(&registry, "alice", Op::Put, &header)
            .await
            .unwrap();

        let query = Credentials {
            otp: OtpQuery::Single(code),
            authorization: None,
        };
        authorize_volume(&registry, "alice", Op::Put, &query)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn query_otp_takes_priority_over_header() {
        let registry = registry_with("alice", VolumeSpec::locked("s3cr3t")).await;

        // Bad query OTP must not fall through to a valid header.
        let creds = Credentials {
            otp: OtpQuery::Single("000000".into()),
            authorization: Some("Secret s3cr3t".into()),
        };
        let err = authorize_volume(&registry, "alice", Op::Put, &creds)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Forbidden(_)));
    }

    #[tokio::test]
    async fn repeated_query_otp_is_unauthorized() {
        let registry = registry_with("alice", VolumeSpec::locked("s3cr3t")).await;
        let creds = Credentials {
            otp: OtpQuery::Malformed,
            authorization: None,
        };
        let err = authorize_volume(&registry, "alice", Op::Put, &creds)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn unknown_scheme_is_unauthorized() {
        let registry = registry_with("alice", VolumeSpec::locked("s3cr3t")).await;
        let creds = Credentials {
            otp: OtpQuery::Missing,
            authorization: Some("Bearer s3cr3t".into()),
        };
        let err = authorize_volume(&registry, "alice", Op::Put, &creds)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Unauthorized(_)));
    }

    #[test]
    fn admin_gate_accepts_only_the_secret_scheme() {
        authorize_admin("admin", &secret_header("admin")).unwrap();

        let err = authorize_admin("admin", &secret_header("nope")).unwrap_err();
        assert!(matches!(err, GateError::Forbidden(_)));

        let err = authorize_admin("admin", &Credentials::none()).unwrap_err();
        assert!(matches!(err, GateError::Unauthorized(_)));

        let totp_creds = Credentials {
            otp: OtpQuery::Missing,
            authorization: Some("TOTP 123456".into()),
        };
        let err = authorize_admin("admin", &totp_creds).unwrap_err();
        assert!(matches!(err, GateError::Unauthorized(_)));
    }
}
