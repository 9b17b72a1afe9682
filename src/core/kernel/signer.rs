use crate::core::errors::FtxError;
use crate::core::kernel::codec::{encode_query, request_payload, Params};
use crate::core::types::{HttpMethod, Region};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Result type for signing operations: ordered request headers
pub type SignatureResult = Result<Vec<(String, String)>, FtxError>;

/// Signer trait for request authentication
///
/// Implementations turn a request (method, path, query, body) and a fresh
/// timestamp into the headers the venue needs to authenticate it.
pub trait Signer: Send + Sync {
    /// Sign a request and return the headers to attach
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - Path relative to `/api/`
    /// * `query` - Query fields, encoded with the shared codec
    /// * `body` - Body fields, encoded with the shared codec
    /// * `timestamp_ms` - Request timestamp in milliseconds, captured for this call only
    fn sign_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Params,
        body: &Params,
        timestamp_ms: u64,
    ) -> SignatureResult;
}

/// API key, secret, optional sub-account and region. Immutable once built.
#[derive(Clone)]
pub struct Credentials {
    api_key: Secret<String>,
    secret_key: Secret<String>,
    subaccount: Option<String>,
    region: Region,
}

impl Credentials {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            subaccount: None,
            region: Region::Global,
        }
    }

    pub fn with_subaccount(mut self, subaccount: Option<String>) -> Self {
        self.subaccount = subaccount.filter(|s| !s.is_empty());
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    pub fn subaccount(&self) -> Option<&str> {
        self.subaccount.as_deref()
    }

    pub const fn region(&self) -> Region {
        self.region
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field("subaccount", &self.subaccount)
            .field("region", &self.region)
            .finish()
    }
}

/// Everything that went into one signature. Never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMaterial {
    pub timestamp_ms: u64,
    pub canonical: String,
    pub digest_hex: String,
    /// True when a JSON body was appended, which also requires `Content-Type: application/json`
    pub has_body: bool,
}

/// `"{timestamp}{METHOD}/api/{path}{?query}{body}"`
pub fn canonical_string(
    timestamp_ms: u64,
    method: HttpMethod,
    path: &str,
    query_suffix: &str,
    payload: Option<&str>,
) -> String {
    format!(
        "{}{}/api/{}{}{}",
        timestamp_ms,
        method.as_str(),
        path,
        query_suffix,
        payload.unwrap_or_default()
    )
}

/// Lowercase hex HMAC-SHA256 of `message` keyed with `secret`
pub fn hmac_sha256_hex(secret: &str, message: &str) -> Result<String, FtxError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| FtxError::AuthError(format!("Invalid secret key: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// HMAC-SHA256 signer for the venue's `{PREFIX}-KEY/SIGN/TS` scheme
pub struct FtxSigner {
    credentials: Credentials,
}

impl FtxSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn signature_material(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Params,
        body: &Params,
        timestamp_ms: u64,
    ) -> Result<SignatureMaterial, FtxError> {
        let query_suffix = encode_query(query)?;
        let payload = request_payload(method, body)?;
        let canonical = canonical_string(
            timestamp_ms,
            method,
            path,
            &query_suffix,
            payload.as_deref(),
        );
        let digest_hex = hmac_sha256_hex(self.credentials.secret_key.expose_secret(), &canonical)?;

        Ok(SignatureMaterial {
            timestamp_ms,
            canonical,
            digest_hex,
            has_body: payload.is_some(),
        })
    }
}

impl Signer for FtxSigner {
    fn sign_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Params,
        body: &Params,
        timestamp_ms: u64,
    ) -> SignatureResult {
        let material = self.signature_material(method, path, query, body, timestamp_ms)?;
        let prefix = self.credentials.region.header_prefix();

        let mut headers = Vec::with_capacity(5);
        if material.has_body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers.push((format!("{}-KEY", prefix), self.credentials.api_key().to_string()));
        headers.push((format!("{}-SIGN", prefix), material.digest_hex));
        headers.push((format!("{}-TS", prefix), material.timestamp_ms.to_string()));

        if let Some(subaccount) = self.credentials.subaccount() {
            headers.push((
                format!("{}-SUBACCOUNT", prefix),
                urlencoding::encode(subaccount).into_owned(),
            ));
        }

        Ok(headers)
    }
}
