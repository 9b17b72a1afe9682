use crate::core::errors::FtxError;
use crate::core::kernel::clock::{Clock, SystemClock};
use crate::core::kernel::codec::{encode_query, request_payload};
use crate::core::kernel::signer::Signer;
use crate::core::kernel::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::core::types::{RequestDescriptor, VenueResponse};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// The `{success, result | error}` wrapper every venue response shares
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Transport executor: signs (when asked), sends one request, classifies the
/// status and unwraps the envelope.
///
/// Holds no per-call state, so one instance can serve any number of
/// concurrent calls.
pub struct RestClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    base_url: String,
    signer: Option<Arc<dyn Signer>>,
    clock: Arc<dyn Clock>,
}

impl<T: HttpTransport> std::fmt::Debug for RestClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> RestClient<T> {
    /// Create a client for `base_url` (expected to end with `/api/`)
    pub fn new(transport: T, base_url: String) -> Self {
        Self {
            transport,
            base_url,
            signer: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the signer for authenticated requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Encode, and for signed requests sign, a descriptor into a wire request.
    ///
    /// The query suffix and body come from the same codec calls the signer
    /// uses, so the signed and transmitted bytes are identical.
    pub fn build_request(&self, descriptor: &RequestDescriptor) -> Result<HttpRequest, FtxError> {
        let query_suffix = encode_query(&descriptor.query)?;
        let body = request_payload(descriptor.method, &descriptor.body)?;

        let headers = if descriptor.signed {
            let signer = self.signer.as_ref().ok_or_else(|| {
                FtxError::AuthError("Authentication required but no signer provided".to_string())
            })?;
            // Fresh for every call; a stale timestamp is rejected by the venue
            let timestamp_ms = self.clock.timestamp_ms()?;
            signer.sign_request(
                descriptor.method,
                &descriptor.path,
                &descriptor.query,
                &descriptor.body,
                timestamp_ms,
            )?
        } else if body.is_some() {
            vec![("Content-Type".to_string(), "application/json".to_string())]
        } else {
            Vec::new()
        };

        Ok(HttpRequest {
            method: descriptor.method,
            url: format!("{}{}{}", self.base_url, descriptor.path, query_suffix),
            headers,
            body,
        })
    }

    /// Execute one request and return the unwrapped envelope
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method, path = %descriptor.path, signed = descriptor.signed))]
    pub async fn execute(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<VenueResponse<Value>, FtxError> {
        let request = self.build_request(descriptor)?;
        debug!(url = %request.url, "Sending request");

        let response = self.transport.send(request).await?;
        unwrap_response(response)
    }

    /// Execute one request and decode a successful `result` into `R`
    pub async fn execute_json<R: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<VenueResponse<R>, FtxError> {
        match self.execute(descriptor).await? {
            VenueResponse::Success(value) => {
                let raw = value.to_string();
                serde_json::from_value(value)
                    .map(VenueResponse::Success)
                    .map_err(|source| {
                        error!(path = %descriptor.path, "Could not decode result: {}", source);
                        FtxError::DecodeError { body: raw, source }
                    })
            }
            VenueResponse::Rejected(error) => Ok(VenueResponse::Rejected(error)),
        }
    }
}

/// Classify the status, then decode and unwrap the envelope.
///
/// `< 400` goes to the envelope path, `[400, 500)` is a client error and
/// `>= 500` a server error.
pub fn unwrap_response(response: HttpResponse) -> Result<VenueResponse<Value>, FtxError> {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;

    if let Some(err) = FtxError::from_status(status, body.clone(), headers) {
        return Err(err);
    }

    let envelope: Envelope = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(source) => {
            error!("Could not decode data to JSON: {}", body);
            return Err(FtxError::DecodeError { body, source });
        }
    };

    if envelope.success {
        Ok(VenueResponse::Success(envelope.result))
    } else {
        Ok(VenueResponse::Rejected(envelope.error.unwrap_or_default()))
    }
}
