use crate::core::kernel::codec::Params;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Venue region. Selects both the API host and the authentication header prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Global,
    Us,
}

impl Region {
    /// Prefix used for the `{PREFIX}-KEY`, `{PREFIX}-SIGN`, `{PREFIX}-TS` and
    /// `{PREFIX}-SUBACCOUNT` headers
    pub const fn header_prefix(self) -> &'static str {
        match self {
            Self::Global => "FTX",
            Self::Us => "FTXUS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Whether the venue reads (and signs) a request body for this method
    pub const fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One REST call, before signing
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    /// Path relative to the `/api/` root, without a leading slash
    pub path: String,
    pub query: Params,
    pub body: Params,
    pub signed: bool,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Params::new(),
            body: Params::new(),
            signed: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn query(mut self, query: Params) -> Self {
        self.query = query;
        self
    }

    pub fn body(mut self, body: Params) -> Self {
        self.body = body;
        self
    }

    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }
}

/// Unwrapped venue envelope.
///
/// `Rejected` carries the envelope's `error` string: a business-rule rejection
/// such as "Invalid order" is data the caller branches on, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueResponse<T> {
    Success(T),
    Rejected(String),
}

impl<T> VenueResponse<T> {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Rejected(error) => Some(error),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> VenueResponse<U> {
        match self {
            Self::Success(value) => VenueResponse::Success(f(value)),
            Self::Rejected(error) => VenueResponse::Rejected(error),
        }
    }

    /// Turn a rejection into `FtxError::Rejected` for callers that cannot carry it as data
    pub fn into_result(self) -> Result<T, crate::core::errors::FtxError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Rejected(error) => Err(crate::core::errors::FtxError::Rejected(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_header_prefix() {
        assert_eq!(Region::Global.header_prefix(), "FTX");
        assert_eq!(Region::Us.header_prefix(), "FTXUS");
    }

    #[test]
    fn test_method_body_rules() {
        assert!(!HttpMethod::Get.carries_body());
        assert!(HttpMethod::Post.carries_body());
        assert!(HttpMethod::Delete.carries_body());
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_venue_response_helpers() {
        let ok: VenueResponse<u32> = VenueResponse::Success(7);
        assert!(ok.is_success());
        assert_eq!(ok.clone().map(|v| v * 2), VenueResponse::Success(14));
        assert_eq!(ok.into_result().unwrap(), 7);

        let rejected: VenueResponse<u32> = VenueResponse::Rejected("Invalid order".to_string());
        assert_eq!(rejected.rejection(), Some("Invalid order"));
        assert!(matches!(
            rejected.into_result(),
            Err(crate::core::errors::FtxError::Rejected(msg)) if msg == "Invalid order"
        ));
    }
}
