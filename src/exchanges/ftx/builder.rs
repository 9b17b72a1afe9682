use crate::core::config::FtxConfig;
use crate::core::errors::FtxError;
use crate::core::kernel::{
    Clock, FtxSigner, HttpTransport, ReqwestTransport, RestClient, RestClientConfig,
};
use crate::core::types::Region;
use crate::exchanges::ftx::rest::FtxRest;
use std::sync::Arc;
use tracing::debug;

/// Builder for creating FTX REST clients
///
/// Resolves the regional base URL, attaches a signer when credentials are
/// present and wires the transport.
pub struct FtxBuilder {
    config: FtxConfig,
    rest_config: RestClientConfig,
    clock: Option<Arc<dyn Clock>>,
}

impl Default for FtxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FtxBuilder {
    /// Create a new `FtxBuilder` for public endpoints only
    pub fn new() -> Self {
        Self {
            config: FtxConfig::read_only(),
            rest_config: RestClientConfig::default(),
            clock: None,
        }
    }

    /// Set the exchange configuration
    pub fn with_config(mut self, config: FtxConfig) -> Self {
        self.config = config;
        self
    }

    /// Set API credentials
    pub fn with_credentials(mut self, api_key: String, secret_key: String) -> Self {
        let previous = std::mem::replace(&mut self.config, FtxConfig::new(api_key, secret_key));
        self.config.subaccount = previous.subaccount;
        self.config.region = previous.region;
        self.config.base_url = previous.base_url;
        self
    }

    pub fn with_subaccount(mut self, subaccount: String) -> Self {
        self.config.subaccount = Some(subaccount);
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.config.region = region;
        self
    }

    /// Set base URL for REST API
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.config.base_url = Some(base_url);
        self
    }

    /// Set REST client timeout in seconds
    pub fn with_rest_timeout(mut self, timeout: u64) -> Self {
        self.rest_config = self.rest_config.with_timeout(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.rest_config = self.rest_config.with_user_agent(user_agent);
        self
    }

    /// Replace the timestamp source used for signing
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build a client on the default `reqwest` transport
    pub fn build(self) -> Result<FtxRest<ReqwestTransport>, FtxError> {
        let transport = ReqwestTransport::new(&self.rest_config)?;
        Ok(self.build_with_transport(transport))
    }

    /// Build a client on a caller-supplied transport
    pub fn build_with_transport<T: HttpTransport>(self, transport: T) -> FtxRest<T> {
        let base_url = self.config.resolve_base_url();
        debug!(base_url = %base_url, region = ?self.config.region, "Building FTX client");

        let mut rest = RestClient::new(transport, base_url);

        if self.config.has_credentials() {
            rest = rest.with_signer(Arc::new(FtxSigner::new(self.config.credentials())));
        }
        if let Some(clock) = self.clock {
            rest = rest.with_clock(clock);
        }

        FtxRest::new(rest)
    }
}

/// Create an FTX client from a configuration
pub fn build_connector(config: FtxConfig) -> Result<FtxRest<ReqwestTransport>, FtxError> {
    FtxBuilder::new().with_config(config).build()
}
