/// Transport kernel for the FTX REST API
///
/// The kernel turns a [`RequestDescriptor`](crate::core::types::RequestDescriptor)
/// into one HTTP call and hands back the unwrapped venue envelope. It holds
/// no venue endpoint knowledge; the operation catalogue lives in
/// `exchanges::ftx`.
///
/// # Components
///
/// - `codec`: compact JSON bodies and query suffixes, shared by signing and sending
/// - `signer`: `Signer` trait and the HMAC-SHA256 `FtxSigner`
/// - `clock`: timestamp source read once per signed call
/// - `transport`: injected `HttpTransport`, with a `reqwest` implementation
/// - `rest`: `RestClient`, the executor that classifies statuses and unwraps envelopes
///
/// # Example
///
/// ```rust,no_run
/// use ftx_rest::core::kernel::*;
/// use ftx_rest::core::types::RequestDescriptor;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = ReqwestTransport::new(&RestClientConfig::default())?;
/// let signer = Arc::new(FtxSigner::new(Credentials::new(
///     "api_key".to_string(),
///     "secret_key".to_string(),
/// )));
/// let rest = RestClient::new(transport, "https://ftx.com/api/".to_string()).with_signer(signer);
///
/// let _account = rest.execute(&RequestDescriptor::get("account").signed()).await?;
/// # Ok(())
/// # }
/// ```
pub mod clock;
pub mod codec;
pub mod rest;
pub mod signer;
pub mod transport;

// Re-export key types for convenience
pub use clock::{Clock, SystemClock};
pub use codec::{ParamValue, Params};
pub use rest::RestClient;
pub use signer::{Credentials, FtxSigner, SignatureMaterial, SignatureResult, Signer};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, RestClientConfig};
