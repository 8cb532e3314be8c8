//! The ledger client handle.
//!
//! There is no process-wide default client. Build one per caller:
//!
//! ```ignore
//! use bns_snv::LedgerClient;
//!
//! let client = LedgerClient::from_env();
//! let names = client.get_names_in_namespace("id", 0, None)?;
//! ```

use tracing::warn;

use bns_history::{ConsensusQuirks, LegacyQuirks};
use bns_transport::{Envelope, RpcCall, RpcClient, RpcError, Transport, XmlRpcTransport};
use bns_types::ClientConfig;

/// Queries against one indexing server.
///
/// Generic over the transport so tests can script replies; production code
/// uses the default [`XmlRpcTransport`].
pub struct LedgerClient<T: Transport = XmlRpcTransport> {
    rpc: RpcClient<T>,
    quirks: Box<dyn ConsensusQuirks + Send + Sync>,
}

impl LedgerClient<XmlRpcTransport> {
    pub fn connect(config: &ClientConfig) -> Self {
        Self::new(XmlRpcTransport::new(config))
    }

    /// Connect using `BNS_SERVER`, `BNS_PORT` and the timeout variables.
    pub fn from_env() -> Self {
        Self::connect(&ClientConfig::from_env())
    }
}

impl<T: Transport> LedgerClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            rpc: RpcClient::new(transport),
            quirks: Box::new(LegacyQuirks),
        }
    }

    /// Replace the consensus-quirk rules used during reconstruction.
    pub fn with_quirks<Q>(mut self, quirks: Q) -> Self
    where
        Q: ConsensusQuirks + Send + Sync + 'static,
    {
        self.quirks = Box::new(quirks);
        self
    }

    pub fn transport(&self) -> &T {
        self.rpc.transport()
    }

    pub(crate) fn quirks(&self) -> &(dyn ConsensusQuirks + Send + Sync) {
        self.quirks.as_ref()
    }

    pub(crate) fn request<C: RpcCall>(&self, call: &C) -> Result<C::Response, RpcError> {
        self.rpc.request(call)
    }

    /// Send an enveloped call and return its body.
    pub(crate) fn request_body<C, B>(&self, call: &C) -> Result<B, RpcError>
    where
        C: RpcCall<Response = Envelope<B>>,
    {
        let response = self.rpc.request(call)?;
        if response.indexing {
            warn!(
                method = %C::METHOD,
                lastblock = ?response.lastblock,
                "server is still indexing; reply may be stale"
            );
        }
        Ok(response.body)
    }
}
