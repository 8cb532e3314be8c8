//! BNS Transport Layer
//!
//! Everything between a typed query and the wire:
//!
//! - [`transport`]: the [`Transport`] trait and the XML-RPC over HTTP
//!   implementation
//! - [`xmlrpc`]: the `methodCall` / `methodResponse` envelope codec
//! - [`method`]: the closed set of remote methods and the [`RpcCall`] trait
//! - [`endpoints`]: one typed request and response per method
//! - [`validate`]: the trust-boundary check every reply goes through
//! - [`paginate`]: count-then-page retrieval
//!
//! # Example
//!
//! ```ignore
//! use bns_transport::{endpoints::GetNumNames, RpcClient, XmlRpcTransport};
//! use bns_types::ClientConfig;
//!
//! let rpc = RpcClient::new(XmlRpcTransport::new(&ClientConfig::from_env()));
//! let reply = rpc.request(&GetNumNames)?;
//! println!("{} names", reply.body.count);
//! ```

pub mod endpoints;
pub mod error;
pub mod method;
pub mod paginate;
pub mod transport;
pub mod validate;
pub mod xmlrpc;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main types for convenience
pub use error::{ErrorKind, RpcError};
pub use method::{RpcCall, RpcMethod};
pub use paginate::{fetch_all, Paginator, HISTORY_PAGE_SIZE, NAME_PAGE_SIZE};
pub use transport::{Transport, XmlRpcTransport};
pub use validate::{validate, CheckResponse, Envelope, RpcClient};
