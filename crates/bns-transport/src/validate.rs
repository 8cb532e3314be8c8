//! Response validation.
//!
//! Every reply is first tested against the error shape `{"error": string}`.
//! A reply matching it is the server's own failure report and is returned
//! as [`RpcError::Server`], even if it also happens to carry fields of the
//! expected schema. Otherwise the reply is deserialized into the method's
//! typed response and that type's field checks run.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use bns_types::serde_util::required_nullable;

use crate::error::RpcError;
use crate::method::{RpcCall, RpcMethod};
use crate::transport::Transport;

/// Field-format checks a response runs after deserialization.
pub trait CheckResponse {
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// The status fields most responses carry next to their payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: bool,
    pub indexing: bool,
    #[serde(deserialize_with = "required_nullable")]
    pub lastblock: Option<u64>,
    #[serde(flatten)]
    pub body: T,
}

impl<T: CheckResponse> CheckResponse for Envelope<T> {
    fn check(&self) -> Result<(), String> {
        self.body.check()
    }
}

/// The server's error message, if `value` has the error shape.
pub fn error_shape(value: &Value) -> Option<&str> {
    value.as_object()?.get("error")?.as_str()
}

/// Validate a raw reply for `method`.
pub fn validate<R>(method: RpcMethod, value: Value) -> Result<R, RpcError>
where
    R: DeserializeOwned + CheckResponse,
{
    if let Some(message) = error_shape(&value) {
        debug!(method = %method, "server error: {}", message);
        return Err(RpcError::Server(message.to_string()));
    }
    let response: R =
        serde_json::from_value(value).map_err(|e| RpcError::schema(method, e.to_string()))?;
    response
        .check()
        .map_err(|message| RpcError::schema(method, message))?;
    Ok(response)
}

/// Sends typed calls and validates their replies.
pub struct RpcClient<T: Transport> {
    transport: T,
}

impl<T: Transport> RpcClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn request<C: RpcCall>(&self, call: &C) -> Result<C::Response, RpcError> {
        let raw = self.transport.call(C::METHOD, &call.params())?;
        let response = validate::<C::Response>(C::METHOD, raw)?;
        call.check_against(&response)
            .map_err(|message| RpcError::schema(C::METHOD, message))?;
        Ok(response)
    }
}
