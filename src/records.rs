//! Current name and namespace records, and the yes/no questions asked of
//! them.
//!
//! The predicates answer `false` when the record cannot be fetched; the
//! failure is logged.

use tracing::debug;

use bns_transport::endpoints::{
    GetNameBlockchainRecord, GetNameopsHashAt, GetNamespaceBlockchainRecord,
};
use bns_transport::{RpcError, Transport};
use bns_types::{NameRecord, NamespaceRecord};

use crate::client::LedgerClient;
use crate::zonefile::zonefile_hash;

impl<T: Transport> LedgerClient<T> {
    /// The name's current record, including its embedded history.
    pub fn get_name_blockchain_record(&self, name: &str) -> Result<NameRecord, RpcError> {
        let body = self.request_body(&GetNameBlockchainRecord {
            name: name.to_string(),
        })?;
        Ok(body.record)
    }

    /// The namespace's current record. The server's `opcode` is dropped.
    pub fn get_namespace_blockchain_record(
        &self,
        namespace_id: &str,
    ) -> Result<NamespaceRecord, RpcError> {
        let mut body = self.request_body(&GetNamespaceBlockchainRecord {
            namespace_id: namespace_id.to_string(),
        })?;
        body.record.operation.extra.remove("opcode");
        Ok(body.record)
    }

    /// The server's aggregate hash of the operations at `block_height`.
    pub fn get_nameops_hash_at(&self, block_height: u64) -> Result<String, RpcError> {
        Ok(self.request_body(&GetNameopsHashAt { block_height })?.ops_hash)
    }

    fn record_or_log(&self, name: &str) -> Option<NameRecord> {
        match self.get_name_blockchain_record(name) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Failed to read blockchain record for {}: {}", name, e);
                None
            }
        }
    }

    /// Registered and not revoked.
    pub fn is_name_registered(&self, name: &str) -> bool {
        self.record_or_log(name).is_some_and(|record| {
            record.operation.revoked != Some(true) && record.operation.first_registered.is_some()
        })
    }

    pub fn has_zonefile_hash(&self, name: &str) -> bool {
        self.record_or_log(name)
            .is_some_and(|record| record.operation.value_hash.is_some())
    }

    pub fn is_zonefile_hash_current(&self, name: &str, zonefile_hash: &str) -> bool {
        self.record_or_log(name)
            .is_some_and(|record| record.operation.value_hash.as_deref() == Some(zonefile_hash))
    }

    /// Whether the hash of `zonefile` is the one published for `name`.
    pub fn is_zonefile_current(&self, name: &str, zonefile: &[u8]) -> bool {
        self.is_zonefile_hash_current(name, &zonefile_hash(zonefile))
    }

    pub fn is_name_owner(&self, name: &str, address: &str) -> bool {
        self.record_or_log(name)
            .is_some_and(|record| record.operation.address.as_deref() == Some(address))
    }
}
