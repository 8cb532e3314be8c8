//! Server status, pricing and name listings.

use std::collections::{BTreeMap, HashSet};

use bns_transport::endpoints::{
    GetAllNames, GetInfo, GetNameAt, GetNameCost, GetNameHistoryBlocks, GetNamesInNamespace,
    GetNamesOwnedByAddress, GetNamespaceCost, GetNumNames, GetNumNamesInNamespace, Ping,
};
use bns_transport::{Paginator, RpcError, Transport, NAME_PAGE_SIZE};
use bns_types::{NameOperation, ServerInfo};

use crate::client::LedgerClient;

impl<T: Transport> LedgerClient<T> {
    pub fn ping(&self) -> Result<(), RpcError> {
        self.request(&Ping).map(|_| ())
    }

    pub fn getinfo(&self) -> Result<ServerInfo, RpcError> {
        self.request(&GetInfo)
    }

    /// Registration cost of `name`, in satoshis.
    pub fn get_name_cost(&self, name: &str) -> Result<u64, RpcError> {
        let body = self.request_body(&GetNameCost {
            name: name.to_string(),
        })?;
        Ok(body.satoshis)
    }

    pub fn get_namespace_cost(&self, namespace_id: &str) -> Result<u64, RpcError> {
        let body = self.request_body(&GetNamespaceCost {
            namespace_id: namespace_id.to_string(),
        })?;
        Ok(body.satoshis)
    }

    pub fn get_num_names(&self) -> Result<u64, RpcError> {
        Ok(self.request_body(&GetNumNames)?.count)
    }

    /// One page of the global name listing. `count` is at most
    /// [`NAME_PAGE_SIZE`].
    pub fn get_all_names_page(&self, offset: u64, count: u64) -> Result<Vec<String>, RpcError> {
        check_page_count(count)?;
        Ok(self.request_body(&GetAllNames { offset, count })?.names)
    }

    /// Every name from `offset` on, or `count` of them.
    pub fn get_all_names(&self, offset: u64, count: Option<u64>) -> Result<Vec<String>, RpcError> {
        let total = match count {
            Some(count) => count,
            None => self.get_num_names()?.saturating_sub(offset),
        };
        let names = Paginator::new(offset, total, NAME_PAGE_SIZE, |offset, count| {
            self.get_all_names_page(offset, count)
        })
        .collect_all()?;
        reject_duplicates(&names)?;
        Ok(names)
    }

    pub fn get_num_names_in_namespace(&self, namespace_id: &str) -> Result<u64, RpcError> {
        let body = self.request_body(&GetNumNamesInNamespace {
            namespace_id: namespace_id.to_string(),
        })?;
        Ok(body.count)
    }

    pub fn get_names_in_namespace_page(
        &self,
        namespace_id: &str,
        offset: u64,
        count: u64,
    ) -> Result<Vec<String>, RpcError> {
        check_page_count(count)?;
        let body = self.request_body(&GetNamesInNamespace {
            namespace_id: namespace_id.to_string(),
            offset,
            count,
        })?;
        Ok(body.names)
    }

    pub fn get_names_in_namespace(
        &self,
        namespace_id: &str,
        offset: u64,
        count: Option<u64>,
    ) -> Result<Vec<String>, RpcError> {
        let total = match count {
            Some(count) => count,
            None => self
                .get_num_names_in_namespace(namespace_id)?
                .saturating_sub(offset),
        };
        let names = Paginator::new(offset, total, NAME_PAGE_SIZE, |offset, count| {
            self.get_names_in_namespace_page(namespace_id, offset, count)
        })
        .collect_all()?;
        reject_duplicates(&names)?;
        Ok(names)
    }

    pub fn get_names_owned_by_address(&self, address: &str) -> Result<Vec<String>, RpcError> {
        let body = self.request_body(&GetNamesOwnedByAddress {
            address: address.to_string(),
        })?;
        reject_duplicates(&body.names)?;
        Ok(body.names)
    }

    /// Blocks at which `name` was affected.
    pub fn get_name_history_blocks(&self, name: &str) -> Result<Vec<u64>, RpcError> {
        let body = self.request_body(&GetNameHistoryBlocks {
            name: name.to_string(),
        })?;
        Ok(body.history_blocks)
    }

    /// The states `name` was in at `block_height`, as the server stores them.
    pub fn get_name_at(&self, name: &str, block_height: u64) -> Result<Vec<NameOperation>, RpcError> {
        let body = self.request_body(&GetNameAt {
            name: name.to_string(),
            block_height,
        })?;
        Ok(body.records)
    }

    /// States of `name` at every history block in `[start_block, end_block]`.
    pub fn get_name_blockchain_history(
        &self,
        name: &str,
        start_block: u64,
        end_block: u64,
    ) -> Result<BTreeMap<u64, Vec<NameOperation>>, RpcError> {
        let mut blocks: Vec<u64> = self
            .get_name_history_blocks(name)?
            .into_iter()
            .filter(|b| (start_block..=end_block).contains(b))
            .collect();
        blocks.sort_unstable();
        blocks.dedup();

        let mut history = BTreeMap::new();
        for block in blocks {
            history.insert(block, self.get_name_at(name, block)?);
        }
        Ok(history)
    }
}

pub(crate) fn check_page_count(count: u64) -> Result<(), RpcError> {
    if count > NAME_PAGE_SIZE {
        return Err(RpcError::InvalidArgument(format!(
            "page count {} exceeds {}",
            count, NAME_PAGE_SIZE
        )));
    }
    Ok(())
}

fn reject_duplicates(names: &[String]) -> Result<(), RpcError> {
    let mut seen = HashSet::with_capacity(names.len());
    if names.iter().all(|name| seen.insert(name.as_str())) {
        Ok(())
    } else {
        Err(RpcError::integrity("server replied duplicate names"))
    }
}
