//! Session-scoped contract handle cache.

use alloy_primitives::Address;
use alloy_provider::DynProvider;
use binding::token::{IChildERC20, IChildERC721};
use std::collections::HashMap;
use std::sync::Mutex;

/// Which chain a contract handle is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainSide {
    Root,
    Child,
}

pub(crate) type Erc20Handle = IChildERC20::IChildERC20Instance<DynProvider>;
pub(crate) type Erc721Handle = IChildERC721::IChildERC721Instance<DynProvider>;

#[derive(Clone)]
enum TokenHandle {
    Fungible(Erc20Handle),
    NonFungible(Erc721Handle),
}

/// Token contract handles, keyed by `(address, chain side)`.
///
/// Keys are parsed `Address` values, so hex-case differences in input
/// collapse to one entry. Entries live until the session's signing
/// credential changes; there is no other eviction. Lookup and insert happen
/// under one lock, so concurrent callers never bind the same token twice.
#[derive(Default)]
pub(crate) struct TokenHandleCache {
    inner: Mutex<HashMap<(Address, ChainSide), TokenHandle>>,
}

impl TokenHandleCache {
    /// Fungible handle for a token, built on first use.
    ///
    /// An entry bound with the other ABI is replaced; token addresses do not
    /// change kind in practice.
    pub(crate) fn erc20(
        &self,
        token: Address,
        side: ChainSide,
        provider: &DynProvider,
    ) -> Erc20Handle {
        let mut handles = self.inner.lock().expect("handle cache poisoned");

        if let Some(TokenHandle::Fungible(handle)) = handles.get(&(token, side)) {
            return handle.clone();
        }

        let handle = IChildERC20::new(token, provider.clone());
        handles.insert((token, side), TokenHandle::Fungible(handle.clone()));
        handle
    }

    /// Non-fungible handle for a token, built on first use.
    pub(crate) fn erc721(
        &self,
        token: Address,
        side: ChainSide,
        provider: &DynProvider,
    ) -> Erc721Handle {
        let mut handles = self.inner.lock().expect("handle cache poisoned");

        if let Some(TokenHandle::NonFungible(handle)) = handles.get(&(token, side)) {
            return handle.clone();
        }

        let handle = IChildERC721::new(token, provider.clone());
        handles.insert((token, side), TokenHandle::NonFungible(handle.clone()));
        handle
    }

    pub(crate) fn clear(&self) {
        self.inner.lock().expect("handle cache poisoned").clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().expect("handle cache poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> DynProvider {
        client::create_provider("http://localhost:8545").expect("Failed to build provider")
    }

    #[test]
    fn test_case_insensitive_addresses_share_one_entry() {
        let cache = TokenHandleCache::default();
        let provider = provider();

        let lower: Address = "0x28e4f3a7f651294b9564800b2d01f35189a5bfbe"
            .parse()
            .expect("Failed to parse address");
        let upper: Address = "0x28E4F3A7F651294B9564800B2D01F35189A5BFBE"
            .parse()
            .expect("Failed to parse address");

        let first = cache.erc20(lower, ChainSide::Child, &provider);
        let second = cache.erc20(upper, ChainSide::Child, &provider);

        assert_eq!(cache.len(), 1);
        assert_eq!(first.address(), second.address());
    }

    #[test]
    fn test_chain_sides_are_distinct_entries() {
        let cache = TokenHandleCache::default();
        let provider = provider();
        let token = Address::from([0x11; 20]);

        cache.erc20(token, ChainSide::Child, &provider);
        cache.erc20(token, ChainSide::Root, &provider);

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear_empties_the_cache() {
        let cache = TokenHandleCache::default();
        let provider = provider();

        cache.erc721(Address::from([0x22; 20]), ChainSide::Child, &provider);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
