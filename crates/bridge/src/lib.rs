//! Session facade over the dual-chain plasma bridge.
//!
//! A [`BridgeClient`] owns one endpoint per chain side, the three fixed
//! protocol contract handles on the root chain, and the session caches.
//! Read-only queries work immediately after construction; state-changing
//! operations require [`BridgeClient::set_credential`] first.

mod cache;

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::TransactionRequest;
use alloy_rpc_types_eth::{Transaction, TransactionReceipt};
use binding::rootchain::{IDepositManager, IRootChain, IWithdrawManager};
pub use cache::ChainSide;
use cache::TokenHandleCache;
use client::{ClientError, SubmitError};
use config::BridgeConfig;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};
use withdrawal::{CheckpointHeader, ProofLookup, ProofSource, WithdrawError};

#[derive(Error, Debug)]
pub enum BridgeError {
    /// A state-changing operation was attempted before `set_credential`
    #[error("signing credential not set; call set_credential first")]
    MissingCredential,

    /// Endpoint or credential construction failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The transaction submitter failed (gas price, estimate, send, receipt)
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// Withdrawal confirmation failed (no checkpoint, missing proof, ...)
    #[error(transparent)]
    Withdraw(#[from] WithdrawError),

    /// A read-only contract call failed
    #[error("contract call failed: {0}")]
    Call(String),

    /// A plain chain-RPC request failed
    #[error("chain rpc request failed: {0}")]
    Rpc(String),
}

fn call_error(e: impl Display) -> BridgeError {
    BridgeError::Call(e.to_string())
}

fn rpc_error(e: impl Display) -> BridgeError {
    BridgeError::Rpc(e.to_string())
}

/// One immutable generation of endpoints and protocol contract handles.
///
/// Rebinding the credential builds a whole new generation instead of
/// mutating handles in place; operations already holding the old one may
/// complete against it.
struct Generation {
    root: DynProvider,
    child: DynProvider,
    root_chain: IRootChain::IRootChainInstance<DynProvider>,
    withdraw_manager: IWithdrawManager::IWithdrawManagerInstance<DynProvider>,
    deposit_manager: IDepositManager::IDepositManagerInstance<DynProvider>,
    signing: bool,
}

impl Generation {
    fn build(config: &BridgeConfig, credential: Option<&str>) -> Result<Self, BridgeError> {
        let (root, child) = match credential {
            Some(key) => (
                client::create_wallet_provider(&config.root_rpc_url, key)?,
                client::create_wallet_provider(&config.child_rpc_url, key)?,
            ),
            None => (
                client::create_provider(&config.root_rpc_url)?,
                client::create_provider(&config.child_rpc_url)?,
            ),
        };

        Ok(Self {
            root_chain: IRootChain::new(config.contracts.root_chain, root.clone()),
            withdraw_manager: IWithdrawManager::new(
                config.contracts.withdraw_manager,
                root.clone(),
            ),
            deposit_manager: IDepositManager::new(config.contracts.deposit_manager, root.clone()),
            signing: credential.is_some(),
            root,
            child,
        })
    }

    fn provider(&self, side: ChainSide) -> &DynProvider {
        match side {
            ChainSide::Root => &self.root,
            ChainSide::Child => &self.child,
        }
    }
}

/// Client session for moving assets between the root and child chains.
pub struct BridgeClient {
    config: BridgeConfig,
    generation: RwLock<Arc<Generation>>,
    tokens: TokenHandleCache,
    mapped: Mutex<HashMap<Address, Address>>,
    source: ProofSource,
}

impl BridgeClient {
    /// Build a session from configuration. No network traffic happens here;
    /// endpoints connect lazily on first use.
    pub fn new(config: BridgeConfig) -> Result<Self, BridgeError> {
        let generation = Generation::build(&config, None)?;
        let source = ProofSource::new(
            client::create_provider(&config.child_rpc_url)?,
            config.syncer_url.clone(),
            config.watcher_url.clone(),
        );

        Ok(Self {
            generation: RwLock::new(Arc::new(generation)),
            tokens: TokenHandleCache::default(),
            mapped: Mutex::new(HashMap::new()),
            source,
            config,
        })
    }

    /// Rebind both chain endpoints to a signing credential.
    ///
    /// Builds a new generation of providers and protocol contract handles
    /// and clears the session caches. In-flight operations keep the old
    /// generation; new operations read the latest one. Must not race with a
    /// send in progress on the same logical flow.
    pub fn set_credential(&self, private_key: &str) -> Result<(), BridgeError> {
        let generation = Generation::build(&self.config, Some(private_key))?;

        *self.generation.write().expect("generation lock poisoned") = Arc::new(generation);
        self.tokens.clear();
        self.mapped.lock().expect("mapped cache poisoned").clear();

        info!("signing credential rebound, session caches cleared");
        Ok(())
    }

    fn generation(&self) -> Arc<Generation> {
        self.generation
            .read()
            .expect("generation lock poisoned")
            .clone()
    }

    fn signing_generation(&self) -> Result<Arc<Generation>, BridgeError> {
        let generation = self.generation();
        if !generation.signing {
            return Err(BridgeError::MissingCredential);
        }

        Ok(generation)
    }

    //
    // Read-only queries
    //

    /// Fungible token balance on either chain side.
    pub async fn balance_of_erc20(
        &self,
        holder: Address,
        token: Address,
        side: ChainSide,
    ) -> Result<U256, BridgeError> {
        let generation = self.generation();
        let contract = self.tokens.erc20(token, side, generation.provider(side));
        let balance = contract
            .balanceOf(holder)
            .call()
            .await
            .map_err(call_error)?;

        debug!(%holder, %token, ?side, %balance, "queried fungible balance");
        Ok(balance)
    }

    /// Non-fungible token balance on either chain side.
    pub async fn balance_of_erc721(
        &self,
        holder: Address,
        token: Address,
        side: ChainSide,
    ) -> Result<U256, BridgeError> {
        let generation = self.generation();
        let contract = self.tokens.erc721(token, side, generation.provider(side));
        let balance = contract
            .balanceOf(holder)
            .call()
            .await
            .map_err(call_error)?;

        Ok(balance)
    }

    /// Enumerate an owner's non-fungible tokens by index.
    pub async fn token_of_owner_by_index_erc721(
        &self,
        owner: Address,
        token: Address,
        index: u64,
        side: ChainSide,
    ) -> Result<U256, BridgeError> {
        let generation = self.generation();
        let contract = self.tokens.erc721(token, side, generation.provider(side));
        let token_id = contract
            .tokenOfOwnerByIndex(owner, U256::from(index))
            .call()
            .await
            .map_err(call_error)?;

        Ok(token_id)
    }

    /// Native currency balance on either chain side.
    pub async fn native_balance(
        &self,
        address: Address,
        side: ChainSide,
    ) -> Result<U256, BridgeError> {
        let generation = self.generation();
        generation
            .provider(side)
            .get_balance(address)
            .await
            .map_err(rpc_error)
    }

    /// Child-chain address mapped to a root token, cached for the session.
    ///
    /// The on-chain mapping is immutable, so a cached value is never
    /// refreshed.
    pub async fn mapped_token_address(&self, root_token: Address) -> Result<Address, BridgeError> {
        if let Some(mapped) = self
            .mapped
            .lock()
            .expect("mapped cache poisoned")
            .get(&root_token)
        {
            return Ok(*mapped);
        }

        let generation = self.generation();
        let mapped = generation
            .deposit_manager
            .tokens(root_token)
            .call()
            .await
            .map_err(call_error)?;

        self.mapped
            .lock()
            .expect("mapped cache poisoned")
            .insert(root_token, mapped);

        debug!(%root_token, %mapped, "resolved mapped token address");
        Ok(mapped)
    }

    /// Child-chain transaction by id; syncer first, RPC fallback.
    pub async fn transaction(&self, tx_id: TxHash) -> Option<Transaction> {
        match self.source.transaction(tx_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, %tx_id, "transaction lookup failed");
                None
            }
        }
    }

    /// Child-chain receipt by transaction id; syncer first, RPC fallback.
    pub async fn transaction_receipt(&self, tx_id: TxHash) -> Option<TransactionReceipt> {
        match self.source.transaction_receipt(tx_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, %tx_id, "receipt lookup failed");
                None
            }
        }
    }

    /// Checkpoint header covering a child-chain block, if one exists yet.
    pub async fn header_for_block(&self, block_number: u64) -> Option<CheckpointHeader> {
        match self.source.header_for_block(block_number).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, block_number, "header lookup failed");
                None
            }
        }
    }

    //
    // Deposits (root chain)
    //

    /// Approve the root-chain contract to pull fungible tokens for deposit.
    pub async fn approve_erc20_for_deposit(
        &self,
        from: Address,
        token: Address,
        amount: U256,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let contract = self.tokens.erc20(token, ChainSide::Root, &generation.root);
        let tx = contract
            .approve(self.config.contracts.root_chain, amount)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(&generation.root, tx).await?;
        info!(%token, %amount, %hash, "approved fungible tokens for deposit");
        Ok(hash)
    }

    /// Deposit fungible tokens for a user on the child chain.
    pub async fn deposit_erc20(
        &self,
        from: Address,
        user: Address,
        token: Address,
        amount: U256,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let tx = generation
            .root_chain
            .deposit(token, user, amount)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(&generation.root, tx).await?;
        info!(%user, %token, %amount, %hash, "deposited fungible tokens");
        Ok(hash)
    }

    /// Approve the root-chain contract for a single non-fungible token.
    pub async fn approve_erc721_for_deposit(
        &self,
        from: Address,
        token: Address,
        token_id: U256,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let contract = self.tokens.erc721(token, ChainSide::Root, &generation.root);
        let tx = contract
            .approve(self.config.contracts.root_chain, token_id)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(&generation.root, tx).await?;
        info!(%token, %token_id, %hash, "approved non-fungible token for deposit");
        Ok(hash)
    }

    /// Deposit a non-fungible token for a user on the child chain.
    pub async fn deposit_erc721(
        &self,
        from: Address,
        user: Address,
        token: Address,
        token_id: U256,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let tx = generation
            .root_chain
            .depositERC721(token, user, token_id)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(&generation.root, tx).await?;
        info!(%user, %token, %token_id, %hash, "deposited non-fungible token");
        Ok(hash)
    }

    /// Deposit a non-fungible token by transferring it straight to the
    /// root-chain contract; no prior approval needed.
    pub async fn safe_deposit_erc721(
        &self,
        from: Address,
        token: Address,
        token_id: U256,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let contract = self.tokens.erc721(token, ChainSide::Root, &generation.root);
        let tx = contract
            .safeTransferFrom(from, self.config.contracts.root_chain, token_id)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(&generation.root, tx).await?;
        info!(%token, %token_id, %hash, "safe-deposited non-fungible token");
        Ok(hash)
    }

    /// Deposit native currency; credited as the wrapped native token on the
    /// child chain.
    pub async fn deposit_ethers(&self, from: Address, value: U256) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let tx = generation
            .root_chain
            .depositEthers()
            .value(value)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(&generation.root, tx).await?;
        info!(%value, %hash, "deposited native currency");
        Ok(hash)
    }

    //
    // Transfers
    //

    /// Transfer fungible tokens on either chain side.
    pub async fn transfer_erc20(
        &self,
        from: Address,
        to: Address,
        token: Address,
        amount: U256,
        side: ChainSide,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let contract = self.tokens.erc20(token, side, generation.provider(side));
        let tx = contract
            .transfer(to, amount)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(generation.provider(side), tx).await?;
        info!(%to, %token, %amount, ?side, %hash, "transferred fungible tokens");
        Ok(hash)
    }

    /// Transfer a non-fungible token on either chain side.
    pub async fn transfer_erc721(
        &self,
        from: Address,
        to: Address,
        token: Address,
        token_id: U256,
        side: ChainSide,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let contract = self.tokens.erc721(token, side, generation.provider(side));
        let tx = contract
            .transferFrom(from, to, token_id)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(generation.provider(side), tx).await?;
        info!(%to, %token, %token_id, ?side, %hash, "transferred non-fungible token");
        Ok(hash)
    }

    /// Transfer native value.
    ///
    /// On the child side the native asset is the wrapped native token, so
    /// this is a token transfer; on the root side it is a plain value
    /// transaction.
    pub async fn transfer_ethers(
        &self,
        from: Address,
        to: Address,
        value: U256,
        side: ChainSide,
    ) -> Result<TxHash, BridgeError> {
        match side {
            ChainSide::Child => {
                self.transfer_erc20(
                    from,
                    to,
                    self.config.contracts.wrapped_native_token,
                    value,
                    ChainSide::Child,
                )
                .await
            }
            ChainSide::Root => {
                let generation = self.signing_generation()?;
                let tx = TransactionRequest::default()
                    .with_from(from)
                    .with_to(to)
                    .with_value(value);

                let hash = client::send_and_confirm(&generation.root, tx).await?;
                info!(%to, %value, %hash, "transferred native value");
                Ok(hash)
            }
        }
    }

    //
    // Withdrawals
    //

    /// Burn fungible tokens on the child chain to start a withdrawal.
    ///
    /// Withdrawing the native asset starts from the wrapped native token
    /// address.
    pub async fn start_withdraw(
        &self,
        from: Address,
        token: Address,
        amount: U256,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let contract = self.tokens.erc20(token, ChainSide::Child, &generation.child);
        let tx = contract
            .withdraw(amount)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(&generation.child, tx).await?;
        info!(%token, %amount, %hash, "started withdrawal");
        Ok(hash)
    }

    /// Burn a non-fungible token on the child chain to start a withdrawal.
    pub async fn start_erc721_withdraw(
        &self,
        from: Address,
        token: Address,
        token_id: U256,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let contract = self
            .tokens
            .erc721(token, ChainSide::Child, &generation.child);
        let tx = contract
            .withdraw(token_id)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(&generation.child, tx).await?;
        info!(%token, %token_id, %hash, "started non-fungible withdrawal");
        Ok(hash)
    }

    /// Prove a child-chain burn against its checkpoint and claim it on the
    /// root chain.
    ///
    /// Fails with a distinct condition per cause: no checkpoint yet (poll
    /// and retry later), missing proof material, proof source unavailable,
    /// or an RPC/submission error.
    pub async fn confirm_withdrawal(
        &self,
        from: Address,
        tx_id: TxHash,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;

        let params = withdrawal::assemble(&self.source, tx_id).await?;

        info!(
            %tx_id,
            header = %params.header_number,
            block = params.block_number,
            proof_bytes = params.header_proof.len(),
            "assembled withdrawal proof"
        );

        let tx = generation
            .withdraw_manager
            .withdrawBurntTokens(
                params.header_number,
                params.header_proof,
                U256::from(params.block_number),
                U256::from(params.block_timestamp),
                params.tx_root,
                params.receipt_root,
                params.path,
                params.tx_bytes,
                params.tx_proof_nodes,
                params.receipt_bytes,
                params.receipt_proof_nodes,
            )
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(&generation.root, tx).await?;
        info!(%tx_id, %hash, "withdrawal confirmed");
        Ok(hash)
    }

    /// Process all matured exits for a root token; no proof assembly.
    pub async fn process_exits(
        &self,
        from: Address,
        root_token: Address,
    ) -> Result<TxHash, BridgeError> {
        let generation = self.signing_generation()?;
        let tx = generation
            .withdraw_manager
            .processExits(root_token)
            .into_transaction_request()
            .from(from);

        let hash = client::send_and_confirm(&generation.root, tx).await?;
        info!(%root_token, %hash, "processed exits");
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use config::ContractAddresses;

    // Well-known test key; holds nothing anywhere
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn offline_config() -> BridgeConfig {
        BridgeConfig {
            child_rpc_url: "http://localhost:8545".to_owned(),
            root_rpc_url: "http://localhost:8546".to_owned(),
            syncer_url: None,
            watcher_url: None,
            contracts: ContractAddresses {
                root_chain: address!("60E2B19b9a87a3f37827F2c8c8306be012bD1656"),
                withdraw_manager: address!("4ef2b60cDD4611Fa0BC815792ACC14De4C158D22"),
                deposit_manager: address!("4072fab2a132bf98207Cbfcd2C341aDb904a67e9"),
                wrapped_native_token: address!("31074c34a757a85Bd8CbC6d8C24Fa89A8480f1d9"),
            },
        }
    }

    #[test]
    fn test_construction_is_offline() {
        let client = BridgeClient::new(offline_config()).expect("Failed to build client");
        assert!(!client.generation().signing);
    }

    #[test]
    fn test_set_credential_flips_generation() {
        let client = BridgeClient::new(offline_config()).expect("Failed to build client");

        client
            .set_credential(TEST_KEY)
            .expect("Failed to set credential");

        assert!(client.generation().signing);
    }

    #[test]
    fn test_set_credential_rejects_garbage() {
        let client = BridgeClient::new(offline_config()).expect("Failed to build client");
        let result = client.set_credential("not a key");
        assert!(matches!(
            result,
            Err(BridgeError::Client(ClientError::InvalidPrivateKey(_)))
        ));
    }

    #[tokio::test]
    async fn test_state_change_requires_credential() {
        let client = BridgeClient::new(offline_config()).expect("Failed to build client");

        let result = client
            .deposit_ethers(Address::from([0x01; 20]), U256::from(1))
            .await;
        assert!(matches!(result, Err(BridgeError::MissingCredential)));

        let result = client
            .process_exits(Address::from([0x01; 20]), Address::from([0x02; 20]))
            .await;
        assert!(matches!(result, Err(BridgeError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_confirm_without_proof_services_is_unavailable() {
        let client = BridgeClient::new(offline_config()).expect("Failed to build client");
        client
            .set_credential(TEST_KEY)
            .expect("Failed to set credential");

        let result = client
            .confirm_withdrawal(
                Address::from([0x01; 20]),
                b256!("ba2808123d31caf13a7eee0a5bed1e5861ca7df1815c99ad617eba65df194e5f"),
            )
            .await;

        assert!(matches!(
            result,
            Err(BridgeError::Withdraw(WithdrawError::SourceUnavailable))
        ));
    }

    #[tokio::test]
    async fn test_primed_mapped_cache_skips_the_contract_call() {
        let client = BridgeClient::new(offline_config()).expect("Failed to build client");
        let root_token = Address::from([0x0a; 20]);
        let child_token = Address::from([0x0b; 20]);

        client
            .mapped
            .lock()
            .expect("mapped cache poisoned")
            .insert(root_token, child_token);

        // No RPC endpoint is listening; a cache miss would error out
        let mapped = client
            .mapped_token_address(root_token)
            .await
            .expect("Failed to resolve mapped address");
        assert_eq!(mapped, child_token);
    }
}
