//! Root-chain bridge contract bindings.
//!
//! Includes the three fixed protocol contracts deployed on the root chain:
//! - RootChain (deposit entry point, checkpoint anchor)
//! - WithdrawManager (proof verification and exit processing)
//! - DepositManager (root-to-child token mapping registry)

use alloy_sol_types::sol;

sol! {
    /// RootChain - entry point for moving assets onto the child chain.
    ///
    /// Deposits are acknowledged here; the actual child-chain credit happens
    /// out of band once the deposit is observed by the child network.
    #[sol(rpc)]
    interface IRootChain {
        /// Emitted for every accepted deposit
        event Deposit(
            address indexed user,
            address indexed token,
            uint256 amount,
            uint256 depositCount
        );

        /// Deposit fungible tokens for a user
        function deposit(
            address token,
            address user,
            uint256 amount
        ) external;

        /// Deposit a non-fungible token for a user
        function depositERC721(
            address token,
            address user,
            uint256 tokenId
        ) external;

        /// Deposit native currency; credited as the wrapped native token
        function depositEthers() external payable;
    }

    /// WithdrawManager - verifies checkpoint inclusion proofs and releases
    /// bridged assets back on the root chain.
    #[sol(rpc)]
    interface IWithdrawManager {
        /// Emitted when a burnt-token withdrawal is accepted
        event Withdraw(
            address indexed user,
            address indexed token,
            uint256 amount
        );

        /// Confirm a child-chain burn against a published checkpoint.
        ///
        /// `headerProof` is the flat concatenation of the checkpoint sibling
        /// hashes; `path` is the RLP-encoded trie key; the remaining byte
        /// fields are passed raw as returned by the proof services.
        function withdrawBurntTokens(
            uint256 headerNumber,
            bytes calldata headerProof,
            uint256 blockNumber,
            uint256 blockTime,
            bytes32 txRoot,
            bytes32 receiptRoot,
            bytes calldata path,
            bytes calldata txBytes,
            bytes calldata txProof,
            bytes calldata receiptBytes,
            bytes calldata receiptProof
        ) external;

        /// Process all matured exits for a root token
        function processExits(address _token) external;
    }

    /// DepositManager - registry mapping root-chain token addresses to their
    /// child-chain counterparts.
    #[sol(rpc)]
    interface IDepositManager {
        /// Look up the child-chain address mapped to a root token
        function tokens(address rootToken) external view returns (address childToken);
    }
}
