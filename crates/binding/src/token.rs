//! Token contract bindings.
//!
//! The child-token interfaces extend the standard token surface with a
//! `withdraw` burn used to start an exit. The same ABIs serve for root-side
//! tokens, where only the standard subset is called.

use alloy_sol_types::sol;

sol! {
    /// Fungible child token interface
    #[sol(rpc)]
    interface IChildERC20 {
        /// Emitted when tokens are transferred
        event Transfer(
            address indexed from,
            address indexed to,
            uint256 value
        );

        /// Emitted when an allowance is set
        event Approval(
            address indexed owner,
            address indexed spender,
            uint256 value
        );

        /// Get token balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Get allowance granted by owner to spender
        function allowance(address owner, address spender) external view returns (uint256);

        /// Approve spender to spend tokens
        function approve(address spender, uint256 amount) external returns (bool);

        /// Transfer tokens to recipient
        function transfer(address recipient, uint256 amount) external returns (bool);

        /// Transfer tokens from sender to recipient (requires allowance)
        function transferFrom(address sender, address recipient, uint256 amount) external returns (bool);

        /// Burn tokens on the child chain to start a withdrawal
        function withdraw(uint256 amount) external payable;
    }

    /// Non-fungible child token interface
    #[sol(rpc)]
    interface IChildERC721 {
        /// Get the number of tokens held by an owner
        function balanceOf(address owner) external view returns (uint256);

        /// Get the owner of a token
        function ownerOf(uint256 tokenId) external view returns (address);

        /// Approve an operator for a single token
        function approve(address to, uint256 tokenId) external;

        /// Transfer a token between accounts
        function transferFrom(address from, address to, uint256 tokenId) external;

        /// Transfer a token, rejecting recipients that cannot receive it
        function safeTransferFrom(address from, address to, uint256 tokenId) external;

        /// Enumerate an owner's tokens by index
        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);

        /// Burn a token on the child chain to start a withdrawal
        function withdraw(uint256 tokenId) external payable;
    }
}
