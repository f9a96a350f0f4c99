//! Solidity ABI bindings for the wallet, the factory and the token collaborator.

use alloy_sol_types::sol;

sol! {
    /// Events emitted by a multisig wallet instance.
    interface IMagneth {
        /// An action was authorized and executed.
        event Execution(
            bytes32 indexed transactionId,
            address indexed destination,
            uint256 value,
            bytes data
        );

        /// Native value was deposited into the wallet.
        event Deposit(address indexed sender, uint256 value);
    }

    /// Events emitted by the wallet factory.
    interface IMagnethFactory {
        /// A new instance was created at a deterministic address.
        event Deployed(address indexed instance, address indexed deployer, bytes32 salt);
    }

    /// The subset of a fungible token consumed as a call destination.
    interface IToken {
        /// Moves `amount` tokens from the caller to `to`.
        function transfer(address to, uint256 amount) external returns (bool);

        /// Token balance of `owner`.
        function balanceOf(address owner) external view returns (uint256);
    }
}
