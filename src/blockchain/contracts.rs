// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract interfaces read and encoded by the service.
//!
//! Only the functions and events actually used are declared, which keeps the
//! event schemas strict: a log is interpreted against exactly one of these.

use alloy::sol;

sol! {
    /// Subset of ERC-20 used for the aUSDC position balance.
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
    }
}

sol! {
    /// Bluestake deposit contract.
    interface IDepositor {
        function deposit(address recipientAddr) external;

        event Deposited(address indexed recipientAddr, uint256 amount);
    }
}

sol! {
    /// Aave v3 pool (withdraw side).
    interface IPool {
        function withdraw(address asset, uint256 amount, address to) external returns (uint256);

        event Withdraw(
            address indexed reserve,
            address indexed user,
            address indexed to,
            uint256 amount
        );
    }
}
