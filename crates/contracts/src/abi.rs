//! Solidity ABI of the token and crowdsale contracts.
//!
//! Event layouts match the deployed contracts so that logs fetched from a
//! node decode with the same types the in-process models emit.
#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    #![sol(all_derives)]

    /// ERC-20 token movement.
    event Transfer(address indexed from, address indexed to, uint256 value);

    /// ERC-20 allowance change.
    event Approval(address indexed owner, address indexed spender, uint256 value);

    /// Unsold supply destroyed at the end of a successful sale.
    event Burned(uint256 amount);

    /// Payment into (`isContribution`) or refund out of the crowdsale.
    event FundTransfer(address backer, uint256 amount, bool isContribution, uint256 amountRaised);

    /// The funding goal was met when the sale closed.
    event GoalReached(address beneficiary, uint256 amountRaised);

    function amountRaised() external view returns (uint256);
    function tokensSold() external view returns (uint256);
    function totalSupply() external view returns (uint256);
    function balanceOf(address owner) external view returns (uint256);
    function allowance(address owner, address spender) external view returns (uint256);
    function burned() external view returns (bool);
    function startTime() external view returns (uint256);
    function getPrice() external view returns (uint256);
    function fundingGoalReached() external view returns (bool);
    function crowdsaleClosed() external view returns (bool);
}
