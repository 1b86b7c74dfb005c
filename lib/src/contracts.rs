//! Solidity bindings for the contracts the dashboard reads and writes.
//!
//! Only call encoding is generated here; transport is handled by
//! [`ContractReader`](crate::reader::ContractReader) for reads and the
//! wallet for writes.

use alloy::sol;

sol! {
    /// ERC-1155 merch store
    interface ISwag1155 {
        function isAdmin(address account) external view returns (bool);
        function owner() external view returns (address);
        function listTokenIds() external view returns (uint256[] memory);
        function getVariant(uint256 tokenId) external view returns (uint256 price, uint256 maxSupply, uint256 minted, bool active);
        function uri(uint256 tokenId) external view returns (string memory);
        function usdc() external view returns (address);
        function treasury() external view returns (address);
        function getRedemptionStatus(uint256 tokenId, address owner) external view returns (uint8);

        function buy(uint256 tokenId, uint256 quantity) external;
        function setVariant(uint256 tokenId, uint256 price, uint256 maxSupply, bool active) external;
        function setVariantWithURI(uint256 tokenId, uint256 price, uint256 maxSupply, bool active, string uri) external;
        function redeem(uint256 tokenId) external;
        function markFulfilled(uint256 tokenId, address owner) external;
        function setUSDC(address usdc) external;
        function setTreasury(address treasury) external;
    }

    interface IFaucetManager {
        function isAdmin(address account) external view returns (bool);
        function isSuperAdmin(address account) external view returns (bool);
    }

    /// Identity registry (passport NFT)
    interface IZKPassportNFT {
        function owner() external view returns (address);
    }

    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, U256};
    use alloy::sol_types::SolCall;

    #[test]
    fn test_selectors() {
        assert_eq!(IERC20::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(IERC20::allowanceCall::SELECTOR, [0xdd, 0x62, 0xed, 0x3e]);
        assert_eq!(IERC20::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(IZKPassportNFT::ownerCall::SELECTOR, [0x8d, 0xa5, 0xcb, 0x5b]);
    }

    #[test]
    fn test_approve_encoding() {
        let spender = address!("0x1111111111111111111111111111111111111111");
        let call = IERC20::approveCall {
            spender,
            amount: U256::from(25_000_000u64),
        };
        let data = call.abi_encode();
        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[16..36], spender.as_slice());
        assert_eq!(U256::from_be_slice(&data[36..68]), U256::from(25_000_000u64));
    }
}
