//! Contract ABI encoding for shielded token reads.

use alloy::primitives::utils::format_units as alloy_format_units;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::shielded::types::DecodeError;

sol! {
    /// Read surface of a privacy-preserving ERC-20 token.
    interface IShieldedToken {
        function balanceOf(address account) external view returns (uint256);
    }
}

/// Calldata for `balanceOf(account)`.
pub fn encode_balance_of(account: Address) -> Bytes {
    IShieldedToken::balanceOfCall { account }.abi_encode().into()
}

/// Decode the return data of any call against its signature.
pub fn decode_result<C: SolCall>(plaintext: &[u8]) -> Result<C::Return, DecodeError> {
    Ok(C::abi_decode_returns(plaintext)?)
}

/// Decode the return data of `balanceOf`.
pub fn decode_balance(plaintext: &[u8]) -> Result<U256, DecodeError> {
    decode_result::<IShieldedToken::balanceOfCall>(plaintext)
}

/// Render `value` scaled down by `decimals`, without trailing zeros.
pub fn format_units(value: U256, decimals: u8) -> Result<String, DecodeError> {
    let units =
        alloy_format_units(value, decimals).map_err(|e| DecodeError::Units(e.to_string()))?;
    if !units.contains('.') {
        return Ok(units);
    }
    Ok(units.trim_end_matches('0').trim_end_matches('.').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolValue;

    fn tokens(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_balance_of_selector() {
        let data = encode_balance_of(Address::repeat_byte(0x42));
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[16..36], Address::repeat_byte(0x42).as_slice());
    }

    #[test]
    fn test_decode_returns_encoded_value() {
        let value = tokens(1000);
        let encoded = value.abi_encode();
        assert_eq!(decode_balance(&encoded).unwrap(), value);
    }

    #[test]
    fn test_decode_shape_mismatch() {
        assert!(matches!(decode_balance(&[0u8; 5]), Err(DecodeError::Abi(_))));
        assert!(matches!(decode_balance(&[]), Err(DecodeError::Abi(_))));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(tokens(1000), 18).unwrap(), "1000");
        assert_eq!(format_units(U256::from(1_500_000u64), 6).unwrap(), "1.5");
        assert_eq!(format_units(U256::from(25u64), 2).unwrap(), "0.25");
        assert_eq!(format_units(U256::ZERO, 18).unwrap(), "0");
        assert_eq!(format_units(U256::from(42u64), 0).unwrap(), "42");
    }

    #[test]
    fn test_format_units_rejects_huge_decimals() {
        assert!(matches!(
            format_units(U256::from(1u64), 78),
            Err(DecodeError::Units(_))
        ));
    }
}
