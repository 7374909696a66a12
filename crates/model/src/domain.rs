//! The typed data signing domain that scopes every order and cancellation
//! signature to one settlement contract deployment on one chain.

use hex::{FromHex, FromHexError};
use hex_literal::hex;
use lazy_static::lazy_static;
use primitive_types::H160;
use std::fmt;
use thiserror::Error;
use web3::{
    ethabi::{encode, Token},
    signing,
};

/// The settlement contract is deployed to the same address on every supported
/// chain.
pub const SETTLEMENT_CONTRACT: H160 = H160(hex!("9008D19f58AAbD9eD0D60971565AA8510560ab41"));

/// Returns the settlement contract address for a chain, or `None` if there is
/// no deployment on that chain.
pub fn settlement_contract_address(chain_id: u64) -> Option<H160> {
    // Mainnet, Goerli, Gnosis Chain, Arbitrum One, Sepolia.
    match chain_id {
        1 | 5 | 100 | 42161 | 11155111 => Some(SETTLEMENT_CONTRACT),
        _ => None,
    }
}

/// No settlement contract is deployed on the requested chain. Nothing can be
/// signed or submitted for such a chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("unsupported network (chain id {0}): settlement contract is not deployed")]
pub struct UnsupportedNetworkError(pub u64);

/// EIP-712 domain presented to the wallet when signing typed data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypedDataDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: H160,
}

/// Domain name and version announced by the settlement contract.
const DOMAIN_NAME: &str = "Gnosis Protocol";
const DOMAIN_VERSION: &str = "v2";

/// Resolves the typed data domain for a chain.
///
/// Fails with [`UnsupportedNetworkError`] when the settlement contract is not
/// deployed on the chain. Deterministic: the same chain id always yields the
/// same domain.
pub fn domain(chain_id: u64) -> Result<TypedDataDomain, UnsupportedNetworkError> {
    let verifying_contract =
        settlement_contract_address(chain_id).ok_or(UnsupportedNetworkError(chain_id))?;
    Ok(TypedDataDomain {
        name: DOMAIN_NAME.to_string(),
        version: DOMAIN_VERSION.to_string(),
        chain_id,
        verifying_contract,
    })
}

impl TypedDataDomain {
    /// Computes the EIP-712 domain separator hash for this domain.
    pub fn separator(&self) -> DomainSeparator {
        lazy_static! {
            static ref DOMAIN_TYPE_HASH: [u8; 32] = signing::keccak256(
                b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
            );
        }
        let abi_encoded = encode(&[
            Token::Uint((*DOMAIN_TYPE_HASH).into()),
            Token::Uint(signing::keccak256(self.name.as_bytes()).into()),
            Token::Uint(signing::keccak256(self.version.as_bytes()).into()),
            Token::Uint(self.chain_id.into()),
            Token::Address(self.verifying_contract),
        ]);
        DomainSeparator(signing::keccak256(abi_encoded.as_slice()))
    }
}

#[derive(Copy, Clone, Default, Eq, PartialEq)]
pub struct DomainSeparator(pub [u8; 32]);

impl std::str::FromStr for DomainSeparator {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(FromHex::from_hex(s)?))
    }
}

impl fmt::Debug for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hex = [0u8; 64];
        // Unwrap because we know the length is correct.
        hex::encode_to_slice(self.0, &mut hex).unwrap();
        // Unwrap because we know it is valid utf8.
        f.write_str(std::str::from_utf8(&hex).unwrap())
    }
}
