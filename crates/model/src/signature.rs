use crate::{bytes_hex, domain::DomainSeparator};
use anyhow::{ensure, Context as _, Result};
use primitive_types::{H160, H256};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Formatter};
use web3::{
    signing::{self, Key, SecretKeyRef},
    types::Recovery,
};

/// See [`Signature`].
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SigningScheme {
    #[default]
    Eip712,
    EthSign,
    Eip1271,
    PreSign,
}

impl SigningScheme {
    /// Numeric encoding of the scheme as understood by the settlement
    /// contract.
    pub fn contract_value(&self) -> u8 {
        match self {
            Self::Eip712 => 0,
            Self::EthSign => 1,
            Self::Eip1271 => 2,
            Self::PreSign => 3,
        }
    }

    pub fn try_to_ecdsa_scheme(&self) -> Option<EcdsaSigningScheme> {
        match self {
            Self::Eip712 => Some(EcdsaSigningScheme::Eip712),
            Self::EthSign => Some(EcdsaSigningScheme::EthSign),
            Self::Eip1271 | Self::PreSign => None,
        }
    }
}

/// Signature over the EIP-712 hash of an order or a cancellation.
#[derive(Eq, PartialEq, Clone, Deserialize, Serialize, Hash)]
#[serde(into = "JsonSignature", try_from = "JsonSignature")]
pub enum Signature {
    /// The payload struct is signed according to EIP-712.
    ///
    /// https://eips.ethereum.org/EIPS/eip-712
    Eip712(EcdsaSignature),
    /// The payload hash is signed according to EIP-191's personal_sign
    /// signature format.
    ///
    /// https://eips.ethereum.org/EIPS/eip-191
    EthSign(EcdsaSignature),
    /// Signature verified according to EIP-1271: the payload hash together
    /// with these bytes is passed to a verification method on the owning
    /// contract. This is how smart contract wallets sign orders.
    ///
    /// https://eips.ethereum.org/EIPS/eip-1271
    Eip1271(Vec<u8>),
    /// No off-chain signature exists yet. The owner address stands in for the
    /// signature value and a separate on-chain transaction has to mark the
    /// order as presigned before it becomes valid.
    PreSign(H160),
}

impl Default for Signature {
    fn default() -> Self {
        Self::default_with(SigningScheme::default())
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let scheme = format!("{:?}", self.scheme());
        let bytes = format!("0x{}", hex::encode(self.to_bytes()));
        f.debug_tuple(&scheme).field(&bytes).finish()
    }
}

impl Signature {
    pub fn default_with(scheme: SigningScheme) -> Self {
        match scheme {
            SigningScheme::Eip712 => Signature::Eip712(Default::default()),
            SigningScheme::EthSign => Signature::EthSign(Default::default()),
            SigningScheme::Eip1271 => Signature::Eip1271(Default::default()),
            SigningScheme::PreSign => Signature::PreSign(H160::zero()),
        }
    }

    /// Recovers the owner of the specified signature over the given payload
    /// struct hash.
    ///
    /// Returns an error if there is an issue recovering an ECDSA signature,
    /// or `None` for on-chain schemes that don't support owner recovery.
    pub fn recover(
        &self,
        domain: &DomainSeparator,
        struct_hash: &[u8; 32],
    ) -> Result<Option<H160>> {
        match self {
            Self::Eip712(signature) => signature
                .recover(EcdsaSigningScheme::Eip712, domain, struct_hash)
                .map(Some),
            Self::EthSign(signature) => signature
                .recover(EcdsaSigningScheme::EthSign, domain, struct_hash)
                .map(Some),
            Self::Eip1271(_) | Self::PreSign(_) => Ok(None),
        }
    }

    pub fn from_bytes(scheme: SigningScheme, bytes: &[u8]) -> Result<Self> {
        Ok(match scheme {
            scheme @ (SigningScheme::Eip712 | SigningScheme::EthSign) => {
                let bytes: [u8; 65] = bytes
                    .try_into()
                    .context("ECDSA signature must be 65 bytes long")?;
                EcdsaSignature::from_bytes(&bytes).to_signature(
                    scheme
                        .try_to_ecdsa_scheme()
                        .expect("scheme is an ecdsa scheme"),
                )
            }
            SigningScheme::Eip1271 => Self::Eip1271(bytes.to_vec()),
            SigningScheme::PreSign => {
                ensure!(
                    bytes.len() == 20,
                    "presign signature value must be the 20 byte owner address",
                );
                Self::PreSign(H160::from_slice(bytes))
            }
        })
    }

    #[allow(clippy::wrong_self_convention)]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Eip712(signature) | Self::EthSign(signature) => signature.to_bytes().to_vec(),
            Self::Eip1271(signature) => signature.clone(),
            Self::PreSign(owner) => owner.as_bytes().to_vec(),
        }
    }

    pub fn scheme(&self) -> SigningScheme {
        match self {
            Signature::Eip712(_) => SigningScheme::Eip712,
            Signature::EthSign(_) => SigningScheme::EthSign,
            Signature::Eip1271(_) => SigningScheme::Eip1271,
            Signature::PreSign(_) => SigningScheme::PreSign,
        }
    }
}

/// An internal type used for deriving `serde` implementations for the
/// `Signature` type.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSignature {
    signing_scheme: SigningScheme,
    #[serde(with = "bytes_hex")]
    signature: Vec<u8>,
}

impl From<Signature> for JsonSignature {
    fn from(signature: Signature) -> Self {
        Self {
            signing_scheme: signature.scheme(),
            signature: signature.to_bytes(),
        }
    }
}

impl TryFrom<JsonSignature> for Signature {
    type Error = anyhow::Error;

    fn try_from(json: JsonSignature) -> Result<Self, Self::Error> {
        Self::from_bytes(json.signing_scheme, &json.signature)
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EcdsaSigningScheme {
    Eip712,
    EthSign,
}

impl From<EcdsaSigningScheme> for SigningScheme {
    fn from(scheme: EcdsaSigningScheme) -> Self {
        match scheme {
            EcdsaSigningScheme::Eip712 => Self::Eip712,
            EcdsaSigningScheme::EthSign => Self::EthSign,
        }
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Hash)]
pub struct EcdsaSignature {
    pub r: H256,
    pub s: H256,
    pub v: u8,
}

/// Returns the hash of the message that gets signed for the payload with the
/// given struct hash, as defined by EIP-712.
///
/// https://eips.ethereum.org/EIPS/eip-712#specification
pub fn hashed_eip712_message(domain: &DomainSeparator, struct_hash: &[u8; 32]) -> [u8; 32] {
    let mut message = [0u8; 66];
    message[0..2].copy_from_slice(&[0x19, 0x01]);
    message[2..34].copy_from_slice(&domain.0);
    message[34..66].copy_from_slice(struct_hash);
    signing::keccak256(&message)
}

/// Returns the message used for signing and recovery for the specified
/// payload.
///
/// The signing message depends on the signature scheme that was used.
fn signing_message(
    scheme: EcdsaSigningScheme,
    domain: &DomainSeparator,
    struct_hash: &[u8; 32],
) -> [u8; 32] {
    let hash = hashed_eip712_message(domain, struct_hash);
    match scheme {
        EcdsaSigningScheme::Eip712 => hash,
        EcdsaSigningScheme::EthSign => {
            let mut buffer = [0u8; 60];
            buffer[..28].copy_from_slice(b"\x19Ethereum Signed Message:\n32");
            buffer[28..].copy_from_slice(&hash);
            signing::keccak256(&buffer)
        }
    }
}

impl EcdsaSignature {
    pub fn to_signature(self, scheme: EcdsaSigningScheme) -> Signature {
        match scheme {
            EcdsaSigningScheme::Eip712 => Signature::Eip712(self),
            EcdsaSigningScheme::EthSign => Signature::EthSign(self),
        }
    }

    /// r + s + v
    pub fn to_bytes(self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(self.r.as_bytes());
        bytes[32..64].copy_from_slice(self.s.as_bytes());
        bytes[64] = self.v;
        bytes
    }

    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        EcdsaSignature {
            r: H256::from_slice(&bytes[..32]),
            s: H256::from_slice(&bytes[32..64]),
            v: bytes[64],
        }
    }

    pub fn recover(
        &self,
        scheme: EcdsaSigningScheme,
        domain: &DomainSeparator,
        struct_hash: &[u8; 32],
    ) -> Result<H160> {
        let message = signing_message(scheme, domain, struct_hash);
        let recovery = Recovery::new(message, self.v as u64, self.r, self.s);
        let (signature, recovery_id) = recovery
            .as_signature()
            .context("unexpectedly invalid signature")?;
        Ok(signing::recover(&message, &signature, recovery_id)?)
    }

    pub fn sign(
        scheme: EcdsaSigningScheme,
        domain: &DomainSeparator,
        struct_hash: &[u8; 32],
        key: SecretKeyRef,
    ) -> Self {
        let message = signing_message(scheme, domain, struct_hash);
        // Unwrap because the only error is for invalid messages which we don't
        // create.
        let signature = key.sign(&message, None).unwrap();
        Self {
            v: signature.v as u8,
            r: signature.r,
            s: signature.s,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn onchain_schemes_cannot_recover_owners() {
        for signature in [
            Signature::PreSign(H160::zero()),
            Signature::Eip1271(Default::default()),
        ] {
            assert_eq!(
                signature
                    .recover(&Default::default(), &Default::default())
                    .unwrap(),
                None
            );
        }
    }

    #[test]
    fn onchain_schemes_fail_to_convert_to_ecdsa_scheme() {
        for scheme in [SigningScheme::PreSign, SigningScheme::Eip1271] {
            assert!(scheme.try_to_ecdsa_scheme().is_none());
        }
    }

    #[test]
    fn contract_values() {
        assert_eq!(SigningScheme::Eip712.contract_value(), 0);
        assert_eq!(SigningScheme::EthSign.contract_value(), 1);
        assert_eq!(SigningScheme::Eip1271.contract_value(), 2);
        assert_eq!(SigningScheme::PreSign.contract_value(), 3);
    }

    #[test]
    fn signature_from_bytes() {
        assert!(Signature::from_bytes(SigningScheme::Eip712, &[0u8; 20]).is_err());
        assert!(Signature::from_bytes(SigningScheme::EthSign, &[0u8; 20]).is_err());
        assert!(Signature::from_bytes(SigningScheme::PreSign, &[0u8; 32]).is_err());
        assert!(Signature::from_bytes(SigningScheme::PreSign, &[]).is_err());

        assert_eq!(
            Signature::from_bytes(SigningScheme::Eip712, &[0u8; 65]).unwrap(),
            Signature::default_with(SigningScheme::Eip712)
        );
        assert_eq!(
            Signature::from_bytes(SigningScheme::EthSign, &[0u8; 65]).unwrap(),
            Signature::default_with(SigningScheme::EthSign)
        );
        assert_eq!(
            Signature::from_bytes(SigningScheme::PreSign, &[0x0f; 20]).unwrap(),
            Signature::PreSign(H160([0x0f; 20]))
        );
        assert_eq!(
            Signature::from_bytes(SigningScheme::Eip1271, &[]).unwrap(),
            Signature::default_with(SigningScheme::Eip1271)
        );
        assert_eq!(
            Signature::from_bytes(SigningScheme::Eip1271, &[1, 2, 3]).unwrap(),
            Signature::Eip1271(vec![1, 2, 3]),
        );
    }

    #[test]
    fn signature_to_bytes() {
        assert_eq!(
            Signature::default_with(SigningScheme::Eip712).to_bytes(),
            [0u8; 65].to_vec()
        );
        assert_eq!(
            Signature::PreSign(H160([0x42; 20])).to_bytes(),
            [0x42; 20].to_vec()
        );
        assert_eq!(Signature::Eip1271(vec![1, 2, 3]).to_bytes(), vec![1, 2, 3]);
    }

    #[test]
    fn deserialize_and_back() {
        for (signature, json) in [
            (
                Signature::Eip712(Default::default()),
                json!({
                    "signingScheme": "eip712",
                    "signature": "\
                        0000000000000000000000000000000000000000000000000000000000000000\
                        0000000000000000000000000000000000000000000000000000000000000000\
                        00",
                }),
            ),
            (
                Signature::EthSign(EcdsaSignature {
                    r: H256([1; 32]),
                    s: H256([2; 32]),
                    v: 3,
                }),
                json!({
                    "signingScheme": "ethsign",
                    "signature": "\
                        0101010101010101010101010101010101010101010101010101010101010101\
                        0202020202020202020202020202020202020202020202020202020202020202\
                        03",
                }),
            ),
            (
                Signature::Eip1271(vec![1, 2, 3]),
                json!({
                    "signingScheme": "eip1271",
                    "signature": "010203",
                }),
            ),
            (
                Signature::PreSign(H160([0x0f; 20])),
                json!({
                    "signingScheme": "presign",
                    "signature": "0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f",
                }),
            ),
        ] {
            assert_eq!(signature, serde_json::from_value(json.clone()).unwrap());
            assert_eq!(json, json!(signature));
        }
    }

    #[test]
    fn deserializes_prefixed_signatures() {
        let signature: Signature = serde_json::from_value(json!({
            "signingScheme": "presign",
            "signature": "0x0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f",
        }))
        .unwrap();
        assert_eq!(signature, Signature::PreSign(H160([0x0f; 20])));
    }

    #[test]
    fn ecdsa_sign_and_recover_round_trip() {
        let key = secp256k1::SecretKey::from_slice(&{
            let mut bytes = [0u8; 32];
            bytes[31] = 1;
            bytes
        })
        .unwrap();
        // The address belonging to the secret key 0x...01.
        let expected_owner = H160(hex_literal::hex!(
            "7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        ));
        let domain = DomainSeparator([0x2a; 32]);
        let struct_hash = [0x42u8; 32];

        for scheme in [EcdsaSigningScheme::Eip712, EcdsaSigningScheme::EthSign] {
            let signature =
                EcdsaSignature::sign(scheme, &domain, &struct_hash, SecretKeyRef::new(&key));
            let owner = signature.recover(scheme, &domain, &struct_hash).unwrap();
            assert_eq!(owner, expected_owner);
        }
    }

    #[test]
    fn deserialization_errors() {
        for json in [
            json!({
                "signingScheme": "eip712",
                "signature": "0102",
            }),
            json!({
                "signingScheme": "ethsign",
                "signature": 1234,
            }),
            json!({
                "signingScheme": "eip1271",
            }),
            json!({
                "signingScheme": "presign",
                "signature": "01",
            }),
        ] {
            assert!(serde_json::from_value::<Signature>(json).is_err());
        }
    }
}
