//! Signs claims as EdDSA JWTs with keys held in a [`KeyVault`].

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use claims_core::{Claim, ClaimSigner, KeyVault, SignedToken, SigningError};
use claims_crypto::{current_timestamp, KeyCategory, PublicKey};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Token payload: registered fields plus the claim body under `data`
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPayload<C> {
    pub jti: String,
    pub iat: i64,
    pub iss: String,
    pub sub: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: KeyCategory,
    pub data: C,
}

#[derive(Deserialize)]
struct IssuerOnly {
    iss: String,
}

pub struct KeyringSigner<K: KeyVault> {
    vault: Arc<K>,
}

impl<K: KeyVault> KeyringSigner<K> {
    pub fn new(vault: Arc<K>) -> Self {
        Self { vault }
    }
}

impl<K: KeyVault> ClaimSigner for KeyringSigner<K> {
    fn sign<C: Claim>(&self, claim: &C, issuer: &str) -> Result<SignedToken, SigningError> {
        let keypair = self
            .vault
            .get(issuer)?
            .ok_or_else(|| SigningError::MissingKey(issuer.to_string()))?;

        let issuer = keypair.public_key().to_string();
        let payload = TokenPayload {
            jti: Uuid::new_v4().to_string(),
            iat: current_timestamp(),
            iss: issuer.clone(),
            sub: claim.subject().to_string(),
            name: claim.name().to_string(),
            kind: claim.kind(),
            data: claim,
        };

        let pkcs8_der = keypair.to_pkcs8_der();
        let encoding_key = EncodingKey::from_ed_der(&pkcs8_der);
        let token = encode(&Header::new(Algorithm::EdDSA), &payload, &encoding_key)?;

        debug!(kind = %claim.kind(), name = claim.name(), issuer = %issuer, "Signed claim");
        Ok(SignedToken {
            token,
            issuer,
            issued_at: payload.iat,
            id: payload.jti,
        })
    }
}

/// Claims carry their own validity window, so `exp` is not required here
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_required_spec_claims(&["iss", "sub"]);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation
}

/// Verify a token against the key named by its `iss` and decode its payload
pub fn decode_claim<C: DeserializeOwned>(token: &str) -> Result<TokenPayload<C>, SigningError> {
    // Read iss before the signature can be checked
    let mut unverified = validation();
    unverified.insecure_disable_signature_validation();
    let issuer = decode::<IssuerOnly>(token, &DecodingKey::from_secret(&[]), &unverified)?
        .claims
        .iss;

    let public_key = PublicKey::parse(&issuer)?;
    let decoding_key =
        DecodingKey::from_ed_components(&URL_SAFE_NO_PAD.encode(public_key.as_bytes()))?;

    let mut validation = validation();
    validation.set_issuer(&[issuer.as_str()]);
    Ok(decode::<TokenPayload<C>>(token, &decoding_key, &validation)?.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKeyVault;
    use claims_core::AccountClaims;
    use claims_crypto::KeyPair;

    #[test]
    fn test_sign_and_decode() {
        let vault = Arc::new(MemoryKeyVault::new());
        let operator = KeyPair::generate(KeyCategory::Operator).unwrap();
        let operator_public = operator.public_key().to_string();
        vault.store(&operator).unwrap();

        let mut claim = AccountClaims::new("A", "AKEY");
        claim.tags.insert("prod".to_string());
        let signer = KeyringSigner::new(vault);
        let signed = signer.sign(&claim, &operator_public).unwrap();
        assert_eq!(signed.issuer, operator_public);

        let payload: TokenPayload<AccountClaims> = decode_claim(&signed.token).unwrap();
        assert_eq!(payload.iss, operator_public);
        assert_eq!(payload.sub, "AKEY");
        assert_eq!(payload.kind, KeyCategory::Account);
        assert_eq!(payload.jti, signed.id);
        assert!(payload.data.tags.contains("prod"));
    }

    #[test]
    fn test_missing_key() {
        let signer = KeyringSigner::new(Arc::new(MemoryKeyVault::new()));
        let claim = AccountClaims::new("A", "AKEY");
        assert!(matches!(
            signer.sign(&claim, "OUNKNOWN"),
            Err(SigningError::MissingKey(key)) if key == "OUNKNOWN"
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let vault = Arc::new(MemoryKeyVault::new());
        let operator = KeyPair::generate(KeyCategory::Operator).unwrap();
        vault.store(&operator).unwrap();
        let signer = KeyringSigner::new(vault);
        let signed = signer
            .sign(
                &AccountClaims::new("A", "AKEY"),
                &operator.public_key().to_string(),
            )
            .unwrap();

        let other = signer
            .sign(
                &AccountClaims::new("B", "BKEY"),
                &operator.public_key().to_string(),
            )
            .unwrap();
        let mut parts: Vec<&str> = signed.token.split('.').collect();
        parts[1] = other.token.split('.').nth(1).unwrap();
        let forged = parts.join(".");

        assert!(matches!(
            decode_claim::<AccountClaims>(&forged),
            Err(SigningError::Token(_))
        ));
    }

    #[test]
    fn test_header_is_eddsa_jwt() {
        let vault = Arc::new(MemoryKeyVault::new());
        let operator = KeyPair::generate(KeyCategory::Operator).unwrap();
        vault.store(&operator).unwrap();
        let signed = KeyringSigner::new(vault)
            .sign(
                &AccountClaims::new("A", "AKEY"),
                &operator.public_key().to_string(),
            )
            .unwrap();

        let header = jsonwebtoken::decode_header(&signed.token).unwrap();
        assert_eq!(header.alg, Algorithm::EdDSA);
        assert_eq!(header.typ.as_deref(), Some("JWT"));
    }

    #[test]
    fn test_issuer_must_match_signing_key() {
        let operator = KeyPair::generate(KeyCategory::Operator).unwrap();
        let impostor = KeyPair::generate(KeyCategory::Operator).unwrap();
        let claim = AccountClaims::new("A", "AKEY");
        let payload = TokenPayload {
            jti: "1".to_string(),
            iat: 0,
            iss: operator.public_key().to_string(),
            sub: "AKEY".to_string(),
            name: "A".to_string(),
            kind: KeyCategory::Account,
            data: &claim,
        };

        let der = impostor.to_pkcs8_der();
        let token = encode(
            &Header::new(Algorithm::EdDSA),
            &payload,
            &EncodingKey::from_ed_der(&der),
        )
        .unwrap();

        assert!(decode_claim::<AccountClaims>(&token).is_err());
    }

    #[test]
    fn test_unknown_issuer_text_rejected() {
        let impostor = KeyPair::generate(KeyCategory::Operator).unwrap();
        let claim = AccountClaims::new("A", "AKEY");
        let payload = TokenPayload {
            jti: "1".to_string(),
            iat: 0,
            iss: "not-a-key".to_string(),
            sub: "AKEY".to_string(),
            name: "A".to_string(),
            kind: KeyCategory::Account,
            data: &claim,
        };
        let der = impostor.to_pkcs8_der();
        let token = encode(
            &Header::new(Algorithm::EdDSA),
            &payload,
            &EncodingKey::from_ed_der(&der),
        )
        .unwrap();

        assert!(matches!(
            decode_claim::<AccountClaims>(&token),
            Err(SigningError::Crypto(_))
        ));
    }
}
