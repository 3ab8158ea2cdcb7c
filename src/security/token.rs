//! Capability tokens - signed caller identity.
//!
//! A token binds a calling application's id, resource URI and security
//! origin under an HMAC-SHA256 signature keyed with a secret that exists
//! only in this process. Presenting the token on every bridge request lets
//! the dispatcher learn "who is asking" without a session lookup.
//!
//! # Security Model
//!
//! - The secret is 32 random bytes drawn when the [`TokenAuthority`] is
//!   created and zeroized when it is dropped. It is never persisted, so
//!   tokens do not survive a restart.
//! - The payload is only parsed after the signature matches; a payload
//!   that fails verification is never read.
//! - Signatures are compared in constant time.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

const SECRET_LEN: usize = 32;

/// Why a token was rejected.
///
/// Never shown to the caller; the dispatcher reports every variant as an
/// unknown method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthenticationFailure {
    #[error("signature does not match payload")]
    SignatureMismatch,

    #[error("payload is not a valid identity")]
    MalformedPayload,
}

/// The identity a token asserts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenClaims {
    /// Application id assigned by the application manager.
    pub app_id: u32,
    /// Resource URI of the application's document.
    pub uri: String,
    /// Security origin of the application's document.
    pub origin: String,
}

/// Wire form of a capability token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityToken {
    /// Canonical JSON serialization of [`TokenClaims`].
    pub payload: String,
    /// Base64 HMAC-SHA256 of `payload`.
    pub signature: String,
}

/// Mints and verifies tokens with a per-process secret.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct TokenAuthority {
    secret: [u8; SECRET_LEN],
}

impl TokenAuthority {
    /// Create an authority with a fresh random secret.
    pub fn new() -> Self {
        let mut secret = [0u8; SECRET_LEN];
        rand::thread_rng().fill(&mut secret[..]);
        Self { secret }
    }

    /// Mint a token for the given identity. Always succeeds.
    pub fn mint(&self, app_id: u32, uri: &str, origin: &str) -> CapabilityToken {
        let claims = TokenClaims {
            app_id,
            uri: uri.to_string(),
            origin: origin.to_string(),
        };
        // A struct of an integer and two strings always serializes.
        let payload = serde_json::to_string(&claims).unwrap_or_default();
        let signature = self.sign(&payload);
        crate::metrics::record_token_minted();
        CapabilityToken { payload, signature }
    }

    /// Verify a token and return the identity it carries.
    pub fn verify(&self, token: &CapabilityToken) -> Result<TokenClaims, AuthenticationFailure> {
        let expected = self.sign(&token.payload);
        let matches: bool = expected
            .as_bytes()
            .ct_eq(token.signature.as_bytes())
            .into();
        if !matches {
            return Err(AuthenticationFailure::SignatureMismatch);
        }
        serde_json::from_str(&token.payload).map_err(|_| AuthenticationFailure::MalformedPayload)
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

impl Default for TokenAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "http://apps.example.tv/red-button/index.html";
    const ORIGIN: &str = "http://apps.example.tv";

    #[test]
    fn test_mint_then_verify_returns_identity() {
        let authority = TokenAuthority::new();
        let token = authority.mint(42, URI, ORIGIN);
        let claims = authority.verify(&token).unwrap();
        assert_eq!(claims.app_id, 42);
        assert_eq!(claims.uri, URI);
        assert_eq!(claims.origin, ORIGIN);
    }

    #[test]
    fn test_payload_is_canonical_json() {
        let authority = TokenAuthority::new();
        let token = authority.mint(7, "u", "o");
        assert_eq!(token.payload, r#"{"appId":7,"uri":"u","origin":"o"}"#);
    }

    #[test]
    fn test_identities_with_separator_characters_stay_distinct() {
        let authority = TokenAuthority::new();
        let a = authority.mint(1, "http://a/?x=\",\"origin\":\"evil", "o");
        let claims = authority.verify(&a).unwrap();
        assert_eq!(claims.origin, "o");
    }

    #[test]
    fn test_any_flipped_signature_byte_fails() {
        let authority = TokenAuthority::new();
        let token = authority.mint(1, URI, ORIGIN);
        for i in 0..token.signature.len() {
            let mut bytes = token.signature.clone().into_bytes();
            bytes[i] ^= 0x01;
            let forged = CapabilityToken {
                payload: token.payload.clone(),
                signature: String::from_utf8_lossy(&bytes).into_owned(),
            };
            assert_eq!(
                authority.verify(&forged),
                Err(AuthenticationFailure::SignatureMismatch),
                "signature byte {i}"
            );
        }
    }

    #[test]
    fn test_any_flipped_payload_byte_fails() {
        let authority = TokenAuthority::new();
        let token = authority.mint(1, URI, ORIGIN);
        for i in 0..token.payload.len() {
            let mut bytes = token.payload.clone().into_bytes();
            bytes[i] ^= 0x01;
            let forged = CapabilityToken {
                payload: String::from_utf8_lossy(&bytes).into_owned(),
                signature: token.signature.clone(),
            };
            assert!(authority.verify(&forged).is_err(), "payload byte {i}");
        }
    }

    #[test]
    fn test_token_from_other_authority_fails() {
        let first = TokenAuthority::new();
        let second = TokenAuthority::new();
        let token = first.mint(1, URI, ORIGIN);
        assert_eq!(
            second.verify(&token),
            Err(AuthenticationFailure::SignatureMismatch)
        );
    }

    #[test]
    fn test_signed_garbage_is_malformed() {
        let authority = TokenAuthority::new();
        let payload = r#"{"appId":"one"}"#.to_string();
        let token = CapabilityToken {
            signature: authority.sign(&payload),
            payload,
        };
        assert_eq!(
            authority.verify(&token),
            Err(AuthenticationFailure::MalformedPayload)
        );
    }

    #[test]
    fn test_token_wire_form() {
        let authority = TokenAuthority::new();
        let token = authority.mint(3, "u", "o");
        let json = serde_json::to_value(&token).unwrap();
        assert!(json.get("payload").unwrap().is_string());
        assert!(json.get("signature").unwrap().is_string());

        let back: CapabilityToken = serde_json::from_value(json).unwrap();
        assert!(authority.verify(&back).is_ok());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use proptest::sample::Index;

        proptest! {
            /// Any identity, quotes and separators included, survives mint → verify.
            #[test]
            fn identity_roundtrip(app_id in any::<u32>(), uri in "\\PC{0,60}", origin in "\\PC{0,30}") {
                let authority = TokenAuthority::new();
                let token = authority.mint(app_id, &uri, &origin);
                let claims = authority.verify(&token).unwrap();
                prop_assert_eq!(claims, TokenClaims { app_id, uri, origin });
            }

            /// Flipping any one bit of the payload or signature is rejected.
            #[test]
            fn tampering_is_rejected(
                app_id in any::<u32>(),
                uri in "[ -~]{0,60}",
                at in any::<Index>(),
                bit in 0u8..7,
                in_signature in any::<bool>(),
            ) {
                let authority = TokenAuthority::new();
                let mut token = authority.mint(app_id, &uri, ORIGIN);
                let field = if in_signature { &mut token.signature } else { &mut token.payload };
                let mut bytes = std::mem::take(field).into_bytes();
                let i = at.index(bytes.len());
                bytes[i] ^= 1 << bit;
                *field = String::from_utf8(bytes).unwrap();
                prop_assert!(authority.verify(&token).is_err());
            }
        }
    }
}
