use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

/// Bearer tokens are valid for one hour from issuance.
pub const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub user: UserClaims,
}

/// Public-safe snapshot of the identity embedded in every token. Unknown
/// fields in older or newer tokens are ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserClaims {
    pub uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub address: String,
    pub phone_number: String,
    #[serde(default)]
    pub avatar: Option<Uuid>,
    #[serde(default)]
    pub is_marketing: bool,
}

impl From<&User> for UserClaims {
    fn from(user: &User) -> Self {
        UserClaims {
            uuid: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            address: user.address.clone(),
            phone_number: user.phone_number.clone(),
            avatar: user.avatar,
            is_marketing: user.is_marketing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    InvalidSignature,
    Malformed,
    Invalid,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::InvalidSignature => write!(f, "Token is invalid."),
            TokenError::Malformed => write!(f, "Malformed token"),
            TokenError::Invalid => write!(f, "Invalid token"),
        }
    }
}

/// Issues and verifies the signed bearer tokens. Holds the HS256 key
/// material for the lifetime of the process; constructed once at startup
/// from config and shared through application state.
pub struct TokenCodec {
    issuer: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    pub fn new(issuer: &str, secret: &[u8]) -> Self {
        TokenCodec {
            issuer: issuer.to_string(),
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a fresh token for `user`: iss = configured app URL, iat = now,
    /// exp = iat + 1 hour, with the claims snapshot under `user`.
    pub fn issue(&self, user: UserClaims) -> Result<String, String> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            iss: self.issuer.clone(),
            iat,
            exp: iat + TOKEN_TTL_SECS,
            user,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| format!("Token encode failed: {e}"))
    }

    /// Parse the claims without checking signature or expiry. Internal
    /// plumbing for the checks below; never a validity decision on its own.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Malformed)
    }

    /// The embedded identity snapshot, without a signature check.
    pub fn identity_claims(&self, token: &str) -> Result<UserClaims, TokenError> {
        self.decode_claims(token)
            .map(|claims| claims.user)
            .map_err(|_| TokenError::Invalid)
    }

    /// Whether the embedded expiry has passed. Anything unparseable counts
    /// as expired.
    pub fn is_expired(&self, token: &str) -> bool {
        match self.decode_claims(token) {
            Ok(claims) => claims.exp <= Utc::now().timestamp(),
            Err(_) => true,
        }
    }

    /// The authoritative check for protected requests: expiry first, then
    /// the signature, then the full claims are handed back.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        if self.is_expired(token) {
            return Err(TokenError::Expired);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("http://api.test", b"unit-test-secret-at-least-32-bytes!!")
    }

    fn sample_user() -> UserClaims {
        UserClaims {
            uuid: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            is_admin: false,
            address: "12 Analytical Row".to_string(),
            phone_number: "+15550001111".to_string(),
            avatar: None,
            is_marketing: true,
        }
    }

    fn encode_raw(codec: &TokenCodec, claims: &impl Serialize) -> String {
        encode(&Header::default(), claims, &codec.encoding).unwrap()
    }

    #[test]
    fn issue_then_validate_round_trips_claims() {
        let codec = codec();
        let user = sample_user();

        let token = codec.issue(user.clone()).unwrap();
        let claims = codec.validate(&token).unwrap();

        assert_eq!(claims.user, user);
        assert_eq!(claims.iss, "http://api.test");
        assert_eq!(claims.exp, claims.iat + TOKEN_TTL_SECS);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: "http://api.test".to_string(),
            iat: now - 2 * TOKEN_TTL_SECS,
            exp: now - TOKEN_TTL_SECS,
            user: sample_user(),
        };
        let token = encode_raw(&codec, &claims);

        assert!(codec.is_expired(&token));
        assert_eq!(codec.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn fresh_token_is_not_expired() {
        let codec = codec();
        let token = codec.issue(sample_user()).unwrap();
        assert!(!codec.is_expired(&token));
    }

    #[test]
    fn garbage_counts_as_expired() {
        assert!(codec().is_expired("definitely-not-a-token"));
    }

    #[test]
    fn wrong_key_fails_signature_check() {
        let signer = TokenCodec::new("http://api.test", b"one-secret-that-is-32-bytes-long!!!!");
        let verifier = TokenCodec::new("http://api.test", b"another-secret-that-is-32-bytes!!!!!");

        let token = signer.issue(sample_user()).unwrap();
        assert_eq!(verifier.validate(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn decode_claims_ignores_the_signature() {
        let signer = TokenCodec::new("http://api.test", b"one-secret-that-is-32-bytes-long!!!!");
        let other = TokenCodec::new("http://api.test", b"another-secret-that-is-32-bytes!!!!!");

        let user = sample_user();
        let token = signer.issue(user.clone()).unwrap();

        let claims = other.decode_claims(&token).unwrap();
        assert_eq!(claims.user, user);
    }

    #[test]
    fn identity_claims_returns_the_embedded_user() {
        let codec = codec();
        let user = sample_user();
        let token = codec.issue(user.clone()).unwrap();

        assert_eq!(codec.identity_claims(&token).unwrap(), user);
    }

    #[test]
    fn missing_user_claim_is_invalid() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let bare = serde_json::json!({
            "iss": "http://api.test",
            "iat": now,
            "exp": now + TOKEN_TTL_SECS,
        });
        let token = encode_raw(&codec, &bare);

        assert_eq!(codec.identity_claims(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn extra_claim_fields_are_tolerated() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let user = sample_user();
        let padded = serde_json::json!({
            "iss": "http://api.test",
            "iat": now,
            "exp": now + TOKEN_TTL_SECS,
            "user": {
                "uuid": user.uuid,
                "first_name": user.first_name,
                "last_name": user.last_name,
                "email": user.email,
                "is_admin": user.is_admin,
                "address": user.address,
                "phone_number": user.phone_number,
                "some_future_field": 42,
            },
            "jti": "ignored",
        });
        let token = encode_raw(&codec, &padded);

        let claims = codec.validate(&token).unwrap();
        assert_eq!(claims.user.uuid, user.uuid);
        assert!(!claims.user.is_marketing);
    }

    #[test]
    fn tampered_payload_fails_validation() {
        let codec = codec();
        let token = codec.issue(sample_user()).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        assert_eq!(parts.len(), 3);
        parts[2] = "A".repeat(parts[2].len());
        let forged = parts.join(".");

        assert!(codec.validate(&forged).is_err());
    }
}
