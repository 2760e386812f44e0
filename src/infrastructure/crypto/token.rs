use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("token secret must not be empty")]
    EmptySecret,
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("failed to encode token")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// HS256 access tokens whose subject is the user id.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<Keys>,
    expires_secs: i64,
}

impl TokenCodec {
    pub fn new(secret: &str, expires_secs: i64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            expires_secs,
        })
    }

    pub fn expires_secs(&self) -> i64 {
        self.expires_secs
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(user_id, chrono::Utc::now().timestamp())
    }

    fn issue_at(&self, user_id: Uuid, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.expires_secs).max(0) as usize,
            iat: now.max(0) as usize,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.keys.encoding)
            .map_err(TokenError::Encode)
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.keys.decoding, &Validation::default())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}
