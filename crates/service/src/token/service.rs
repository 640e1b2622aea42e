use std::sync::Arc;

use chrono::{Duration, Local};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::auth::domain::User;

use super::clock::{Clock, SystemClock};
use super::errors::TokenError;

/// Payload of a session token. Field names on the wire match what existing
/// clients read (`userid`, `nome`, `horaExpiracao`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User email.
    pub sub: String,
    /// Expiry, unix seconds.
    pub exp: i64,
    #[serde(rename = "userid")]
    pub user_id: Option<i64>,
    #[serde(rename = "nome")]
    pub name: String,
    /// Expiry as local `HH:mm`, for display only.
    #[serde(rename = "horaExpiracao")]
    pub expiration_time: String,
}

/// Issues and verifies HS512 session tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(signing_key: &str, ttl_minutes: u64, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if signing_key.trim().is_empty() {
            return Err(TokenError::Config("signing key must not be blank".into()));
        }
        let ttl = i64::try_from(ttl_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .ok_or_else(|| TokenError::Config(format!("expiration out of range: {ttl_minutes} minutes")))?;

        // expiry is checked against the injected clock, not by the decoder
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(signing_key.as_bytes()),
            decoding: DecodingKey::from_secret(signing_key.as_bytes()),
            validation,
            ttl,
            clock,
        })
    }

    /// Build from the `[jwt]` config section using the system clock.
    pub fn from_config(cfg: &configs::JwtConfig) -> Result<Self, TokenError> {
        let key = cfg
            .signing_key
            .as_deref()
            .ok_or_else(|| TokenError::Config("jwt.signing_key is not set".into()))?;
        let minutes = cfg
            .expiration
            .as_ref()
            .ok_or_else(|| TokenError::Config("jwt.expiration is not set".into()))?
            .as_minutes()
            .map_err(|e| TokenError::Config(e.to_string()))?;
        Self::new(key, minutes, Arc::new(SystemClock))
    }

    /// Sign a token for `user`, expiring `ttl` minutes from now.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::domain::User;
    /// use service::token::{SystemClock, TokenService};
    /// let tokens = TokenService::new("secret", 30, Arc::new(SystemClock)).unwrap();
    /// let user = User::new("Ana", "ana@email.com", "x").with_id(7);
    /// let token = tokens.issue_token(&user).unwrap();
    /// assert!(tokens.is_valid(&token).unwrap());
    /// assert_eq!(tokens.subject_of(&token).unwrap(), "ana@email.com");
    /// ```
    #[instrument(skip(self, user), fields(user_id = ?user.id))]
    pub fn issue_token(&self, user: &User) -> Result<String, TokenError> {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Encoding("expiration overflows the calendar".into()))?;
        let claims = Claims {
            sub: user.email.clone(),
            exp: expires_at.timestamp(),
            user_id: user.id,
            name: user.name.clone(),
            expiration_time: expires_at.with_timezone(&Local).format("%H:%M").to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;
        debug!(exp = claims.exp, "token_issued");
        Ok(token)
    }

    /// Verify the signature and decode the claims. A token whose `exp` lies
    /// before the clock's current second is `Expired`.
    pub fn parse_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            warn!(err = %e, "token_rejected");
            TokenError::InvalidSignature(e.to_string())
        })?;
        if self.clock.now().timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }

    /// `Ok(false)` for an expired token; tampered or malformed tokens are errors.
    pub fn is_valid(&self, token: &str) -> Result<bool, TokenError> {
        match self.parse_claims(token) {
            Ok(_) => Ok(true),
            Err(TokenError::Expired) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn subject_of(&self, token: &str) -> Result<String, TokenError> {
        self.parse_claims(token).map(|c| c.sub)
    }
}
