use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use serde_json::Value;
use sha2::Sha256;

/// The verified identity of a caller, as asserted by the identity provider.
///
/// The subject is the provider's stable id for the account, not ours. Local
/// user rows are materialized from these claims on first contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub subject: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: String,
    pub avatar_url: Option<String>,
}

impl IdentityClaims {
    /// Verifies a bearer token and extracts the identity claims.
    ///
    /// Returns `None` on any failure: bad signature, wrong issuer, a token
    /// from the future or past its expiry, or missing required claims.
    pub fn verify(secret: &str, issuer: &str, token: &str) -> Option<Self> {
        let key = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
        let token: Token<Header, Claims, _> = token.verify_with_key(&key).ok()?;

        let claims = token.claims();

        if claims.registered.issuer.as_deref()? != issuer {
            return None;
        }

        let iat = Utc
            .timestamp_opt(claims.registered.issued_at? as i64, 0)
            .single()?;
        if iat > Utc::now() {
            return None;
        }

        let nbf = claims
            .registered
            .not_before
            .and_then(|x| Utc.timestamp_opt(x as i64, 0).single());
        if let Some(nbf) = nbf {
            if nbf > Utc::now() {
                return None;
            }
        }

        let exp = claims
            .registered
            .expiration
            .and_then(|x| Utc.timestamp_opt(x as i64, 0).single());
        if let Some(exp) = exp {
            if exp < Utc::now() {
                return None;
            }
        }

        let subject = claims.registered.subject.clone()?;

        let private_str = |name: &str| -> Option<String> {
            match claims.private.get(name) {
                Some(Value::String(s)) => Some(s.clone()),
                _ => None,
            }
        };

        Some(Self {
            subject,
            username: private_str("preferred_username"),
            name: private_str("name"),
            email: private_str("email")?,
            avatar_url: private_str("picture"),
        })
    }

    /// Signs these claims into a token, valid for one hour.
    pub fn sign(&self, secret: &str, issuer: &str) -> Option<String> {
        let key = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;

        let now = Utc::now();
        let mut claims = Claims::new(RegisteredClaims {
            issuer: Some(issuer.to_string()),
            subject: Some(self.subject.clone()),
            issued_at: Some(now.timestamp() as u64),
            expiration: Some((now.timestamp() + 3600) as u64),
            not_before: None,
            audience: None,
            json_web_token_id: None,
        });

        if let Some(username) = &self.username {
            claims
                .private
                .insert("preferred_username".to_string(), Value::String(username.clone()));
        }
        if let Some(name) = &self.name {
            claims
                .private
                .insert("name".to_string(), Value::String(name.clone()));
        }
        claims
            .private
            .insert("email".to_string(), Value::String(self.email.clone()));
        if let Some(avatar_url) = &self.avatar_url {
            claims
                .private
                .insert("picture".to_string(), Value::String(avatar_url.clone()));
        }

        claims.sign_with_key(&key).ok()
    }

    /// The username to materialize a local account under: the provider's
    /// preferred username if present, otherwise the email local part.
    pub fn preferred_username(&self) -> &str {
        if let Some(username) = &self.username {
            return username;
        }

        self.email.split('@').next().unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> IdentityClaims {
        IdentityClaims {
            subject: "auth0|12345".to_string(),
            username: Some("alice".to_string()),
            name: Some("Alice Example".to_string()),
            email: "alice@example.com".to_string(),
            avatar_url: Some("https://cdn.example.com/alice.png".to_string()),
        }
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let claims = claims();
        let token = claims.sign("secret", "issuer").unwrap();

        let verified = IdentityClaims::verify("secret", "issuer", &token).unwrap();
        assert_eq!(verified, claims);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = claims().sign("secret", "issuer").unwrap();
        assert!(IdentityClaims::verify("other", "issuer", &token).is_none());
    }

    #[test]
    fn test_verify_rejects_wrong_issuer() {
        let token = claims().sign("secret", "issuer").unwrap();
        assert!(IdentityClaims::verify("secret", "someone-else", &token).is_none());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(IdentityClaims::verify("secret", "issuer", "not.a.token").is_none());
    }

    #[test]
    fn test_preferred_username_falls_back_to_email() {
        let mut claims = claims();
        assert_eq!(claims.preferred_username(), "alice");

        claims.username = None;
        assert_eq!(claims.preferred_username(), "alice");
    }
}
