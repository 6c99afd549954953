//! API-key resolution from explicit values or the process environment.

use std::env;

use crate::TransportError;

/// Environment variables recognized for API keys, in precedence order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOSSAMER_API_KEY", "GENAI_API_KEY"];

#[derive(PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

pub trait CredentialsProvider: Send + Sync {
    fn resolve(&self) -> Result<SecretString, TransportError>;
}

/// Resolves an API key from an explicit value, or failing that from the
/// first set variable in [`API_KEY_ENV_VARS`].
#[derive(Debug, Default)]
pub struct ApiKeyCredentials {
    explicit: Option<String>,
}

impl ApiKeyCredentials {
    pub fn explicit(api_key: impl Into<String>) -> Self {
        Self {
            explicit: Some(api_key.into()),
        }
    }

    pub fn from_env() -> Self {
        Self { explicit: None }
    }
}

impl CredentialsProvider for ApiKeyCredentials {
    fn resolve(&self) -> Result<SecretString, TransportError> {
        if let Some(api_key) = &self.explicit {
            if api_key.trim().is_empty() {
                return Err(TransportError::authentication(
                    "explicit api key must not be empty",
                ));
            }

            return Ok(SecretString::new(api_key.clone()));
        }

        for var in API_KEY_ENV_VARS {
            if let Ok(value) = env::var(var)
                && !value.trim().is_empty()
            {
                return Ok(SecretString::new(value));
            }
        }

        Err(TransportError::authentication(format!(
            "no api key configured; set {} or {}",
            API_KEY_ENV_VARS[0], API_KEY_ENV_VARS[1]
        )))
    }
}
