//! Registry configuration.

use idr_crypto::SignaturePolicy;
use idr_types::Address;
use std::env;
use tracing::warn;

/// Configuration for a registry instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryConfig {
    /// Address of this registry; domain separator in every signing digest.
    pub registry_address: Address,
    /// How high-S signatures are treated.
    pub signature_policy: SignaturePolicy,
}

impl RegistryConfig {
    pub fn new(registry_address: Address) -> Self {
        Self {
            registry_address,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_signature_policy(mut self, policy: SignaturePolicy) -> Self {
        self.signature_policy = policy;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `IDR_REGISTRY_ADDRESS`: hex registry address (default: zero address)
    /// - `IDR_REJECT_HIGH_S`: refuse high-S signatures per EIP-2 (default: false, they are normalized)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let registry_address = lookup("IDR_REGISTRY_ADDRESS")
            .and_then(|raw| match raw.trim().parse::<Address>() {
                Ok(address) => Some(address),
                Err(e) => {
                    warn!(value = %raw, error = %e, "Ignoring invalid IDR_REGISTRY_ADDRESS");
                    None
                }
            })
            .unwrap_or_default();

        let signature_policy = match lookup("IDR_REJECT_HIGH_S")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            Some("true" | "1") => SignaturePolicy::RejectHighS,
            _ => SignaturePolicy::NormalizeHighS,
        };

        Self {
            registry_address,
            signature_policy,
        }
    }
}
