//! Provider factory
//!
//! Backend keys map to constructors through a static registry built once at
//! startup, so adding a variant means adding one entry here rather than
//! touching every call site.

use crate::config::{SecretString, Settings};
use crate::error::{ProviderError, ProviderResult};
use crate::protocol::ToolDefinition;
use crate::providers::anthropic::AnthropicProvider;
use crate::providers::azure::AzureProvider;
use crate::providers::openai_compat::{self, OpenAiCompatProvider};
use crate::providers::Provider;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Everything a provider constructor needs
#[derive(Debug, Clone)]
pub struct ProviderInit {
    /// Backend credential; must be non-empty
    pub api_key: SecretString,
    /// Optional deployment settings (base-URL overrides)
    pub settings: Option<Settings>,
    /// Tool descriptors the provider forwards verbatim; fixed for the
    /// lifetime of the instance
    pub tools: Vec<ToolDefinition>,
}

impl ProviderInit {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            settings: None,
            tools: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Validate the credential at construction time
    pub(crate) fn validated_key(&self) -> ProviderResult<SecretString> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotInitialized);
        }
        Ok(self.api_key.clone())
    }

    /// Settings override for the given backend key, if configured
    pub(crate) fn base_url_override(&self, key: &str) -> Option<String> {
        self.settings
            .as_ref()
            .and_then(|settings| settings.provider_url(key))
            .map(str::to_owned)
    }
}

type BuildFn = fn(ProviderInit) -> ProviderResult<Arc<dyn Provider>>;

/// Static mapping from backend key to constructor
pub struct ProviderRegistry {
    builders: HashMap<&'static str, BuildFn>,
}

impl ProviderRegistry {
    /// The built-in registry covering the five recognized backends
    pub fn builtin() -> &'static ProviderRegistry {
        static REGISTRY: OnceLock<ProviderRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let mut builders: HashMap<&'static str, BuildFn> = HashMap::new();
            builders.insert(openai_compat::OPENAI.key, |init| {
                Ok(Arc::new(OpenAiCompatProvider::new(&openai_compat::OPENAI, init)?))
            });
            builders.insert(openai_compat::GEMINI.key, |init| {
                Ok(Arc::new(OpenAiCompatProvider::new(&openai_compat::GEMINI, init)?))
            });
            builders.insert(openai_compat::GROQ.key, |init| {
                Ok(Arc::new(OpenAiCompatProvider::new(&openai_compat::GROQ, init)?))
            });
            builders.insert(AnthropicProvider::KEY, |init| {
                Ok(Arc::new(AnthropicProvider::new(init)?))
            });
            builders.insert(AzureProvider::KEY, |init| {
                Ok(Arc::new(AzureProvider::new(init)?))
            });
            ProviderRegistry { builders }
        })
    }

    /// Recognized backend keys, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builders.keys().copied()
    }

    /// Construct an initialized provider for the given key
    pub fn build(&self, key: &str, init: ProviderInit) -> ProviderResult<Arc<dyn Provider>> {
        match self.builders.get(key) {
            Some(build) => build(init),
            None => Err(ProviderError::UnknownProvider(key.to_string())),
        }
    }
}

/// Obtain an initialized provider by backend key and credential
pub fn get_provider(
    key: &str,
    api_key: impl Into<SecretString>,
) -> ProviderResult<Arc<dyn Provider>> {
    ProviderRegistry::builtin().build(key, ProviderInit::new(api_key))
}

/// Obtain an initialized provider with settings and tools
pub fn get_provider_with(key: &str, init: ProviderInit) -> ProviderResult<Arc<dyn Provider>> {
    ProviderRegistry::builtin().build(key, init)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_five_backends_are_registered() {
        let registry = ProviderRegistry::builtin();
        let mut keys: Vec<_> = registry.keys().collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["Anthropic", "AzureOpenAI", "Gemini", "Groq", "OpenAI"]
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = get_provider("Unknown", "sk-test").unwrap_err();
        assert!(matches!(err, ProviderError::UnknownProvider(key) if key == "Unknown"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let err = get_provider("openai", "sk-test").unwrap_err();
        assert!(matches!(err, ProviderError::UnknownProvider(_)));
    }

    #[test]
    fn empty_credential_fails_initialization() {
        for key in ["OpenAI", "Anthropic", "AzureOpenAI", "Gemini", "Groq"] {
            let err = get_provider(key, "").unwrap_err();
            assert!(
                matches!(err, ProviderError::NotInitialized),
                "{key} accepted an empty credential"
            );
        }
    }

    #[test]
    fn valid_key_yields_initialized_provider() {
        let provider = get_provider("Groq", "gsk-test").unwrap();
        assert_eq!(provider.key(), "Groq");
        assert_eq!(provider.base_url(), "https://api.groq.com/openai/v1");
    }
}
