//! Client construction and sub-service access.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use gchat::FunctionCallOrchestrator;
use gcontent::{ConfigError, GenerationConfig};
use gtooling::{
    DefaultToolRuntime, NoopToolRuntimeHooks, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
};
use gtransport::{
    ApiKeyCredentials, CredentialsProvider, DispatchPolicy, HttpTransport, NoopOperationHooks,
    RequestDispatcher, Transport, TransportOperationHooks,
};

use crate::{Chats, Models};

/// One configured client owning the dispatcher, tool runtime, and default
/// generation config. Sub-services borrow it; there is no process-wide
/// state.
pub struct Client {
    dispatcher: RequestDispatcher,
    runtime: Arc<dyn ToolRuntime>,
    defaults: Option<GenerationConfig>,
    session_counter: AtomicU64,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Shortcut for an HTTP-backed client with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::builder().api_key(api_key).build()
    }

    pub fn models(&self) -> Models<'_> {
        Models::new(self)
    }

    pub fn chats(&self) -> Chats<'_> {
        Chats::new(self)
    }

    pub(crate) fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    pub(crate) fn defaults(&self) -> Option<&GenerationConfig> {
        self.defaults.as_ref()
    }

    pub(crate) fn orchestrator(&self) -> FunctionCallOrchestrator {
        FunctionCallOrchestrator::new(self.dispatcher.clone(), Arc::clone(&self.runtime))
    }

    pub(crate) fn next_session_id(&self, prefix: &str) -> String {
        let n = self.session_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{n}")
    }
}

pub struct ClientBuilder {
    api_key: Option<String>,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    default_config: Option<GenerationConfig>,
    transport: Option<Arc<dyn Transport>>,
    tools: ToolRegistry,
    policy: DispatchPolicy,
    transport_hooks: Arc<dyn TransportOperationHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
    base_url: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            credentials: None,
            default_config: None,
            transport: None,
            tools: ToolRegistry::new(),
            policy: DispatchPolicy::default(),
            transport_hooks: Arc::new(NoopOperationHooks),
            tool_hooks: Arc::new(NoopToolRuntimeHooks),
            base_url: None,
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn default_config(mut self, config: GenerationConfig) -> Self {
        self.default_config = Some(config);
        self
    }

    /// Replaces the HTTP transport; used for tests and custom backends.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn dispatch_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn transport_hooks(mut self, hooks: Arc<dyn TransportOperationHooks>) -> Self {
        self.transport_hooks = hooks;
        self
    }

    pub fn tool_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = hooks;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<Client, ConfigError> {
        if let Some(defaults) = &self.default_config {
            defaults.validate()?;
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let credentials: Arc<dyn CredentialsProvider> = match (self.api_key, self.credentials)
                {
                    (Some(api_key), _) => Arc::new(ApiKeyCredentials::explicit(api_key)),
                    (None, Some(credentials)) => credentials,
                    (None, None) => Arc::new(ApiKeyCredentials::from_env()),
                };

                let mut http = HttpTransport::new(reqwest::Client::new(), credentials);
                if let Some(base_url) = self.base_url {
                    http = http.with_base_url(base_url);
                }

                Arc::new(http)
            }
        };

        let dispatcher = RequestDispatcher::new(transport)
            .with_policy(self.policy)
            .with_hooks(self.transport_hooks);

        let runtime =
            DefaultToolRuntime::new(Arc::new(self.tools)).with_hooks(self.tool_hooks);

        Ok(Client {
            dispatcher,
            runtime: Arc::new(runtime),
            defaults: self.default_config,
            session_counter: AtomicU64::new(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_default_config_fails_construction() {
        let bad = GenerationConfig::default().with_temperature(9.0);
        let error = Client::builder()
            .api_key("test-key")
            .default_config(bad)
            .build()
            .expect_err("invalid defaults must fail");
        assert!(!error.constraints.is_empty());
    }

    #[test]
    fn session_ids_are_unique_per_client() {
        let client = Client::with_api_key("test-key").expect("client builds");
        let first = client.next_session_id("chat");
        let second = client.next_session_id("chat");
        assert_ne!(first, second);
    }
}
