// Shared, read-only state handed to every request

use std::sync::Arc;

use crate::config::AgentSettings;
use crate::llm::agent::Agent;
use crate::llm::core::provider::LlmProvider;
use crate::llm::tools::ToolRegistry;

#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    settings: Arc<AgentSettings>,
}

impl AppState {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: ToolRegistry, settings: AgentSettings) -> Self {
        Self {
            provider,
            tools: Arc::new(tools),
            settings: Arc::new(settings),
        }
    }

    /// A fresh agent with an empty conversation
    pub fn agent(&self) -> Agent {
        Agent::new(
            Arc::clone(&self.provider),
            self.tools.clone(),
            self.tools.declarations().to_vec(),
            self.settings.generation.clone(),
            Some(self.settings.system_prompt.clone()),
        )
        .with_max_iterations(self.settings.max_iterations)
        .with_timeout(self.settings.request_timeout)
    }
}
