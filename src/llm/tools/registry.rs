//! Tool registry: declarations and their handlers, kept side by side

use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::declaration::create_tool_declaration;
use super::executor::ToolExecutor;
use crate::llm::core::types::ToolDeclaration;

/// Type alias for boxed async functions
type AsyncToolFn =
    Box<dyn Fn(serde_json::Value) -> BoxFuture<'static, Result<String, String>> + Send + Sync>;

/// Errors raised while building a registry
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),
}

/// A complete tool: what the model sees and what runs
pub struct ToolRegistration {
    pub declaration: ToolDeclaration,
    pub function: AsyncToolFn,
}

impl ToolRegistration {
    /// Build a registration whose schema is derived from `Args`
    ///
    /// Arguments are deserialized into `Args` before `func` runs; missing or
    /// malformed arguments turn into an error message instead of a call.
    pub fn new<F, Args, R, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        func: F,
    ) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Args: DeserializeOwned + JsonSchema + Send + 'static,
        R: Serialize + Send + 'static,
        Fut: Future<Output = Result<R, String>> + Send + 'static,
    {
        let declaration = create_tool_declaration::<Args>(name, description);

        let wrapper = move |args_json: serde_json::Value| {
            let args = match serde_json::from_value::<Args>(args_json) {
                Ok(args) => args,
                Err(e) => {
                    let err_msg = format!("Failed to deserialize arguments: {}", e);
                    return Box::pin(async move { Err(err_msg) }) as BoxFuture<'static, _>;
                }
            };

            let future = func(args);

            Box::pin(async move {
                let result = future.await?;
                serde_json::to_string(&result)
                    .map_err(|e| format!("Failed to serialize result: {}", e))
            }) as BoxFuture<'static, _>
        };

        Self {
            declaration,
            function: Box::new(wrapper),
        }
    }
}

/// Registry mapping tool names to typed handlers
///
/// Every declaration handed to the model comes from a registration that also
/// carries its handler, so the catalog and the dispatch table cannot drift.
/// Declarations keep their registration order.
#[derive(Default)]
pub struct ToolRegistry {
    declarations: Vec<ToolDeclaration>,
    functions: HashMap<String, AsyncToolFn>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool; names must be unique
    pub fn register(&mut self, registration: ToolRegistration) -> Result<(), RegistryError> {
        let name = registration.declaration.name.clone();
        if self.functions.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }

        self.functions.insert(name, registration.function);
        self.declarations.push(registration.declaration);
        Ok(())
    }

    /// The tool catalog, in registration order
    pub fn declarations(&self) -> &[ToolDeclaration] {
        &self.declarations
    }

    async fn execute_function(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<String, String> {
        match self.functions.get(name) {
            Some(func) => func(arguments).await,
            None => Err(format!("Unknown tool: {}", name)),
        }
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(
        &self,
        tool_use_id: String,
        name: String,
        arguments: serde_json::Value,
    ) -> Result<String, String> {
        tracing::debug!(tool_use_id = %tool_use_id, tool = %name, "executing tool");
        let result = self.execute_function(&name, arguments).await;
        if let Err(error) = &result {
            tracing::warn!(tool_use_id = %tool_use_id, tool = %name, %error, "tool failed");
        }
        result
    }
}
