//! Tool registry for lookup by declared function name.

use std::future::Future;
use std::sync::Arc;

use gcommon::Registry;
use gcontent::FunctionDeclaration;
use serde_json::Value;

use crate::{FunctionTool, Tool, ToolError, ToolExecutionContext};

/// Name-unique mapping from declared function name to invocable binding.
/// Registering a name again replaces the previous binding.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let name = tool.declaration().name;
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn register_fn<F, Fut>(&mut self, declaration: FunctionDeclaration, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(declaration, handler));
    }

    pub fn register_sync_fn<F>(&mut self, declaration: FunctionDeclaration, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register_fn(declaration, move |args, context| {
            let output = handler(args, context);
            async move { output }
        });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        self.tools.values().map(|tool| tool.declaration()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
