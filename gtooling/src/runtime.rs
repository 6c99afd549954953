//! Tool runtime trait and default registry-backed executor.

use std::sync::Arc;

use gcontent::FunctionCall;

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolExecutionResult, ToolFuture,
    ToolRegistry, ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        call: FunctionCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;

    /// Registered declarations, advertised to the model.
    fn declarations(&self) -> Vec<gcontent::FunctionDeclaration>;

    fn knows(&self, name: &str) -> bool;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        call: FunctionCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            let tool = self.registry.get(&call.name).ok_or_else(|| {
                ToolError::not_found(format!("tool '{}' is not registered", call.name))
                    .with_tool_name(call.name.clone())
            })?;

            self.hooks.on_invocation_start(&call.name);

            match tool.invoke(&call.args, &context).await {
                Ok(response) => {
                    self.hooks.on_invocation_success(&call.name);
                    Ok(ToolExecutionResult::from_call(&call, response))
                }
                Err(error) => {
                    let error = error.with_tool_name(call.name.clone());
                    self.hooks.on_invocation_failure(&call.name, &error);
                    Err(error)
                }
            }
        })
    }

    fn declarations(&self) -> Vec<gcontent::FunctionDeclaration> {
        self.registry.declarations()
    }

    fn knows(&self, name: &str) -> bool {
        self.registry.contains(name)
    }
}
