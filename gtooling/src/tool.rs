//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use gcontent::{FunctionDeclaration, Schema};
//! use gtooling::{FunctionTool, Tool};
//!
//! let tool = FunctionTool::new(
//!     FunctionDeclaration::new("echo", "Echoes its arguments", Schema::String),
//!     |args, _ctx| async move { Ok(args) },
//! );
//!
//! assert_eq!(tool.declaration().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use gcommon::BoxFuture;
use gcontent::FunctionDeclaration;
use serde_json::Value;

use crate::{ToolError, ToolExecutionContext};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// A named capability the model may request.
///
/// The declaration is what the model sees; `invoke` is the local binding,
/// supplied at configuration time.
pub trait Tool: Send + Sync {
    fn declaration(&self) -> FunctionDeclaration;

    fn invoke<'a>(
        &'a self,
        args: &'a Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>>;
}

type ToolHandler =
    dyn Fn(Value, ToolExecutionContext) -> ToolFuture<'static, Result<Value, ToolError>>
        + Send
        + Sync;

pub struct FunctionTool {
    declaration: FunctionDeclaration,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(declaration: FunctionDeclaration, handler: F) -> Self
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |args, context| Box::pin(handler(args, context)));

        Self {
            declaration,
            handler,
        }
    }
}

impl Tool for FunctionTool {
    fn declaration(&self) -> FunctionDeclaration {
        self.declaration.clone()
    }

    fn invoke<'a>(
        &'a self,
        args: &'a Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        (self.handler)(args.clone(), context.clone())
    }
}
