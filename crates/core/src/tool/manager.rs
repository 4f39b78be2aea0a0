use std::collections::HashMap;
use std::future::ready;
use std::pin::Pin;
use std::sync::Arc;

use wayfinder_model::{ModelTool, ToolCallRequest};

use crate::tool::object::{ToolObject, ToolObjectImpl};
use crate::tool::{Error, Tool, ToolResult};

/// An object that manages the toolset and dispatches tool calls requested
/// by the model.
#[derive(Default)]
pub struct Manager {
    tools: HashMap<String, Arc<dyn ToolObject>>,
}

impl Manager {
    /// Registers a tool, replacing any previous tool with the same name.
    pub fn add_tool<T: Tool>(&mut self, tool: T) {
        let name = tool.name().to_owned();
        if self.tools.contains_key(&name) {
            debug!("replacing tool: {name}");
        }
        self.tools.insert(name, Arc::new(ToolObjectImpl(tool)));
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns the tool definitions sent to the model, ordered by name.
    pub fn definitions(&self) -> Vec<ModelTool> {
        let mut definitions: Vec<_> = self
            .tools
            .values()
            .map(|tool| ModelTool {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Returns a future that runs the requested tool.
    ///
    /// The future does not borrow the manager.
    pub fn execute(
        &self,
        req: &ToolCallRequest,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> {
        let Some(tool) = self.tools.get(&req.name) else {
            warn!("tool not found: {}", req.name);
            return Box::pin(ready(Err(Error::not_found()
                .with_reason(format!("unknown tool `{}`", req.name)))));
        };

        trace!("executing a tool ({}) with args: {:?}", req.id, req.arguments);
        Arc::clone(tool).execute(req.arguments.clone())
    }
}
