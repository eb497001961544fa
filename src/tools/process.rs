use log::{debug, info};
use std::process::Command;

use super::resolver::{validate_binary, ToolResolver};
use super::{ToolError, ToolInvocation, ToolRunner};

/// Runs tools as child processes of this one.
///
/// There is no timeout: a tool that never exits stalls the caller.
pub struct ProcessToolRunner {
    resolver: Box<dyn ToolResolver>,
}

impl ProcessToolRunner {
    pub fn new(resolver: impl ToolResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
        }
    }
}

impl ToolRunner for ProcessToolRunner {
    fn invoke(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
        let tool = invocation.tool;
        let binary = self.resolver.resolve_tool_path(tool)?;
        validate_binary(tool, &binary)?;

        debug!("Running {:?} {:?}", binary, invocation.args);

        let mut command = Command::new(&binary);
        command.args(&invocation.args).envs(&invocation.env);
        if let Some(dir) = &invocation.work_dir {
            command.current_dir(dir);
        }

        let status = command.status().map_err(|source| ToolError::Spawn {
            tool,
            args: invocation.args.clone(),
            source,
        })?;

        if !status.success() {
            return Err(ToolError::Exit {
                tool,
                args: invocation.args.clone(),
                status: status.to_string(),
            });
        }

        info!("{} finished", tool);
        Ok(())
    }
}
