pub mod append_to_file;
pub mod create_file;
pub mod delete_lines;
pub mod execute_command;
pub mod finish;
pub mod git_operation;
pub mod insert_in_file;
mod process;
pub mod replace_lines;
pub mod run_python;
pub mod show_file;

pub use append_to_file::AppendToFileTool;
pub use create_file::CreateFileTool;
pub use delete_lines::DeleteLinesTool;
pub use execute_command::ExecuteCommandTool;
pub use finish::FinishTool;
pub use git_operation::GitOperationTool;
pub use insert_in_file::InsertInFileTool;
pub use replace_lines::ReplaceLinesTool;
pub use run_python::RunPythonTool;
pub use show_file::ShowFileTool;

use crate::error::RegistryError;
use crate::registry::ToolRegistry;
use std::sync::Arc;

/// Registry with every built-in tool, in a fixed order.
pub fn default_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry
        .register(Arc::new(ShowFileTool::new()))?
        .register(Arc::new(CreateFileTool::new()))?
        .register(Arc::new(AppendToFileTool::new()))?
        .register(Arc::new(InsertInFileTool::new()))?
        .register(Arc::new(ReplaceLinesTool::new()))?
        .register(Arc::new(DeleteLinesTool::new()))?
        .register(Arc::new(ExecuteCommandTool::new()))?
        .register(Arc::new(RunPythonTool::new()))?
        .register(Arc::new(GitOperationTool::new()))?
        .register(Arc::new(FinishTool::new()))?;
    Ok(registry)
}
