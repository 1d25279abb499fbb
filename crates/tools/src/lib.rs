pub mod descriptor;
pub mod error;
pub mod execution_context;
pub mod executor;
pub mod invocation;
pub mod registry;
pub mod sandbox;
mod text;
pub mod tools;
pub mod traits;
pub mod validator;

pub use descriptor::{ParamSpec, ParamType, SafetyClass, ToolDescriptor};
pub use error::{RegistryError, ToolError, ValidationError};
pub use execution_context::ExecutionContext;
pub use executor::{validation_failure, ConfirmationPolicy, ExecutionPolicy, ExecutorConfig, ToolExecutor};
pub use invocation::{ParamValue, ToolInvocation};
pub use registry::ToolRegistry;
pub use sandbox::{CommandGuard, PathGuard, RootLocks};
pub use tools::default_registry;
pub use traits::{AutoApprove, Confirmer, DenyAll, Tool, ToolOutput};
pub use validator::Validator;
