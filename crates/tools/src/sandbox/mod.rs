pub mod command_guard;
pub mod path_guard;
pub mod root_lock;

pub use command_guard::{CommandGuard, DenyRule};
pub use path_guard::PathGuard;
pub use root_lock::{RootLockGuard, RootLocks};
