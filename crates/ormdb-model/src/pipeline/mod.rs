//! Operation pipeline: options, instances and the hook traits.

mod hooks;
mod instance;
mod options;

pub use hooks::{DefinePlugin, ModelHook};
pub use instance::Instance;
pub use options::CallOptions;
