pub mod context;
pub mod dispatch;
pub mod executor;
pub mod linearize;
pub mod validate;

pub use context::{ExecutionContext, PriorAgent};
pub use dispatch::{AgentDispatcher, DispatchOutcome};
pub use executor::ChainExecutor;
pub use linearize::linearize;
pub use validate::{validate_structure, Validation};
