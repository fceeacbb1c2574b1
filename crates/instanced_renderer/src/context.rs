/// Re-exports the GPU context from `instanced_core`.  The renderer never
/// creates adapters itself; it receives an initialised `EngineContext`.
pub use instanced_core::context::{ContextError, EngineContext};
