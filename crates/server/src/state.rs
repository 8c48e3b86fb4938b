//! Application state shared across handlers.

use std::sync::Arc;

use ferry_core::StateAssembler;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<StateAssembler>,
}

impl AppState {
    #[must_use]
    pub fn new(assembler: StateAssembler) -> Self {
        Self {
            assembler: Arc::new(assembler),
        }
    }
}
