//! Application state shared across handlers.

use std::sync::Arc;

use coach::{ChatPipeline, GoalSuggester};

use crate::auth::Authenticator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Chat exchange pipeline.
    pub pipeline: ChatPipeline,
    /// Goal suggestion generator.
    pub suggester: GoalSuggester,
    /// Bearer token verification.
    pub auth: Arc<dyn Authenticator>,
}

impl AppState {
    /// Create new application state.
    pub fn new(pipeline: ChatPipeline, suggester: GoalSuggester, auth: Arc<dyn Authenticator>) -> Self {
        Self {
            pipeline,
            suggester,
            auth,
        }
    }
}
