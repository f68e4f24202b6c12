//! Shared request context threaded through every handler.

use std::sync::Arc;

use crate::db::Db;
use crate::pipeline::PrescriptionProcessor;
use crate::services::AiServices;

#[derive(Clone)]
pub struct ApiContext {
    pub db: Db,
    pub processor: Arc<PrescriptionProcessor>,
    pub services: Arc<dyn AiServices>,
    /// Bearer token required on every route. None disables the check.
    pub api_token: Option<String>,
}
