use crate::config::Config;
use crate::generation::generator::Pipeline;
use crate::notify::WebhookNotifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation pipeline: tier ladder, deadlines and the upstream generator behind a trait.
    pub pipeline: Pipeline,
    pub notifier: WebhookNotifier,
    pub config: Config,
}
