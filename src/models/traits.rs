use async_trait::async_trait;

use crate::agents::AgentResponse;
use crate::input::ImagePayload;
use crate::utils::MedicoreError;

/// Core trait that all model backends must implement.
///
/// A backend makes exactly one completion call per `dispatch` and never
/// sleeps; pacing lives in the exchange runner.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Send one user turn and get back the routed agent response
    async fn dispatch(
        &self,
        text: &str,
        image: Option<&ImagePayload>,
    ) -> Result<AgentResponse, MedicoreError>;

    /// Get the name of the model
    fn name(&self) -> &str;

    /// Validate that the model endpoint is reachable
    async fn validate_connection(&self) -> Result<bool, MedicoreError> {
        Ok(true)
    }
}
