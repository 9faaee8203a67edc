use std::time::Duration;

use crate::foundation::core::{BoxFuture, SlideId};
use crate::foundation::error::{DeckError, DeckResult};

/// Payload sent to the image generation service.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerationRequest {
    /// Slide the image is generated for.
    pub slide_id: SlideId,
    /// Prompt describing the desired image.
    pub visual_prompt: String,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegenerationResponse {
    #[serde(alias = "url")]
    image_url: String,
}

/// Producer of replacement image URLs.
pub trait RegenerationBackend: Send + Sync + 'static {
    /// Generate a new image for `request` and return its URL.
    fn regenerate(&self, request: RegenerationRequest) -> BoxFuture<DeckResult<String>>;
}

/// Regeneration backend speaking JSON over HTTP.
///
/// Posts `{"slideId", "visualPrompt"}` to the endpoint and expects `{"imageUrl": ...}` back.
#[derive(Clone, Debug)]
pub struct HttpRegenerationClient {
    endpoint: String,
    timeout: Duration,
}

impl HttpRegenerationClient {
    /// Client for `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Target URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RegenerationBackend for HttpRegenerationClient {
    fn regenerate(&self, request: RegenerationRequest) -> BoxFuture<DeckResult<String>> {
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        Box::pin(async move {
            tokio::task::spawn_blocking(move || post_regeneration(&endpoint, &request, timeout))
                .await
                .map_err(|e| DeckError::regeneration(format!("regeneration task failed: {e}")))?
        })
    }
}

#[tracing::instrument(skip(request, timeout), fields(slide = %request.slide_id))]
fn post_regeneration(
    endpoint: &str,
    request: &RegenerationRequest,
    timeout: Duration,
) -> DeckResult<String> {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    let agent: ureq::Agent = config.into();

    let mut response = agent
        .post(endpoint)
        .send_json(request)
        .map_err(|e| DeckError::regeneration(format!("POST {endpoint}: {e}")))?;
    let body: RegenerationResponse = response
        .body_mut()
        .read_json()
        .map_err(|e| DeckError::regeneration(format!("invalid response from {endpoint}: {e}")))?;
    parse_image_url(body)
}

fn parse_image_url(body: RegenerationResponse) -> DeckResult<String> {
    let url = body.image_url.trim();
    if url.is_empty() {
        return Err(DeckError::regeneration("service returned an empty image url"));
    }
    Ok(url.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/regen/client.rs"]
mod tests;
