// Video Generation Job
// The one multi-step protocol in the system: submit a generation request,
// poll the returned operation handle on a fixed interval, then download the
// finished media. The poll loop is bounded; a job that never completes ends
// in Timeout instead of hanging the caller.

use crate::models::{GeneratedVideo, VideoJobRequest};
use crate::services::credentials::Credential;
use crate::services::gateway::GatewayError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use std::time::Duration;
use tracing::{info, warn};

pub const VEO_MODEL: &str = "veo-3.1-fast-generate-preview";
const VEO_DEFAULT_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const POLL_INTERVAL_SECS: u64 = 10;
/// 90 checks at 10s apart, about 15 minutes end to end.
pub const MAX_POLL_ATTEMPTS: u32 = 90;

/// Server-side operation reference returned by a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationHandle {
    pub name: String,
}

/// One poll observation: finished or not, and the media URI once finished.
#[derive(Debug, Clone)]
pub struct OperationStatus {
    pub done: bool,
    pub uri: Option<String>,
}

/// Seam for the three video API calls; the HTTP client implements it and
/// tests substitute counting stubs.
#[async_trait::async_trait]
pub trait VideoOperations: Send + Sync {
    async fn submit(
        &self,
        credential: &Credential,
        job: &VideoJobRequest,
    ) -> Result<OperationHandle, GatewayError>;

    async fn poll(
        &self,
        credential: &Credential,
        handle: &OperationHandle,
    ) -> Result<OperationStatus, GatewayError>;

    async fn download(
        &self,
        credential: &Credential,
        uri: &str,
    ) -> Result<Vec<u8>, GatewayError>;
}

/// Run a generation job to completion. Progress messages mirror the phases a
/// UI wants to surface while the job runs for minutes.
pub async fn generate_video<V, F>(
    ops: &V,
    credential: Option<&Credential>,
    job: &VideoJobRequest,
    on_progress: F,
) -> Result<GeneratedVideo, GatewayError>
where
    V: VideoOperations + ?Sized,
    F: Fn(&str),
{
    let credential = credential.ok_or(GatewayError::MissingCredential)?;
    if job.prompt.trim().is_empty() {
        return Err(GatewayError::InvalidInput("prompt must not be empty".to_string()));
    }

    on_progress("Initializing video generation...");
    let handle = ops.submit(credential, job).await?;
    info!(operation = %handle.name, "video.submitted");
    on_progress("Video generation started. This may take a few minutes...");

    let mut attempts: u32 = 0;
    let status = loop {
        if attempts >= MAX_POLL_ATTEMPTS {
            warn!(operation = %handle.name, attempts, "video.poll_budget_exhausted");
            return Err(GatewayError::Timeout(attempts));
        }
        tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
        on_progress("Checking video status...");
        attempts += 1;

        let status = ops.poll(credential, &handle).await?;
        if status.done {
            break status;
        }
    };

    on_progress("Finalizing video...");
    let uri = status.uri.ok_or(GatewayError::IncompleteGeneration)?;

    let bytes = ops.download(credential, &uri).await?;
    info!(operation = %handle.name, attempts, bytes = bytes.len(), "video.done");
    Ok(GeneratedVideo {
        bytes,
        mime_type: "video/mp4".to_string(),
    })
}

// ============ HTTP Implementation ============

pub struct VeoClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for VeoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl VeoClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();
        let base_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| VEO_DEFAULT_URL.to_string());
        Self { client, base_url }
    }

    fn submission_body(job: &VideoJobRequest) -> Value {
        let mut instance = json!({ "prompt": job.prompt });
        if let Some(image) = &job.image {
            instance["image"] = json!({
                "bytesBase64Encoded": image.data,
                "mimeType": image.mime_type,
            });
        }
        json!({
            "instances": [instance],
            "parameters": {
                "sampleCount": 1,
                "resolution": job.config.resolution,
                "aspectRatio": job.config.aspect_ratio,
            },
        })
    }
}

#[async_trait::async_trait]
impl VideoOperations for VeoClient {
    async fn submit(
        &self,
        credential: &Credential,
        job: &VideoJobRequest,
    ) -> Result<OperationHandle, GatewayError> {
        let url = format!(
            "{}/models/{}:predictLongRunning?key={}",
            self.base_url,
            VEO_MODEL,
            credential.as_str()
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&Self::submission_body(job))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ModelCallFailed(format!("HTTP {}: {}", status, body)));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        let name = value["name"].as_str().ok_or_else(|| {
            GatewayError::MalformedResponse("operation name missing from submission".to_string())
        })?;
        Ok(OperationHandle { name: name.to_string() })
    }

    async fn poll(
        &self,
        credential: &Credential,
        handle: &OperationHandle,
    ) -> Result<OperationStatus, GatewayError> {
        let url = format!("{}/{}?key={}", self.base_url, handle.name, credential.as_str());

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ModelCallFailed(format!("HTTP {}: {}", status, body)));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let done = value["done"].as_bool().unwrap_or(false);
        let uri = value["response"]["generateVideoResponse"]["generatedSamples"][0]["video"]["uri"]
            .as_str()
            .map(|s| s.to_string());
        Ok(OperationStatus { done, uri })
    }

    async fn download(
        &self,
        credential: &Credential,
        uri: &str,
    ) -> Result<Vec<u8>, GatewayError> {
        // The media URI already carries query parameters; the key is appended.
        let url = format!("{}&key={}", uri, credential.as_str());
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::DownloadFailed(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaPayload, VideoConfig};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubOps {
        submits: AtomicU32,
        polls: AtomicU32,
        downloads: AtomicU32,
        /// Number of not-done polls before the operation reports done.
        pending_polls: u32,
        uri_on_done: Option<&'static str>,
    }

    impl StubOps {
        fn new(pending_polls: u32, uri_on_done: Option<&'static str>) -> Self {
            Self {
                submits: AtomicU32::new(0),
                polls: AtomicU32::new(0),
                downloads: AtomicU32::new(0),
                pending_polls,
                uri_on_done,
            }
        }
    }

    #[async_trait::async_trait]
    impl VideoOperations for StubOps {
        async fn submit(
            &self,
            _credential: &Credential,
            _job: &VideoJobRequest,
        ) -> Result<OperationHandle, GatewayError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            Ok(OperationHandle { name: "operations/test-op".to_string() })
        }

        async fn poll(
            &self,
            _credential: &Credential,
            _handle: &OperationHandle,
        ) -> Result<OperationStatus, GatewayError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if n > self.pending_polls {
                Ok(OperationStatus {
                    done: true,
                    uri: self.uri_on_done.map(|s| s.to_string()),
                })
            } else {
                Ok(OperationStatus { done: false, uri: None })
            }
        }

        async fn download(
            &self,
            _credential: &Credential,
            uri: &str,
        ) -> Result<Vec<u8>, GatewayError> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            assert!(uri.starts_with("https://"));
            Ok(vec![0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70])
        }
    }

    fn job() -> VideoJobRequest {
        VideoJobRequest {
            prompt: "a fox jumping over a log".to_string(),
            image: None,
            config: VideoConfig::default(),
        }
    }

    fn cred() -> Credential {
        Credential::new("test-key")
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_done_then_downloads() {
        // done=false three times, then done=true with a URI: exactly 4 polls.
        let ops = StubOps::new(3, Some("https://video.example/media?alt=media"));
        let video = generate_video(&ops, Some(&cred()), &job(), |_| {}).await.unwrap();
        assert_eq!(ops.polls.load(Ordering::SeqCst), 4);
        assert_eq!(ops.submits.load(Ordering::SeqCst), 1);
        assert_eq!(ops.downloads.load(Ordering::SeqCst), 1);
        assert_eq!(video.bytes.len(), 8);
        assert_eq!(video.mime_type, "video/mp4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_done_operation_times_out() {
        let ops = StubOps::new(u32::MAX, None);
        let err = generate_video(&ops, Some(&cred()), &job(), |_| {}).await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(MAX_POLL_ATTEMPTS)));
        assert_eq!(ops.polls.load(Ordering::SeqCst), MAX_POLL_ATTEMPTS);
        assert_eq!(ops.downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_without_uri_is_incomplete_generation() {
        let ops = StubOps::new(0, None);
        let err = generate_video(&ops, Some(&cred()), &job(), |_| {}).await.unwrap_err();
        assert!(matches!(err, GatewayError::IncompleteGeneration));
        assert_eq!(ops.downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_submission() {
        let ops = StubOps::new(0, Some("https://video.example/media?alt=media"));
        let err = generate_video(&ops, None, &job(), |_| {}).await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingCredential));
        assert_eq!(ops.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_prompt_is_invalid_input() {
        let ops = StubOps::new(0, Some("https://video.example/media?alt=media"));
        let mut blank = job();
        blank.prompt = "   ".to_string();
        let err = generate_video(&ops, Some(&cred()), &blank, |_| {}).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
        assert_eq!(ops.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_messages_cover_all_phases() {
        let ops = StubOps::new(1, Some("https://video.example/media?alt=media"));
        let messages = std::sync::Mutex::new(Vec::new());
        generate_video(&ops, Some(&cred()), &job(), |m| {
            messages.lock().unwrap().push(m.to_string());
        })
        .await
        .unwrap();
        let messages = messages.into_inner().unwrap();
        assert_eq!(messages.first().map(String::as_str), Some("Initializing video generation..."));
        assert!(messages.iter().any(|m| m == "Checking video status..."));
        assert_eq!(messages.last().map(String::as_str), Some("Finalizing video..."));
    }

    #[test]
    fn test_submission_body_includes_seed_image_and_config() {
        let mut with_image = job();
        with_image.image = Some(MediaPayload::from_bytes("image/png", &[1, 2, 3]));
        let body = VeoClient::submission_body(&with_image);
        assert_eq!(body["instances"][0]["prompt"], "a fox jumping over a log");
        assert_eq!(body["instances"][0]["image"]["mimeType"], "image/png");
        assert_eq!(body["parameters"]["resolution"], "720p");
        assert_eq!(body["parameters"]["aspectRatio"], "16:9");

        let without_image = VeoClient::submission_body(&job());
        assert!(without_image["instances"][0]["image"].is_null());
    }
}
