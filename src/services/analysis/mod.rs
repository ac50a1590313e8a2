// Feature Orchestration
// One async operation per detector feature: validate input, build the
// request, invoke the gateway, normalize the result. Callers are expected to
// prevent duplicate submissions (see `session`); nothing here retries.

pub mod normalizer;

use crate::models::{
    AnalysisRequest, AnalysisResult, GrammarResult, MediaPayload, PlagiarismResult,
    RewriteOptions, RewriteResult,
};
use crate::services::credentials::Credential;
use crate::services::gateway::{parse_payload, GatewayError, ModelTransport};
use crate::services::request_builder;
use normalizer::{normalize_analysis, typed_result};
use tracing::{info, warn};
use uuid::Uuid;

fn require_credential(credential: Option<&Credential>) -> Result<&Credential, GatewayError> {
    credential.ok_or(GatewayError::MissingCredential)
}

fn require_text(text: &str, what: &str) -> Result<(), GatewayError> {
    if text.trim().is_empty() {
        return Err(GatewayError::InvalidInput(format!("{} must not be empty", what)));
    }
    Ok(())
}

fn require_payload(payload: &MediaPayload, what: &str) -> Result<(), GatewayError> {
    if payload.data.is_empty() {
        return Err(GatewayError::InvalidInput(format!("{} payload is empty", what)));
    }
    Ok(())
}

async fn run_analysis<T>(
    transport: &T,
    credential: &Credential,
    request: request_builder::ModelRequest,
    feature: &str,
) -> Result<AnalysisResult, GatewayError>
where
    T: ModelTransport + ?Sized,
{
    let request_id = Uuid::new_v4();
    info!(%request_id, feature, model = %request.model, "analysis.start");

    let raw = transport.generate(credential, &request).await.map_err(|e| {
        warn!(%request_id, feature, error = %e, "analysis.failed");
        e
    })?;

    let value = parse_payload(&raw, true)?;
    let result = normalize_analysis(value)?;
    info!(
        %request_id,
        feature,
        verdict = result.verdict.as_str(),
        estimated = result.estimated_percentage,
        "analysis.ok"
    );
    Ok(result)
}

pub async fn analyze_text<T>(
    transport: &T,
    credential: Option<&Credential>,
    text: &str,
    language: &str,
) -> Result<AnalysisResult, GatewayError>
where
    T: ModelTransport + ?Sized,
{
    let credential = require_credential(credential)?;
    require_text(text, "text")?;
    let request = request_builder::build_text_request(text, language);
    run_analysis(transport, credential, request, "text").await
}

pub async fn analyze_code<T>(
    transport: &T,
    credential: Option<&Credential>,
    code: &str,
    language: &str,
) -> Result<AnalysisResult, GatewayError>
where
    T: ModelTransport + ?Sized,
{
    let credential = require_credential(credential)?;
    require_text(code, "code")?;
    let request = request_builder::build_code_request(code, language);
    run_analysis(transport, credential, request, "code").await
}

pub async fn analyze_image<T>(
    transport: &T,
    credential: Option<&Credential>,
    image: MediaPayload,
) -> Result<AnalysisResult, GatewayError>
where
    T: ModelTransport + ?Sized,
{
    let credential = require_credential(credential)?;
    require_payload(&image, "image")?;
    let request = request_builder::build_image_request(image);
    run_analysis(transport, credential, request, "image").await
}

pub async fn analyze_audio<T>(
    transport: &T,
    credential: Option<&Credential>,
    audio: MediaPayload,
) -> Result<AnalysisResult, GatewayError>
where
    T: ModelTransport + ?Sized,
{
    let credential = require_credential(credential)?;
    require_payload(&audio, "audio")?;
    let request = request_builder::build_audio_request(audio);
    run_analysis(transport, credential, request, "audio").await
}

pub async fn analyze_video_frames<T>(
    transport: &T,
    credential: Option<&Credential>,
    frames: Vec<MediaPayload>,
) -> Result<AnalysisResult, GatewayError>
where
    T: ModelTransport + ?Sized,
{
    let credential = require_credential(credential)?;
    if frames.is_empty() {
        return Err(GatewayError::InvalidInput("no video frames provided".to_string()));
    }
    for frame in &frames {
        require_payload(frame, "video frame")?;
    }
    let request = request_builder::build_video_frames_request(frames);
    run_analysis(transport, credential, request, "video_frames").await
}

/// Dispatch one submission by feature kind.
pub async fn analyze<T>(
    transport: &T,
    credential: Option<&Credential>,
    request: AnalysisRequest,
) -> Result<AnalysisResult, GatewayError>
where
    T: ModelTransport + ?Sized,
{
    match request {
        AnalysisRequest::Text { text, language } => {
            analyze_text(transport, credential, &text, &language).await
        }
        AnalysisRequest::Code { code, language } => {
            analyze_code(transport, credential, &code, &language).await
        }
        AnalysisRequest::Image(image) => analyze_image(transport, credential, image).await,
        AnalysisRequest::Audio(audio) => analyze_audio(transport, credential, audio).await,
        AnalysisRequest::VideoFrames(frames) => {
            analyze_video_frames(transport, credential, frames).await
        }
    }
}

/// Plagiarism is web-grounded and not schema-constrained, so the payload may
/// come back fenced; parsing strips that before casting.
pub async fn check_plagiarism<T>(
    transport: &T,
    credential: Option<&Credential>,
    text: &str,
) -> Result<PlagiarismResult, GatewayError>
where
    T: ModelTransport + ?Sized,
{
    let credential = require_credential(credential)?;
    require_text(text, "text")?;

    let request_id = Uuid::new_v4();
    let request = request_builder::build_plagiarism_request(text);
    info!(%request_id, feature = "plagiarism", model = %request.model, "analysis.start");

    let raw = transport.generate(credential, &request).await?;
    let value = parse_payload(&raw, false)?;
    let result: PlagiarismResult = typed_result(value)?;
    info!(
        %request_id,
        feature = "plagiarism",
        similarity = result.similarity_score,
        sources = result.matched_sources.len(),
        "analysis.ok"
    );
    Ok(result)
}

pub async fn check_grammar<T>(
    transport: &T,
    credential: Option<&Credential>,
    text: &str,
    language: &str,
) -> Result<GrammarResult, GatewayError>
where
    T: ModelTransport + ?Sized,
{
    let credential = require_credential(credential)?;
    require_text(text, "text")?;

    let request_id = Uuid::new_v4();
    let request = request_builder::build_grammar_request(text, language);
    info!(%request_id, feature = "grammar", model = %request.model, "analysis.start");

    let raw = transport.generate(credential, &request).await?;
    let value = parse_payload(&raw, true)?;
    let result: GrammarResult = typed_result(value)?;
    info!(%request_id, feature = "grammar", errors = result.errors.len(), "analysis.ok");
    Ok(result)
}

/// Zero selected tone families short-circuits to an empty result without a
/// gateway call; this is the declared product rule, not a failure.
pub async fn rewrite_text<T>(
    transport: &T,
    credential: Option<&Credential>,
    text: &str,
    options: &RewriteOptions,
) -> Result<RewriteResult, GatewayError>
where
    T: ModelTransport + ?Sized,
{
    let request = match request_builder::build_rewrite_request(text, options) {
        Some(request) => request,
        None => return Ok(RewriteResult::default()),
    };

    let credential = require_credential(credential)?;
    require_text(text, "text")?;

    let request_id = Uuid::new_v4();
    info!(%request_id, feature = "rewrite", model = %request.model, "analysis.start");

    let raw = transport.generate(credential, &request).await?;
    let value = parse_payload(&raw, true)?;
    let result: RewriteResult = typed_result(value)?;
    info!(%request_id, feature = "rewrite", suggestions = result.suggestions.len(), "analysis.ok");
    Ok(result)
}
