// Veridect Data Models
// Wire and value types for every detector feature. Field names follow the
// JSON contract the hosted model is constrained to emit (camelCase).

use serde::{Deserialize, Serialize};

// ============ Verdict Enumeration ============

/// Canonical verdict set. An older schema variant used a 3-member set
/// (LIKELY_AI / LIKELY_HUMAN / UNCERTAIN); see `normalizer::canonical_verdict`
/// for the compatibility mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    AiGenerated,
    AiAssisted,
    LikelyHuman,
    Uncertain,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::AiGenerated => "AI_GENERATED",
            Verdict::AiAssisted => "AI_ASSISTED",
            Verdict::LikelyHuman => "LIKELY_HUMAN",
            Verdict::Uncertain => "UNCERTAIN",
        }
    }
}

// ============ AI Detection Result ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyCharacteristic {
    pub characteristic: String,
    pub evidence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentenceClass {
    #[serde(rename = "AI")]
    Ai,
    Human,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceAnalysis {
    pub sentence: String,
    pub classification: SentenceClass,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub verdict: Verdict,
    /// 0-100, clamped by the normalizer.
    pub confidence: f64,
    /// 0-100 share of AI influence (generative or assistive), clamped.
    pub ai_percentage: f64,
    pub explanation: String,
    #[serde(default)]
    pub key_characteristics: Vec<KeyCharacteristic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_analysis: Option<Vec<SentenceAnalysis>>,
    /// True when `ai_percentage` was absent in the model output and the
    /// normalizer filled in a placeholder rather than a measured value.
    #[serde(skip)]
    pub estimated_percentage: bool,
}

// ============ Plagiarism ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedSource {
    pub url: String,
    pub title: String,
    /// 0-100 similarity for this specific source.
    pub similarity: f64,
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismResult {
    /// 0-100 share of the text likely matching online content.
    pub similarity_score: f64,
    pub summary: String,
    #[serde(default)]
    pub matched_sources: Vec<MatchedSource>,
}

// ============ Grammar ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarError {
    pub original_text: String,
    pub corrected_text: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarResult {
    /// Full text with all corrections applied.
    pub corrected_text: String,
    #[serde(default)]
    pub errors: Vec<GrammarError>,
}

// ============ Rewrite ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteSuggestion {
    pub tone: String,
    pub rewritten_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RewriteResult {
    #[serde(default)]
    pub suggestions: Vec<RewriteSuggestion>,
}

/// User-selected tone families for the rewrite feature. Both false is a valid
/// selection and yields an empty `RewriteResult` without a model call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct RewriteOptions {
    pub professional: bool,
    pub normal: bool,
}

// ============ Analysis Request ============

/// A base64-encoded binary payload tagged with its media type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPayload {
    pub mime_type: String,
    /// Standard base64, no line wrapping.
    pub data: String,
}

/// One user submission, discriminated by feature kind. Constructed per user
/// action and discarded once the response (or failure) arrives.
#[derive(Debug, Clone)]
pub enum AnalysisRequest {
    Text { text: String, language: String },
    Code { code: String, language: String },
    Image(MediaPayload),
    Audio(MediaPayload),
    VideoFrames(Vec<MediaPayload>),
}

// ============ Video Generation ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConfig {
    pub resolution: Resolution,
    pub aspect_ratio: AspectRatio,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::P720,
            aspect_ratio: AspectRatio::Landscape,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoJobRequest {
    pub prompt: String,
    /// Optional seed image the generation should start from.
    pub image: Option<MediaPayload>,
    pub config: VideoConfig,
}

/// Finished generation: raw media bytes plus their declared type.
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_wire_tokens() {
        assert_eq!(
            serde_json::to_string(&Verdict::AiGenerated).unwrap(),
            "\"AI_GENERATED\""
        );
        assert_eq!(
            serde_json::from_str::<Verdict>("\"LIKELY_HUMAN\"").unwrap(),
            Verdict::LikelyHuman
        );
        assert_eq!(Verdict::AiAssisted.as_str(), "AI_ASSISTED");
    }

    #[test]
    fn test_analysis_result_tolerates_missing_optional_fields() {
        let json = r#"{
            "verdict": "UNCERTAIN",
            "confidence": 40,
            "aiPercentage": 50,
            "explanation": "Too short to tell."
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(result.key_characteristics.is_empty());
        assert!(result.detailed_analysis.is_none());
        assert!(!result.estimated_percentage);
    }

    #[test]
    fn test_sentence_class_tokens() {
        let json = r#"{"sentence": "Hi.", "classification": "AI", "reasoning": "flat"}"#;
        let s: SentenceAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(s.classification, SentenceClass::Ai);
        let json = r#"{"sentence": "Hi.", "classification": "Human", "reasoning": "typo"}"#;
        let s: SentenceAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(s.classification, SentenceClass::Human);
    }

    #[test]
    fn test_video_config_wire_format() {
        let cfg = VideoConfig {
            resolution: Resolution::P1080,
            aspect_ratio: AspectRatio::Portrait,
        };
        let json = serde_json::to_value(cfg).unwrap();
        assert_eq!(json["resolution"], "1080p");
        assert_eq!(json["aspectRatio"], "9:16");
    }

    #[test]
    fn test_grammar_result_camel_case() {
        let json = r#"{
            "correctedText": "He goes home.",
            "errors": [{
                "originalText": "He go home.",
                "correctedText": "He goes home.",
                "explanation": "Subject-verb agreement."
            }]
        }"#;
        let result: GrammarResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.corrected_text, "He goes home.");
    }
}
