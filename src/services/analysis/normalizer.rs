// Result Normalizers
// Post-processing applied to raw model JSON before it reaches the caller:
// legacy verdict remapping, placeholder percentage for an absent or zero
// aiPercentage, and range clamping. All text fields pass through unmodified.

use crate::models::{AnalysisResult, KeyCharacteristic, SentenceAnalysis, Verdict};
use crate::services::gateway::GatewayError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Map a wire verdict token onto the canonical enumeration. Two schema
/// variants exist in the wild: the canonical 4-member set and an older
/// 3-member set whose LIKELY_AI collapses into AI_GENERATED. Anything else is
/// a contract violation, not a value to coerce.
pub fn canonical_verdict(token: &str) -> Option<Verdict> {
    match token {
        "AI_GENERATED" => Some(Verdict::AiGenerated),
        "AI_ASSISTED" => Some(Verdict::AiAssisted),
        "LIKELY_HUMAN" => Some(Verdict::LikelyHuman),
        "UNCERTAIN" => Some(Verdict::Uncertain),
        // Legacy 3-member schema.
        "LIKELY_AI" => Some(Verdict::AiGenerated),
        _ => None,
    }
}

/// Placeholder for a missing or zero aiPercentage, keeping the historical ranges:
/// 0-9 for LIKELY_HUMAN, exactly 50 for UNCERTAIN, 90-99 otherwise. Derived
/// from a hash of the explanation so repeated normalization of the same
/// response yields the same number. A cosmetic stand-in, not a measurement;
/// `AnalysisResult::estimated_percentage` is set whenever it is used.
pub fn placeholder_percentage(verdict: Verdict, seed_text: &str) -> f64 {
    let mut hasher = DefaultHasher::new();
    seed_text.hash(&mut hasher);
    let digit = (hasher.finish() % 10) as f64;

    match verdict {
        Verdict::Uncertain => 50.0,
        Verdict::LikelyHuman => digit,
        Verdict::AiGenerated | Verdict::AiAssisted => 90.0 + digit,
    }
}

/// Loosely-typed mirror of the analysis schema. The verdict stays a string
/// here so the compat mapping above is the single place tokens are judged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    verdict: String,
    #[serde(default)]
    confidence: f64,
    ai_percentage: Option<f64>,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    key_characteristics: Vec<KeyCharacteristic>,
    #[serde(default)]
    detailed_analysis: Option<Vec<SentenceAnalysis>>,
}

/// Normalize a parsed analysis payload into the canonical result.
pub fn normalize_analysis(value: Value) -> Result<AnalysisResult, GatewayError> {
    let raw: RawAnalysis = serde_json::from_value(value)
        .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

    let verdict = canonical_verdict(&raw.verdict).ok_or_else(|| {
        GatewayError::MalformedResponse(format!("unknown verdict token: {}", raw.verdict))
    })?;

    // Zero and absent are the same signal: the model declined to quantify.
    let (ai_percentage, estimated) = match raw.ai_percentage {
        Some(pct) if pct > 0.0 => (pct.clamp(0.0, 100.0), false),
        _ => (placeholder_percentage(verdict, &raw.explanation), true),
    };

    Ok(AnalysisResult {
        verdict,
        confidence: raw.confidence.clamp(0.0, 100.0),
        ai_percentage,
        explanation: raw.explanation,
        key_characteristics: raw.key_characteristics,
        detailed_analysis: raw.detailed_analysis,
        estimated_percentage: estimated,
    })
}

/// Cast a parsed payload into a typed result, naming the parse failure
/// instead of silently coercing.
pub fn typed_result<T: DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_verdict_covers_both_schema_variants() {
        assert_eq!(canonical_verdict("AI_GENERATED"), Some(Verdict::AiGenerated));
        assert_eq!(canonical_verdict("AI_ASSISTED"), Some(Verdict::AiAssisted));
        assert_eq!(canonical_verdict("LIKELY_HUMAN"), Some(Verdict::LikelyHuman));
        assert_eq!(canonical_verdict("UNCERTAIN"), Some(Verdict::Uncertain));
        assert_eq!(canonical_verdict("LIKELY_AI"), Some(Verdict::AiGenerated));
        assert_eq!(canonical_verdict("HUMAN"), None);
        assert_eq!(canonical_verdict(""), None);
    }

    #[test]
    fn test_placeholder_ranges_per_verdict() {
        for seed in ["", "short", "a much longer explanation with detail"] {
            let human = placeholder_percentage(Verdict::LikelyHuman, seed);
            assert!((0.0..10.0).contains(&human), "human placeholder {}", human);

            assert_eq!(placeholder_percentage(Verdict::Uncertain, seed), 50.0);

            let generated = placeholder_percentage(Verdict::AiGenerated, seed);
            assert!((90.0..100.0).contains(&generated), "ai placeholder {}", generated);
            let assisted = placeholder_percentage(Verdict::AiAssisted, seed);
            assert!((90.0..100.0).contains(&assisted));
        }
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        let a = placeholder_percentage(Verdict::AiGenerated, "same explanation");
        let b = placeholder_percentage(Verdict::AiGenerated, "same explanation");
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_fills_missing_percentage_and_flags_it() {
        let value = json!({
            "verdict": "UNCERTAIN",
            "confidence": 40,
            "explanation": "Mixed signals.",
            "keyCharacteristics": []
        });
        let result = normalize_analysis(value).unwrap();
        assert_eq!(result.ai_percentage, 50.0);
        assert!(result.estimated_percentage);
        assert!((0.0..=100.0).contains(&result.ai_percentage));
    }

    #[test]
    fn test_normalize_keeps_reported_percentage() {
        let value = json!({
            "verdict": "AI_GENERATED",
            "confidence": 95,
            "aiPercentage": 87.5,
            "explanation": "Uniform cadence throughout.",
            "keyCharacteristics": [
                {"characteristic": "Sentence Uniformity", "evidence": "every sentence ~20 words"}
            ]
        });
        let result = normalize_analysis(value).unwrap();
        assert_eq!(result.ai_percentage, 87.5);
        assert!(!result.estimated_percentage);
        assert_eq!(result.key_characteristics.len(), 1);
    }

    #[test]
    fn test_normalize_clamps_out_of_range_scores() {
        let value = json!({
            "verdict": "AI_GENERATED",
            "confidence": 130,
            "aiPercentage": 140,
            "explanation": "x",
            "keyCharacteristics": []
        });
        let result = normalize_analysis(value).unwrap();
        assert_eq!(result.confidence, 100.0);
        assert_eq!(result.ai_percentage, 100.0);
        assert!(!result.estimated_percentage);
    }

    #[test]
    fn test_normalize_treats_zero_percentage_as_missing() {
        let value = json!({
            "verdict": "AI_GENERATED",
            "confidence": 90,
            "aiPercentage": 0,
            "explanation": "Uniform cadence throughout.",
            "keyCharacteristics": []
        });
        let result = normalize_analysis(value).unwrap();
        assert!(result.estimated_percentage);
        assert!((90.0..100.0).contains(&result.ai_percentage), "got {}", result.ai_percentage);

        // Negative values collapse into the same case rather than clamping to 0.
        let value = json!({
            "verdict": "LIKELY_HUMAN",
            "confidence": 70,
            "aiPercentage": -5,
            "explanation": "varied style",
            "keyCharacteristics": []
        });
        let result = normalize_analysis(value).unwrap();
        assert!(result.estimated_percentage);
        assert!((0.0..10.0).contains(&result.ai_percentage));
    }

    #[test]
    fn test_normalize_remaps_legacy_verdict() {
        let value = json!({
            "verdict": "LIKELY_AI",
            "confidence": 80,
            "aiPercentage": 92,
            "explanation": "textbook boilerplate",
            "keyCharacteristics": []
        });
        let result = normalize_analysis(value).unwrap();
        assert_eq!(result.verdict, Verdict::AiGenerated);
    }

    #[test]
    fn test_normalize_rejects_unknown_verdict() {
        let value = json!({
            "verdict": "DEFINITELY_A_ROBOT",
            "confidence": 80,
            "aiPercentage": 92,
            "explanation": "",
            "keyCharacteristics": []
        });
        let err = normalize_analysis(value).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[test]
    fn test_missing_key_characteristics_becomes_empty_list() {
        let value = json!({
            "verdict": "LIKELY_HUMAN",
            "confidence": 70,
            "aiPercentage": 4,
            "explanation": "varied style"
        });
        let result = normalize_analysis(value).unwrap();
        assert!(result.key_characteristics.is_empty());
        assert!(result.detailed_analysis.is_none());
    }
}
