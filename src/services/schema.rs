// Response Schema Definitions
// Structured-output schemas handed to the model so it is constrained to emit
// JSON matching the entities in `models`. These are the v1beta `responseSchema`
// shapes (uppercase type tokens). A "successful" gateway call guarantees
// syntactically valid JSON against one of these, but optional fields may still
// be omitted; normalizers must tolerate that.

use serde_json::{json, Value};

/// Schema for every AI-detection feature (text, code, image, audio, video
/// frames). `detailedAnalysis` is optional and only the text feature asks the
/// model to populate it.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "verdict": {
                "type": "STRING",
                "enum": ["AI_GENERATED", "AI_ASSISTED", "LIKELY_HUMAN", "UNCERTAIN"],
                "description": "The final judgment on the content's origin.",
            },
            "confidence": {
                "type": "NUMBER",
                "description": "A confidence score from 0 to 100 for the verdict.",
            },
            "aiPercentage": {
                "type": "NUMBER",
                "description": "The percentage of the text that shows AI influence (either generative or assistive), from 0 to 100.",
            },
            "explanation": {
                "type": "STRING",
                "description": "A detailed explanation for the verdict, summarizing the key findings.",
            },
            "keyCharacteristics": {
                "type": "ARRAY",
                "description": "A list of specific characteristics found that support the verdict.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "characteristic": {
                            "type": "STRING",
                            "description": "The name of the characteristic observed (e.g., 'Sentence Uniformity', 'Unnatural Textures', 'Temporal Inconsistency', 'Robotic Cadence').",
                        },
                        "evidence": {
                            "type": "STRING",
                            "description": "A brief quote or description that serves as evidence for this characteristic.",
                        },
                    },
                    "required": ["characteristic", "evidence"],
                },
            },
            "detailedAnalysis": {
                "type": "ARRAY",
                "description": "A sentence-by-sentence breakdown of the text, classifying each as AI or Human.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "sentence": {
                            "type": "STRING",
                            "description": "The sentence being analyzed.",
                        },
                        "classification": {
                            "type": "STRING",
                            "enum": ["AI", "Human"],
                            "description": "Classification of the sentence as 'AI' or 'Human'.",
                        },
                        "reasoning": {
                            "type": "STRING",
                            "description": "A brief reason for the classification of this sentence.",
                        },
                    },
                    "required": ["sentence", "classification", "reasoning"],
                },
            },
        },
        "required": ["verdict", "confidence", "aiPercentage", "explanation", "keyCharacteristics"],
    })
}

pub fn grammar_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "correctedText": {
                "type": "STRING",
                "description": "The full text with all grammar and spelling corrections applied.",
            },
            "errors": {
                "type": "ARRAY",
                "description": "A list of specific errors found in the text.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "originalText": {
                            "type": "STRING",
                            "description": "The original text snippet containing the error.",
                        },
                        "correctedText": {
                            "type": "STRING",
                            "description": "The corrected version of the text snippet.",
                        },
                        "explanation": {
                            "type": "STRING",
                            "description": "A brief explanation of the grammatical error and the correction.",
                        },
                    },
                    "required": ["originalText", "correctedText", "explanation"],
                },
            },
        },
        "required": ["correctedText", "errors"],
    })
}

pub fn rewrite_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestions": {
                "type": "ARRAY",
                "description": "A list of rewrite suggestions.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "tone": {
                            "type": "STRING",
                            "description": "The tone of the rewritten text (e.g., 'Formal', 'Casual', 'Shorter').",
                        },
                        "rewrittenText": {
                            "type": "STRING",
                            "description": "The rewritten version of the text.",
                        },
                    },
                    "required": ["tone", "rewrittenText"],
                },
            },
        },
        "required": ["suggestions"],
    })
}
