// Request Builders
// One pure function per detector feature. Each composes a fixed system
// instruction (the evaluation rubric) with the caller-supplied payload into a
// single ModelRequest. Builders never touch the network.

use crate::models::{MediaPayload, RewriteOptions};
use serde_json::Value;

/// Model used by every analysis feature.
pub const GEMINI_MODEL: &str = "gemini-2.5-pro";

/// Sentinel language value meaning "let the model detect it".
pub const AUTO_LANGUAGE: &str = "auto";

/// System prompt for the text AI-detection feature. The AI_GENERATED vs
/// AI_ASSISTED split is the core of the rubric: loss of originality versus
/// mechanical refinement of a human draft.
const TEXT_SYSTEM_PROMPT: &str = r#"
    You are an expert multilingual linguistic analyst. Your critical task is to differentiate between text that is FULLY AI-GENERATED versus text that was HUMAN-WRITTEN BUT AI-ASSISTED (e.g., via grammar checkers or paraphrasing tools). This distinction is vital to avoid "false positives."

    Analyze the text based on the following verdicts:
    - AI_GENERATED: The text was created from scratch by a generative AI. It lacks a personal voice, has uniform sentence structure, and shows low perplexity and burstiness.
    - AI_ASSISTED: The text was originally written by a human but refined by assistive tools. It may be grammatically perfect but feel slightly unnatural, stilted, or have lost its original nuance. The core ideas and structure are likely human.
    - LIKELY_HUMAN: The text shows natural variation, personal style, and linguistic imperfections characteristic of human writing.
    - UNCERTAIN: The text is too short or has mixed signals.

    You must also provide an "aiPercentage" (0-100) representing the overall percentage of AI influence (both generative and assistive) you detect.

    In addition, you MUST provide a sentence-by-sentence breakdown in 'detailedAnalysis'. For each sentence, classify it as 'AI' or 'Human' and provide reasoning.
"#;

const CODE_SYSTEM_PROMPT: &str = r#"
    You are an expert software engineer and code analyst specializing in identifying the subtle differences between human-written and AI-generated code.
    Your analysis is based on patterns of complexity, commenting style, boilerplate usage, and structural idioms.
    - AI_GENERATED: Code is overly commented, uses generic variable names, follows standard boilerplate without optimization, and lacks idiosyncratic style. It may look "too perfect" or textbook.
    - LIKELY_HUMAN: Code shows signs of evolution, contains personal stylistic choices, comments explain the "why" not just the "what", and may have clever or non-obvious optimizations.
    - UNCERTAIN: The code snippet is too short, simple (e.g., a single function), or common to make a confident determination.
"#;

const IMAGE_SYSTEM_PROMPT: &str = r#"
    You are an expert in digital image forensics specializing in detecting AI-generated images.
    Analyze the provided image for tell-tale signs of AI generation. Look for artifacts such as unnatural textures, inconsistent lighting, anatomical inaccuracies (especially hands and eyes), distorted backgrounds, and a lack of realistic imperfections.
    - AI_GENERATED: The image contains multiple common AI artifacts.
    - LIKELY_HUMAN: The image appears authentic and lacks typical AI-generated flaws.
    - UNCERTAIN: The image is ambiguous or of low quality, making a determination difficult.
"#;

const AUDIO_SYSTEM_PROMPT: &str = r#"
    You are an expert in advanced audio forensics, specializing in detecting deepfake and AI-generated voices (voice cloning).
    Analyze the provided audio for subtle signs of AI generation. Listen for:
    - **Cadence & Emotion:** Unnatural emotional cadence or a flat, robotic tone. Lack of natural pauses or hesitations.
    - **Background Noise:** A complete lack of subtle background noise, which can indicate an artificially generated environment.
    - **Audio Artifacts:** Specific frequency artifacts, metallic ringing, or digital noise left by voice-cloning models.
    - **Human Imperfections:** Lack of breaths, lip smacks, plosives (p, b, t sounds), or other non-speech sounds that are typical of human speech.

    - AI_GENERATED: The audio has a robotic cadence, lacks human-like imperfections, or contains digital artifacts indicative of voice cloning.
    - LIKELY_HUMAN: The audio includes natural speech patterns, breaths, background noise, and variable intonation.
    - UNCERTAIN: The audio quality is too low, or the speech is too brief to make a confident determination.
"#;

const VIDEO_FRAMES_SYSTEM_PROMPT: &str = r#"
    You are an expert in advanced digital video forensics, specializing in detecting deepfakes and AI-generated video.
    The user has provided a sequence of frames from a video. Analyze these frames collectively for signs of AI generation or manipulation. Pay close attention to:
    - **Facial Artifacts:** Unnatural blinking patterns (too frequent, too rare, or unsynchronized), weird facial morphing, inconsistent expressions, and unnatural skin texture.
    - **Lighting & Shadows:** Inconsistencies in lighting on the face versus the background, shadows that don't match the light source.
    - **Temporal Inconsistencies:** Flickering, unnatural object morphing between frames, lack of realistic motion blur, and strange background warping.
    - **Edge Anomalies:** Blurring or distortion around the edges of a person or object that has been superimposed.

    - AI_GENERATED: The video frames show clear signs of deepfake artifacts or temporal inconsistency.
    - LIKELY_HUMAN: The frames are consistent, lighting is natural, and the subject appears authentic.
    - UNCERTAIN: The frames are insufficient or of too low quality to make a confident determination.
"#;

const PLAGIARISM_SYSTEM_PROMPT: &str = r#"
    You are an expert plagiarism checker. Your task is to analyze the provided text and identify potential plagiarism by finding matching sources on the web.
    - Analyze the text for phrases, sentences, and paragraphs that match existing online content.
    - Provide an overall "similarityScore" as a percentage (0-100) representing the proportion of the text that is likely plagiarized.
    - List all "matchedSources" you find. For each source, include its "url", "title", "similarity" percentage for that specific source, and a "snippet" of the text that matches.
    - Provide a concise "summary" of your findings.
    - Your response MUST be a valid JSON object following the specified structure. Do not include any text or markdown formatting outside of the JSON object.
"#;

const GRAMMAR_SYSTEM_PROMPT: &str = r#"
    You are an expert multilingual grammar and style checker. Your task is to identify grammatical errors, spelling mistakes, and style issues in the provided text.
    For each error you find, provide the original incorrect text, the corrected version, and a clear, concise explanation of the correction.
    Also, provide the full text with all corrections applied.
    Your response MUST be a valid JSON object.
"#;

/// A single content part of a model request.
#[derive(Debug, Clone)]
pub enum ContentPart {
    Text(String),
    Inline(MediaPayload),
}

/// Opaque request handed to the gateway: instruction, payload, and the output
/// constraints the model must honor.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub system_instruction: String,
    pub parts: Vec<ContentPart>,
    /// When set, the gateway requests structured JSON output with this schema.
    pub response_schema: Option<Value>,
    /// Web-grounded search; plagiarism only. Mutually exclusive with a
    /// response schema on the hosted API.
    pub web_search: bool,
    pub temperature: f64,
}

impl ModelRequest {
    fn new(system_instruction: &str, temperature: f64) -> Self {
        Self {
            model: GEMINI_MODEL.to_string(),
            system_instruction: system_instruction.to_string(),
            parts: Vec::new(),
            response_schema: None,
            web_search: false,
            temperature,
        }
    }

    /// Concatenated text parts, mainly for assertions and logging.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::Inline(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn build_text_request(text: &str, language: &str) -> ModelRequest {
    let language_instruction = if language == AUTO_LANGUAGE {
        "First, auto-detect the language of the following text. Then, please analyze the text based on that language's linguistic patterns.".to_string()
    } else {
        format!("The following text is in {}. Please analyze it based on its linguistic patterns.", language)
    };

    let mut request = ModelRequest::new(TEXT_SYSTEM_PROMPT, 0.2);
    request.parts.push(ContentPart::Text(format!(
        "{}\n\nTEXT:\n---\n{}\n---",
        language_instruction, text
    )));
    request.response_schema = Some(crate::services::schema::analysis_schema());
    request
}

pub fn build_code_request(code: &str, language: &str) -> ModelRequest {
    let language_instruction = if language == AUTO_LANGUAGE {
        "First, auto-detect the programming language of the following code snippet. Then, analyze the code based on that language's common practices and AI generation patterns.".to_string()
    } else {
        format!("The following code is in {}. Please analyze it based on its idiomatic patterns and common AI generation artifacts.", language)
    };

    let mut request = ModelRequest::new(CODE_SYSTEM_PROMPT, 0.2);
    request.parts.push(ContentPart::Text(format!(
        "{}\n\nCODE:\n---\n{}\n---",
        language_instruction, code
    )));
    request.response_schema = Some(crate::services::schema::analysis_schema());
    request
}

pub fn build_image_request(image: MediaPayload) -> ModelRequest {
    let mut request = ModelRequest::new(IMAGE_SYSTEM_PROMPT, 0.2);
    request.parts.push(ContentPart::Text(
        "Please analyze the following image for signs of AI generation and provide your analysis in the specified JSON format.".to_string(),
    ));
    request.parts.push(ContentPart::Inline(image));
    request.response_schema = Some(crate::services::schema::analysis_schema());
    request
}

pub fn build_audio_request(audio: MediaPayload) -> ModelRequest {
    let mut request = ModelRequest::new(AUDIO_SYSTEM_PROMPT, 0.2);
    request.parts.push(ContentPart::Text(
        "Please analyze the following audio for signs of AI generation and provide your analysis in the specified JSON format.".to_string(),
    ));
    request.parts.push(ContentPart::Inline(audio));
    request.response_schema = Some(crate::services::schema::analysis_schema());
    request
}

pub fn build_video_frames_request(frames: Vec<MediaPayload>) -> ModelRequest {
    let mut request = ModelRequest::new(VIDEO_FRAMES_SYSTEM_PROMPT, 0.2);
    request.parts.push(ContentPart::Text(
        "Please analyze the following video frames for signs of AI generation and provide your collective analysis in the specified JSON format.".to_string(),
    ));
    request
        .parts
        .extend(frames.into_iter().map(ContentPart::Inline));
    request.response_schema = Some(crate::services::schema::analysis_schema());
    request
}

/// Plagiarism is the one feature that needs web grounding, and the hosted API
/// does not allow combining that with a response schema; the expected shape is
/// spelled out in the prompt instead and the reply may come back fenced.
pub fn build_plagiarism_request(text: &str) -> ModelRequest {
    let mut request = ModelRequest::new(PLAGIARISM_SYSTEM_PROMPT, 0.1);
    request.parts.push(ContentPart::Text(format!(
        "Please perform a plagiarism check on the following text and return the result as a JSON object with this exact structure: {{ \"similarityScore\": number, \"summary\": string, \"matchedSources\": [{{ \"url\": string, \"title\": string, \"similarity\": number, \"snippet\": string }}] }}.\n\nTEXT:\n---\n{}\n---",
        text
    )));
    request.web_search = true;
    request
}

pub fn build_grammar_request(text: &str, language: &str) -> ModelRequest {
    let language_instruction = if language == AUTO_LANGUAGE {
        "First, auto-detect the language of the following text. Then, please check its grammar.".to_string()
    } else {
        format!("The following text is in {}. Please check its grammar.", language)
    };

    let mut request = ModelRequest::new(GRAMMAR_SYSTEM_PROMPT, 0.1);
    request.parts.push(ContentPart::Text(format!(
        "{}\n\nTEXT:\n---\n{}\n---",
        language_instruction, text
    )));
    request.response_schema = Some(crate::services::schema::grammar_schema());
    request
}

/// Returns None when no tone family is selected; the caller must then produce
/// an empty RewriteResult without contacting the gateway. This is a product
/// rule, not a failure.
pub fn build_rewrite_request(text: &str, options: &RewriteOptions) -> Option<ModelRequest> {
    let mut tones: Vec<&str> = Vec::new();
    if options.professional {
        tones.extend(["'More Formal'", "'More Confident'", "'More Concise'", "'Business Professional'"]);
    }
    if options.normal {
        tones.extend(["'More Casual'", "'Simpler'", "'More Friendly'", "'Natural Sounding'"]);
    }

    if tones.is_empty() {
        return None;
    }

    let system_instruction = format!(
        "You are an expert writer and editor. Your task is to rewrite the provided text in several different tones to offer the user alternative ways of expressing their ideas.\nProvide suggestions with the following tones: {}.\nYour response MUST be a valid JSON object.",
        tones.join(", ")
    );

    let mut request = ModelRequest::new(&system_instruction, 0.7);
    request.parts.push(ContentPart::Text(format!(
        "Please rewrite the following text. TEXT:\n---\n{}\n---",
        text
    )));
    request.response_schema = Some(crate::services::schema::rewrite_schema());
    Some(request)
}
