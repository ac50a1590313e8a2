// Veridect Core Services

pub mod analysis;
pub mod credentials;
pub mod encoding;
pub mod gateway;
pub mod request_builder;
pub mod schema;
pub mod session;
pub mod video;

pub use credentials::{AppConfig, ConfigError, ConfigStore, Credential};
pub use gateway::{GatewayError, GeminiGateway, ModelTransport};
pub use request_builder::{ContentPart, ModelRequest};
pub use session::{DetectorSession, DetectorTab, TabResult, ViewState};
pub use video::{generate_video, OperationHandle, OperationStatus, VeoClient, VideoOperations};

pub use analysis::{
    analyze, analyze_audio, analyze_code, analyze_image, analyze_text, analyze_video_frames,
    check_grammar, check_plagiarism, rewrite_text,
};
