// Media Payload Encoding
// Base64 handling for binary submissions (images, audio, video frames).

use crate::models::MediaPayload;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

impl MediaPayload {
    /// Encode raw bytes into a payload ready to attach to a model request.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Decode back to the original bytes. Fails on payloads that did not come
    /// from `from_bytes` (corrupt or non-base64 data).
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Small deterministic generator so round-trip coverage doesn't depend on
    // an RNG crate. Parameters from Numerical Recipes.
    fn lcg_bytes(seed: u64, len: usize) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (state >> 33) as u8
            })
            .collect()
    }

    #[test]
    fn test_base64_round_trip_is_byte_identical() {
        for (seed, len) in [(1u64, 0usize), (2, 1), (3, 2), (4, 3), (5, 64), (6, 1023), (7, 4096)] {
            let bytes = lcg_bytes(seed, len);
            let payload = MediaPayload::from_bytes("application/octet-stream", &bytes);
            assert_eq!(payload.decode().unwrap(), bytes, "len={}", len);
        }
    }

    #[test]
    fn test_encoded_payload_keeps_mime_type() {
        let payload = MediaPayload::from_bytes("image/png", &[0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.data, "iVBORw==");
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let payload = MediaPayload {
            mime_type: "audio/wav".to_string(),
            data: "not base64!!".to_string(),
        };
        assert!(payload.decode().is_err());
    }
}
