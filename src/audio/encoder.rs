// PCM16 sample encoding for the streaming wire format
//
// The backend expects mono 16-bit little-endian PCM, base64-encoded.
// Everything here is a pure transform over sample slices so the whole
// pipeline from float samples to wire text is directly testable.

use base64::Engine;

/// Convert float samples in [-1.0, 1.0] to signed 16-bit PCM.
///
/// Samples are clamped first. Negative values scale by 32768 and
/// non-negative values by 32767 so the positive rail cannot overflow.
pub fn pcm16_from_f32(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| {
            let clamped = s.clamp(-1.0, 1.0);
            if clamped < 0.0 {
                (clamped * 32768.0) as i16
            } else {
                (clamped * 32767.0) as i16
            }
        })
        .collect()
}

/// Pack PCM16 samples into little-endian bytes.
pub fn pcm16_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Encode float samples straight to the transport text form:
/// clamp, quantize to PCM16, pack little-endian, base64.
pub fn encode_frame(samples: &[f32]) -> String {
    let pcm = pcm16_from_f32(samples);
    let bytes = pcm16_to_le_bytes(&pcm);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode the transport text form back to PCM16 samples.
///
/// Used by the capture archive and by tests; returns None when the
/// payload is not valid base64 or not a whole number of samples.
pub fn decode_frame(data: &str) -> Option<Vec<i16>> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(data).ok()?;
    if bytes.len() % 2 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(2)
            .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
            .collect(),
    )
}
