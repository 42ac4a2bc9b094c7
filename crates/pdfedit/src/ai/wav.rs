//! WAV container for raw PCM returned by the speech model.

/// Sample rate of synthesized speech.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
/// Synthesized speech is mono.
pub const SPEECH_CHANNELS: u16 = 1;
/// Synthesized speech is signed 16-bit little-endian.
pub const SPEECH_BITS_PER_SAMPLE: u16 = 16;

/// Prefix little-endian PCM samples with a 44-byte RIFF/WAVE header.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32, channels: u16, bits_per_sample: u16) -> Vec<u8> {
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = pcm.len() as u32;

    let mut out = Vec::with_capacity(44 + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

/// Wrap speech-model PCM (24 kHz, mono, 16-bit).
pub fn speech_wav(pcm: &[u8]) -> Vec<u8> {
    pcm_to_wav(
        pcm,
        SPEECH_SAMPLE_RATE,
        SPEECH_CHANNELS,
        SPEECH_BITS_PER_SAMPLE,
    )
}
