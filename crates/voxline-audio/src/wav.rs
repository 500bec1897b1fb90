use std::io::Cursor;

use crate::error::AudioError;

/// Wrap 16-bit little-endian mono PCM in a WAV container, in memory
pub fn package_wav(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    if pcm.len() % 2 != 0 {
        return Err(AudioError::Encoding(format!(
            "{} bytes is not a whole number of 16-bit samples",
            pcm.len()
        )));
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));

    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).map_err(|e| AudioError::Encoding(format!("WAV header: {e}")))?;

    for sample in pcm.chunks_exact(2) {
        writer
            .write_sample(i16::from_le_bytes([sample[0], sample[1]]))
            .map_err(|e| AudioError::Encoding(format!("WAV sample: {e}")))?;
    }

    writer
        .finalize()
        .map_err(|e| AudioError::Encoding(format!("WAV finalize: {e}")))?;

    Ok(cursor.into_inner())
}
