use std::fs::File;
use std::path::Path;

use hound::{WavSpec, WavWriter};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::HarvestError;

pub trait Transcoder: Send + Sync {
    /// Convert the compressed artifact at `source` into an uncompressed
    /// sibling at `destination`. The caller owns cleanup of `source`.
    fn transcode(&self, source: &Path, destination: &Path) -> Result<(), HarvestError>;
}

/// Decodes mp3 with symphonia and writes interleaved 16-bit PCM WAV,
/// preserving the source channel count and sample rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavTranscoder;

impl WavTranscoder {
    pub fn new() -> Self {
        Self
    }
}

impl Transcoder for WavTranscoder {
    fn transcode(&self, source: &Path, destination: &Path) -> Result<(), HarvestError> {
        let file = File::open(source)
            .map_err(|err| HarvestError::Transcode(format!("open {}: {err}", source.display())))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = source.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|err| HarvestError::Transcode(err.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| HarvestError::Transcode("no audio track found".to_string()))?;
        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| HarvestError::Transcode("unknown sample rate".to_string()))?;
        let channels = codec_params
            .channels
            .ok_or_else(|| HarvestError::Transcode("unknown channel count".to_string()))?
            .count();

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|err| HarvestError::Transcode(err.to_string()))?;

        let spec = WavSpec {
            channels: channels as u16,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = WavWriter::create(destination, spec)
            .map_err(|err| HarvestError::Transcode(err.to_string()))?;

        let mut wrote_any = false;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(err) => return Err(HarvestError::Transcode(err.to_string())),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let capacity = decoded.capacity() as u64;
                    let mut sample_buf = SampleBuffer::<i16>::new(capacity, spec);
                    sample_buf.copy_interleaved_ref(decoded);
                    if !sample_buf.samples().is_empty() {
                        wrote_any = true;
                    }
                    for &sample in sample_buf.samples() {
                        writer
                            .write_sample(sample)
                            .map_err(|err| HarvestError::Transcode(err.to_string()))?;
                    }
                }
                // Corrupt frames are skippable; the stream usually recovers.
                Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
                Err(err) => return Err(HarvestError::Transcode(err.to_string())),
            }
        }

        writer
            .finalize()
            .map_err(|err| HarvestError::Transcode(err.to_string()))?;
        if !wrote_any {
            return Err(HarvestError::Transcode(
                "no audio frames decoded".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn transcode_missing_source_fails() {
        let temp = tempfile::tempdir().unwrap();
        let err = WavTranscoder::new()
            .transcode(&temp.path().join("absent.mp3"), &temp.path().join("out.wav"))
            .unwrap_err();
        assert_matches!(err, HarvestError::Transcode(_));
    }

    #[test]
    fn transcode_garbage_source_fails() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("noise.mp3");
        std::fs::write(&source, b"not an mp3 at all").unwrap();
        let err = WavTranscoder::new()
            .transcode(&source, &temp.path().join("out.wav"))
            .unwrap_err();
        assert_matches!(err, HarvestError::Transcode(_));
    }
}
