use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{HaptickError, Result};

/// Every waveform handed to the analysis pipeline runs at this rate.
pub const TARGET_SAMPLE_RATE: u32 = 22050;

#[derive(Debug)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Duration reported by the container, if it reports one.
    pub media_duration: Option<f64>,
}

impl AudioData {
    /// Duration implied by the decoded samples.
    pub fn audio_duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode the first audio track of `path` into mono samples at [`TARGET_SAMPLE_RATE`].
pub fn decode_media(path: &Path) -> Result<AudioData> {
    let file = std::fs::File::open(path)
        .map_err(|e| HaptickError::Decode(format!("failed to open {}: {}", path.display(), e)))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| HaptickError::Decode(format!("unsupported or corrupt container: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| HaptickError::Decode("no audio tracks found".into()))?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| HaptickError::Decode("unknown sample rate".into()))?;

    let media_duration = track.codec_params.n_frames.map(|n| match track.codec_params.time_base {
        Some(tb) => {
            let t = tb.calc_time(n);
            t.seconds as f64 + t.frac
        }
        None => n as f64 / sample_rate as f64,
    });

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| HaptickError::Decode(format!("failed to create decoder: {}", e)))?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            // The track list changed (chained streams); keep what the first stream gave.
            Err(SymphoniaError::ResetRequired) => {
                log::warn!("Stream changed mid-file, stopping after {} samples", all_samples.len());
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        downmix_into(sample_buf.samples(), channels, &mut all_samples);
    }

    log::info!(
        "Decoded audio: {} samples, {}Hz, {} channel(s), {:.2}s",
        all_samples.len(),
        sample_rate,
        channels,
        all_samples.len() as f32 / sample_rate as f32
    );

    let samples = if sample_rate != TARGET_SAMPLE_RATE && !all_samples.is_empty() {
        log::info!("Resampling {}Hz -> {}Hz", sample_rate, TARGET_SAMPLE_RATE);
        resample(&all_samples, sample_rate, TARGET_SAMPLE_RATE)?
    } else {
        all_samples
    };

    Ok(AudioData {
        samples,
        sample_rate: TARGET_SAMPLE_RATE,
        media_duration,
    })
}

/// Average interleaved channels down to mono, appending to `out`.
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    for frame_samples in interleaved.chunks(channels) {
        let mono: f32 = frame_samples.iter().sum::<f32>() / channels as f32;
        out.push(mono);
    }
}

/// Resample mono audio from `from_rate` to `to_rate` using rubato.
///
/// The output has `round(len * to_rate / from_rate)` samples, aligned with the
/// input: the filter delay is trimmed from the front and the tail is flushed.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0,
        params,
        samples.len(),
        1,
    )
    .map_err(|e| HaptickError::Decode(format!("failed to create resampler: {}", e)))?;

    let expected = (samples.len() as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();

    let mut output = resampler
        .process(&[samples], None)
        .map_err(|e| HaptickError::Decode(format!("resampling failed: {}", e)))?
        .into_iter()
        .next()
        .unwrap_or_default();

    while output.len() < expected + delay {
        let tail = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| HaptickError::Decode(format!("resampling failed: {}", e)))?
            .into_iter()
            .next()
            .unwrap_or_default();
        if tail.is_empty() {
            break;
        }
        output.extend(tail);
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_channels() {
        let mut out = Vec::new();
        downmix_into(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, &mut out);
        assert_eq!(out, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn downmix_passes_mono_through() {
        let mut out = vec![0.25];
        downmix_into(&[0.1, 0.2], 1, &mut out);
        assert_eq!(out, vec![0.25, 0.1, 0.2]);
    }

    #[test]
    fn audio_duration_from_samples() {
        let audio = AudioData {
            samples: vec![0.0; 44100],
            sample_rate: TARGET_SAMPLE_RATE,
            media_duration: None,
        };
        assert!((audio.audio_duration() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn resample_halves_length() {
        let input: Vec<f32> = (0..4410).map(|i| (i as f32 * 0.01).sin()).collect();
        let out = resample(&input, 44100, 22050).unwrap();
        assert_eq!(out.len(), 2205);
    }

    #[test]
    fn resample_keeps_the_tail() {
        // A tone that lasts to the very end must still be there after resampling.
        let input: Vec<f32> = (0..44100)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
            .collect();
        let out = resample(&input, 44100, 22050).unwrap();
        assert_eq!(out.len(), 22050);
        let tail = &out[out.len() - 200..];
        let tail_rms = (tail.iter().map(|s| s * s).sum::<f32>() / tail.len() as f32).sqrt();
        assert!(tail_rms > 0.25, "tail rms {}", tail_rms);
    }

    #[test]
    fn wma_is_reported_as_decode_error() {
        // No ASF demuxer: a .wma passes the extension check but cannot be decoded.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.wma");
        let mut header = vec![0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11];
        header.resize(4096, 0);
        std::fs::write(&path, header).unwrap();

        let err = decode_media(&path).unwrap_err();
        assert!(matches!(err, HaptickError::Decode(_)), "{:?}", err);
    }

    #[test]
    fn missing_file_is_decode_error() {
        let err = decode_media(Path::new("/no/such/file.wav")).unwrap_err();
        assert!(matches!(err, HaptickError::Decode(_)));
    }
}
