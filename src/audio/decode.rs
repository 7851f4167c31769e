use ndarray::Array3;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::batch::Waveform;
use crate::error::{FetchError, FetchResult};

/// Decode the first audio track of `path` into a `[1, channels, frames]` waveform.
pub fn decode_waveform(path: &Path) -> FetchResult<Waveform> {
    let fail = |reason: String| FetchError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| fail(format!("failed to probe format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| fail("no audio tracks found".into()))?;

    let track_id = track.id;
    let mut channels = track.codec_params.channels.map(|c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| fail("unknown sample rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| fail(format!("failed to create decoder: {}", e)))?;

    let mut interleaved: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(fail(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(fail(e.to_string())),
        };

        let spec = *decoded.spec();
        let packet_channels = spec.channels.count();
        match channels {
            None => channels = Some(packet_channels),
            Some(c) if c != packet_channels => {
                return Err(fail(format!(
                    "channel count changed mid-stream: {} -> {}",
                    c, packet_channels
                )));
            }
            Some(_) => {}
        }

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sample_buf.samples());
    }

    let channels = channels.unwrap_or(1).max(1);
    let frames = interleaved.len() / channels;

    // Interleaved -> planar
    let mut samples = Array3::<f32>::zeros((1, channels, frames));
    for (frame, chunk) in interleaved.chunks_exact(channels).enumerate() {
        for (ch, &value) in chunk.iter().enumerate() {
            samples[[0, ch, frame]] = value;
        }
    }

    log::info!(
        "Decoded {}: {} channels, {} frames, {}Hz, {:.1}s",
        path.display(),
        channels,
        frames,
        sample_rate,
        frames as f32 / sample_rate as f32
    );

    Ok(Waveform { samples, sample_rate })
}
