use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::DecodeError;

/// Mono PCM, downmixed from however many channels the source had.
#[derive(Clone, Debug)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmBuffer {
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

pub trait Decoder {
    /// Decode a complete audio file held in memory. `extension` is a format hint.
    fn decode(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<PcmBuffer, DecodeError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaDecoder;

impl Decoder for SymphoniaDecoder {
    fn decode(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<PcmBuffer, DecodeError> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(DecodeError::Probe)?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoTrack)?;

        let track_id = track.id;
        let channels = track.codec_params.channels.map_or(1, |c| c.count());
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or(DecodeError::UnknownSampleRate)?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(DecodeError::Codec)?;

        let mut mono: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(DecodeError::Stream(e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(msg)) => {
                    log::debug!("Skipping corrupt packet: {}", msg);
                    continue;
                }
                Err(e) => return Err(DecodeError::Stream(e)),
            };

            let spec = *decoded.spec();
            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let samples = sample_buf.samples();

            if channels == 1 {
                mono.extend_from_slice(samples);
            } else {
                for frame in samples.chunks(channels) {
                    mono.push(frame.iter().sum::<f32>() / channels as f32);
                }
            }
        }

        if mono.is_empty() {
            return Err(DecodeError::Empty);
        }

        log::info!(
            "Decoded audio: {} samples, {}Hz, {} channel(s), {:.1}s",
            mono.len(),
            sample_rate,
            channels,
            mono.len() as f32 / sample_rate as f32
        );

        Ok(PcmBuffer {
            samples: mono,
            sample_rate,
        })
    }
}
