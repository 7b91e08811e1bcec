use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::audio::decode::{Decoder, PcmBuffer};

/// Decode every input in parallel, keeping input order. A file that cannot be
/// read or decoded is logged and left out.
pub fn decode_playlist<D>(inputs: &[PathBuf], decoder: &D) -> Vec<(PathBuf, PcmBuffer)>
where
    D: Decoder + Sync,
{
    inputs
        .par_iter()
        .map(|path| (path, decode_file(path, decoder)))
        .collect::<Vec<_>>()
        .into_iter()
        .filter_map(|(path, decoded)| match decoded {
            Ok(pcm) => Some((path.clone(), pcm)),
            Err(err) => {
                log::error!("Skipping {}: {:#}", path.display(), err);
                None
            }
        })
        .collect()
}

fn decode_file<D: Decoder>(path: &Path, decoder: &D) -> Result<PcmBuffer> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read audio file: {}", path.display()))?;
    let extension = path.extension().and_then(|e| e.to_str());
    let pcm = decoder
        .decode(bytes, extension)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(pcm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    /// Accepts any file except one whose contents are `bad`.
    struct StubDecoder;

    impl Decoder for StubDecoder {
        fn decode(&self, bytes: Vec<u8>, _extension: Option<&str>) -> Result<PcmBuffer, DecodeError> {
            if bytes == b"bad" {
                return Err(DecodeError::Empty);
            }
            Ok(PcmBuffer {
                samples: vec![0.0; bytes.len()],
                sample_rate: 8000,
            })
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spinfield-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_failing_file_is_skipped_and_order_kept() {
        let dir = scratch_dir("playlist");
        let first = dir.join("first.wav");
        let broken = dir.join("broken.wav");
        let last = dir.join("last.wav");
        std::fs::write(&first, b"four").unwrap();
        std::fs::write(&broken, b"bad").unwrap();
        std::fs::write(&last, b"sixsix").unwrap();
        let missing = dir.join("missing.wav");

        let inputs = vec![first.clone(), broken, missing, last.clone()];
        let playlist = decode_playlist(&inputs, &StubDecoder);

        let paths: Vec<&PathBuf> = playlist.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec![&first, &last]);
        assert_eq!(playlist[0].1.samples.len(), 4);
        assert_eq!(playlist[1].1.samples.len(), 6);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_all_failing_yields_empty_playlist() {
        let dir = scratch_dir("empty");
        let broken = dir.join("broken.mp3");
        std::fs::write(&broken, b"bad").unwrap();

        assert!(decode_playlist(&[broken], &StubDecoder).is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
