use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: String,
    pub pix_fmt: String,
    pub crf: u32,
    pub bitrate: Option<String>,
    /// Gain applied to the muxed soundtrack.
    pub volume: f32,
}

pub struct FfmpegEncoder {
    child: Child,
}

impl FfmpegEncoder {
    /// Spawn ffmpeg reading raw RGBA frames on stdin. `audio_inputs` are played back to
    /// back as the soundtrack.
    pub fn new(output_path: &Path, audio_inputs: &[PathBuf], settings: &EncoderSettings) -> Result<Self> {
        let args = build_args(output_path, audio_inputs, settings)?;

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "FFmpeg encoder started: {}x{} @ {}fps, codec={}, {} audio input(s)",
            settings.width,
            settings.height,
            settings.fps,
            settings.codec,
            audio_inputs.len()
        );

        Ok(Self { child })
    }

    pub fn write_frame(&mut self, rgba_pixels: &[u8]) -> Result<()> {
        let stdin = self.child.stdin.as_mut().context("FFmpeg stdin not available")?;
        stdin.write_all(rgba_pixels).context("Failed to write frame to ffmpeg")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        // Close stdin to signal EOF
        drop(self.child.stdin.take());

        let output = self.child.wait_with_output().context("Failed to wait for ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("FFmpeg exited with error:\n{}", stderr);
        }

        log::info!("FFmpeg encoding complete");
        Ok(())
    }
}

fn path_arg(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))
}

fn build_args(output_path: &Path, audio_inputs: &[PathBuf], settings: &EncoderSettings) -> Result<Vec<String>> {
    let mut args = vec![
        "-y".to_string(),
        "-f".into(), "rawvideo".into(),
        "-pixel_format".into(), "rgba".into(),
        "-video_size".into(), format!("{}x{}", settings.width, settings.height),
        "-framerate".into(), settings.fps.to_string(),
        "-i".into(), "pipe:0".into(),
    ];

    for input in audio_inputs {
        args.extend(["-i".to_string(), path_arg(input)?]);
    }

    if !audio_inputs.is_empty() {
        // Stream 0 is video; audio inputs start at 1.
        let mut filter: String = (1..=audio_inputs.len()).map(|i| format!("[{}:a]", i)).collect();
        filter.push_str(&format!(
            "concat=n={}:v=0:a=1,volume={}[aout]",
            audio_inputs.len(),
            settings.volume
        ));
        args.extend([
            "-filter_complex".to_string(), filter,
            "-map".into(), "0:v".into(),
            "-map".into(), "[aout]".into(),
        ]);
    }

    args.extend([
        "-c:v".to_string(), settings.codec.clone(),
        "-pix_fmt".into(), settings.pix_fmt.clone(),
    ]);

    if let Some(ref br) = settings.bitrate {
        args.extend(["-b:v".to_string(), br.clone()]);
    } else {
        args.extend(["-crf".to_string(), settings.crf.to_string()]);
        args.extend(["-preset".to_string(), "medium".to_string()]);
    }

    if !audio_inputs.is_empty() {
        args.extend([
            "-c:a".to_string(), "aac".into(),
            "-b:a".into(), "192k".into(),
            "-shortest".into(),
        ]);
    }

    args.push(path_arg(output_path)?);
    Ok(args)
}
