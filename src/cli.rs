use clap::Parser;
use std::path::PathBuf;

/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 16384;

#[derive(Parser, Debug)]
#[command(name = "spinfield", about = "Render an audio-reactive rotating particle field to video")]
pub struct Cli {
    /// Input audio files (WAV, MP3, FLAC, OGG), played one after another
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output video file
    #[arg(short, long, default_value = "output.mp4")]
    pub output: PathBuf,

    /// Config file (defaults to ./spinfield.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Video width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Video height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Analyser FFT size; the field has half as many particles at most
    #[arg(long, default_value_t = 1024)]
    pub fft_size: usize,

    /// Analyser smoothing constant (0.0-1.0)
    #[arg(long, default_value_t = 0.8)]
    pub smoothing: f32,

    /// Playback gain (0.0-1.0); also scales what the analyser hears
    #[arg(long, default_value_t = 1.0)]
    pub volume: f32,

    /// Stop after this many seconds of output
    #[arg(long)]
    pub max_seconds: Option<f32>,

    /// H.264 CRF quality (0-51, lower = better). Ignored when --bitrate is set.
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// Video bitrate (e.g. 2400k, 5M). When set, uses -b:v instead of -crf.
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,
}

impl Cli {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.fps > 0, "--fps must be positive");
        anyhow::ensure!(self.width > 0 && self.height > 0, "resolution must be non-zero");
        anyhow::ensure!(
            self.width <= MAX_DIMENSION && self.height <= MAX_DIMENSION,
            "resolution {}x{} exceeds the {} pixel limit per side",
            self.width,
            self.height,
            MAX_DIMENSION
        );
        anyhow::ensure!(
            self.fft_size.is_power_of_two() && (32..=32768).contains(&self.fft_size),
            "--fft-size must be a power of two between 32 and 32768, got {}",
            self.fft_size
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.smoothing),
            "--smoothing must be within 0.0-1.0, got {}",
            self.smoothing
        );
        Ok(())
    }
}
