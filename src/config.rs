use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            smoothing: default_smoothing(),
            volume: default_volume(),
        }
    }
}

fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }
fn default_fps() -> u32 { 60 }
fn default_crf() -> u32 { 18 }
fn default_codec() -> String { "libx264".into() }
fn default_fft_size() -> usize { 1024 }
fn default_smoothing() -> f32 { 0.8 }
fn default_volume() -> f32 { 1.0 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Explicit path, then ./spinfield.toml, then the XDG-style and platform config dirs.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("spinfield.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("spinfield").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("spinfield").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

/// Config values apply only where the CLI is still at its default.
pub fn merge_into(cli: &mut Cli, cfg: Config) {
    if cli.width == default_width() { cli.width = cfg.output.width; }
    if cli.height == default_height() { cli.height = cfg.output.height; }
    if cli.fps == default_fps() { cli.fps = cfg.output.fps; }
    if cli.crf == default_crf() { cli.crf = cfg.output.crf; }
    if cli.codec == default_codec() { cli.codec = cfg.output.codec; }
    if cli.fft_size == default_fft_size() { cli.fft_size = cfg.audio.fft_size; }
    if cli.smoothing == default_smoothing() { cli.smoothing = cfg.audio.smoothing; }
    if cli.volume == default_volume() { cli.volume = cfg.audio.volume; }
}
