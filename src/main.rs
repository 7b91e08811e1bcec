mod audio;
mod cli;
mod config;
mod encode;
mod error;
mod mapping;
mod particles;
mod playlist;
mod render;
mod scheduler;
mod visualizer;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use audio::decode::SymphoniaDecoder;
use audio::graph::{AnalyserOptions, MediaClock, OfflineGraph};
use cli::Cli;
use encode::ffmpeg::{EncoderSettings, FfmpegEncoder};
use render::canvas::RasterCanvas;
use scheduler::{CancelToken, FixedRateScheduler};
use visualizer::Visualizer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(path) = config::find_config(cli.config.as_deref()) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            config::merge_into(&mut cli, cfg);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }
    cli.validate()?;

    log::info!("spinfield - audio-reactive particle renderer");
    log::info!("Output: {}", cli.output.display());
    log::info!("Resolution: {}x{} @ {}fps", cli.width, cli.height, cli.fps);
    log::info!(
        "Analyser: fft_size={}, smoothing={:.2}, volume={:.2}",
        cli.fft_size, cli.smoothing, cli.volume
    );

    // 1. Decode every input; a file that fails is reported and skipped.
    log::info!("Decoding {} input(s)...", cli.inputs.len());
    let playlist = playlist::decode_playlist(&cli.inputs, &SymphoniaDecoder);

    if playlist.is_empty() {
        anyhow::bail!("None of the inputs could be decoded");
    }

    let budget = cli.max_seconds.map(|s| (s as f64 * cli.fps as f64).ceil() as u64);
    let planned: u64 = playlist
        .iter()
        .map(|(_, pcm)| (pcm.duration() as f64 * cli.fps as f64).ceil() as u64)
        .sum();
    let total_frames = budget.map_or(planned, |b| b.min(planned));

    // 2. Start the encoder with the decodable files as the soundtrack
    let paths: Vec<PathBuf> = playlist.iter().map(|(p, _)| p.clone()).collect();
    let settings = EncoderSettings {
        width: cli.width,
        height: cli.height,
        fps: cli.fps,
        codec: cli.codec.clone(),
        pix_fmt: cli.pix_fmt.clone(),
        crf: cli.crf,
        bitrate: cli.bitrate.clone(),
        volume: cli.volume,
    };
    let mut encoder = FfmpegEncoder::new(&cli.output, &paths, &settings)?;

    // 3. Render loop, one engine per file
    let pb = ProgressBar::new(total_frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")?
            .progress_chars("=>-"),
    );

    let options = AnalyserOptions {
        fft_size: cli.fft_size,
        smoothing: cli.smoothing,
    };
    let mut canvas = RasterCanvas::new(cli.width, cli.height)?;
    let mut viz = Visualizer::new(cli.volume);
    let cancel = CancelToken::new();
    let mut rendered: u64 = 0;

    for (path, pcm) in playlist {
        if cancel.is_cancelled() {
            break;
        }

        let clock = MediaClock::new();
        let mut frames = FixedRateScheduler::for_duration(cli.fps, pcm.duration(), clock.clone());
        log::info!(
            "Now playing {} ({:.1}s, {} frames)",
            path.display(),
            pcm.duration(),
            frames.total_frames()
        );

        viz.load(move || OfflineGraph::new(pcm, options, clock))?;

        scheduler::run(&mut frames, &cancel, |tick| {
            let stats = viz.step(&mut canvas)?;
            log::trace!(
                "frame {} t={:.3}s particles={} amplitude={:.1}",
                tick.index, tick.time, stats.particles, stats.amplitude
            );
            encoder.write_frame(canvas.pixels())?;

            rendered += 1;
            pb.set_position(rendered);
            if budget.is_some_and(|b| rendered >= b) {
                cancel.cancel();
            }
            Ok(())
        })?;
    }

    if viz.is_active() {
        viz.unload()?;
    }
    pb.finish_with_message("Rendering complete");

    // 4. Finish encoding
    log::info!("Finishing encoding...");
    encoder.finish()?;

    log::info!("Done! {} frames written to {}", rendered, cli.output.display());
    Ok(())
}
