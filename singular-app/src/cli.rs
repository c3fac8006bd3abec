//! Command-line interface for Singular
//!
//! Handles argument parsing and logging configuration.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use singular_core::console::verbosity;
use singular_core::{AudioFormat, ByteOrder, PixelFormat, SampleType, VideoFormat, Viewport};

/// Device backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Simulated tone microphones and test-pattern cameras
    Sim,
    /// WASAPI microphones (Windows only)
    Windows,
}

/// Singular - live microphone levels and camera frames in the terminal
#[derive(Parser, Debug)]
#[command(name = "singular")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase verbosity
    /// -v = debug console + info log, -vv = trace console + debug log, -vvv = trace log
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress console output and all logging except errors
    #[arg(short, long)]
    pub quiet: bool,

    #[arg(long, value_enum, default_value_t = Backend::Sim)]
    pub backend: Backend,

    /// Microphone to open, by index in the device list (default device otherwise)
    #[arg(long)]
    pub microphone: Option<usize>,

    /// Request this microphone format, e.g. 8000:16:s16le:1 (rate:bits:type:channels)
    #[arg(long, value_parser = parse_audio_format)]
    pub audio_format: Option<AudioFormat>,

    /// Stop after this many seconds; 0 runs until stdin closes or `:quit`
    #[arg(long, default_value_t = 0)]
    pub seconds: u64,

    /// Settings file (default: <config dir>/singular/settings.json)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Width of the level meter in columns
    #[arg(long, default_value_t = 40)]
    pub meter_width: u16,

    /// Screen size used to center a window with no saved position
    #[arg(long, value_parser = parse_size, default_value = "1920x1080")]
    pub screen: Viewport,

    /// Store a new window size, e.g. 1024x768
    #[arg(long, value_parser = parse_size)]
    pub window_size: Option<Viewport>,

    /// Store the window as maximized
    #[arg(long)]
    pub maximized: bool,

    /// Do not open cameras
    #[arg(long)]
    pub no_cameras: bool,

    /// Do not open a microphone
    #[arg(long)]
    pub no_microphone: bool,

    /// Number of simulated cameras to keep (default: all)
    #[arg(long)]
    pub sim_cameras: Option<usize>,

    /// Force every simulated camera to one format, e.g. rgb32:320x240
    #[arg(long, value_parser = parse_video_format)]
    pub sim_format: Option<VideoFormat>,

    /// Make simulated cameras send one wrong-sized frame after this many frames
    #[arg(long)]
    pub sim_glitch_after: Option<u64>,
}

impl Args {
    /// Get the log level filter based on verbosity flags
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    /// Console verbosity: 1 by default, raised by each -v up to 3.
    pub fn console_verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            (verbosity::INFO + self.verbose).min(verbosity::TRACE)
        }
    }
}

/// Initialize the logging system based on CLI arguments
pub fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    // Base level for all modules - keep at warn to suppress noisy deps
    builder.filter_level(LevelFilter::Warn);

    for module in ["singular", "singular_core", "singular_sim", "singular_windows"] {
        builder.filter_module(module, args.log_level());
    }

    builder.format_timestamp_millis().init();
}

fn parse_size(value: &str) -> Result<Viewport, String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = i32::from_str(w.trim()).map_err(|e| format!("bad width '{}': {}", w, e))?;
    let height = i32::from_str(h.trim()).map_err(|e| format!("bad height '{}': {}", h, e))?;
    if width <= 0 || height <= 0 {
        return Err(format!("size must be positive, got {}x{}", width, height));
    }
    Ok(Viewport::new(width, height))
}

fn parse_video_format(value: &str) -> Result<VideoFormat, String> {
    let (pixel, size) = value
        .split_once(':')
        .ok_or_else(|| format!("expected PIXEL:WIDTHxHEIGHT, got '{}'", value))?;
    let pixel_format = match pixel.to_ascii_lowercase().as_str() {
        "argb32" => PixelFormat::Argb32,
        "argb32p" => PixelFormat::Argb32Premultiplied,
        "rgb32" => PixelFormat::Rgb32,
        "rgb24" => PixelFormat::Rgb24,
        "rgb565" => PixelFormat::Rgb565,
        "rgb555" => PixelFormat::Rgb555,
        "bgra32" => PixelFormat::Bgra32,
        "bgr24" => PixelFormat::Bgr24,
        "yuyv" => PixelFormat::Yuyv,
        "uyvy" => PixelFormat::Uyvy,
        "nv12" => PixelFormat::Nv12,
        "yuv420p" => PixelFormat::Yuv420p,
        "jpeg" => PixelFormat::Jpeg,
        other => return Err(format!("unknown pixel format '{}'", other)),
    };
    let size = parse_size(size)?;
    Ok(VideoFormat::new(pixel_format, size.width as u32, size.height as u32))
}

fn parse_audio_format(value: &str) -> Result<AudioFormat, String> {
    let parts: Vec<&str> = value.split(':').collect();
    let [rate, bits, encoding, channels] = parts.as_slice() else {
        return Err(format!("expected RATE:BITS:ENCODING:CHANNELS, got '{}'", value));
    };
    let (sample_type, byte_order) = match encoding.to_ascii_lowercase().as_str() {
        "s8" | "s16le" => (SampleType::SignedInt, ByteOrder::LittleEndian),
        "s16be" => (SampleType::SignedInt, ByteOrder::BigEndian),
        "u8" | "u16le" => (SampleType::UnsignedInt, ByteOrder::LittleEndian),
        "u16be" => (SampleType::UnsignedInt, ByteOrder::BigEndian),
        "f32le" => (SampleType::Float, ByteOrder::LittleEndian),
        "f32be" => (SampleType::Float, ByteOrder::BigEndian),
        other => return Err(format!("unknown sample encoding '{}'", other)),
    };
    let format = AudioFormat::new(
        rate.parse().map_err(|e| format!("bad sample rate '{}': {}", rate, e))?,
        bits.parse().map_err(|e| format!("bad sample size '{}': {}", bits, e))?,
        sample_type,
        byte_order,
        channels.parse().map_err(|e| format!("bad channel count '{}': {}", channels, e))?,
    );
    format.validate()?;
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_console_and_log_levels() {
        let args = Args::parse_from(["singular"]);
        assert_eq!(args.console_verbosity(), 1);
        assert_eq!(args.log_level(), LevelFilter::Warn);

        let args = Args::parse_from(["singular", "-vvvv"]);
        assert_eq!(args.console_verbosity(), 3);
        assert_eq!(args.log_level(), LevelFilter::Trace);

        let args = Args::parse_from(["singular", "-v", "--quiet"]);
        assert_eq!(args.console_verbosity(), 0);
        assert_eq!(args.log_level(), LevelFilter::Error);
    }

    #[test]
    fn parses_device_options() {
        let args = Args::parse_from([
            "singular",
            "--microphone",
            "2",
            "--sim-format",
            "rgb24:64x48",
            "--audio-format",
            "44100:16:s16be:2",
            "--window-size",
            "1024x768",
        ]);
        assert_eq!(args.backend, Backend::Sim);
        assert_eq!(args.microphone, Some(2));
        assert_eq!(args.sim_format, Some(VideoFormat::new(PixelFormat::Rgb24, 64, 48)));
        let format = args.audio_format.unwrap();
        assert_eq!(format.byte_order, ByteOrder::BigEndian);
        assert_eq!(format.channel_count, 2);
        assert_eq!(args.window_size, Some(Viewport::new(1024, 768)));
        assert_eq!(args.screen, Viewport::new(1920, 1080));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(parse_size("800").is_err());
        assert!(parse_size("0x600").is_err());
        assert!(parse_video_format("mpeg:10x10").is_err());
        assert!(parse_audio_format("8000:16:s16le").is_err());
        assert!(parse_audio_format("8000:12:s16le:1").is_err());
    }
}
