//! Singular - live microphone levels and camera frames in the terminal
//!
//! Lists the sensors of a backend, meters the selected microphone, shows
//! a summary of every camera stream, and echoes typed lines through the
//! text stream. Window geometry is kept in the settings file between runs.

mod app;
mod cli;
mod listener;
mod view;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use log::{error, info};
use singular_core::{DeviceCatalog, SensorConfiguration, SettingsStore, WindowState};
use singular_sim::SimulatedCatalog;

use app::{App, RunOptions};
use cli::{Args, Backend};

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_logging(&args);

    info!("Starting Singular");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("singular: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let path = settings_path(args)?;
    let mut store = SettingsStore::load(path).map_err(|e| e.to_string())?;
    info!("Settings: {}", store.path().display());

    let mut window = WindowState::load(&store, args.screen);
    if let Some(size) = args.window_size {
        window.width = size.width;
        window.height = size.height;
    }
    if args.maximized {
        window.maximized = true;
    }
    if !args.quiet {
        println!(
            "Window {}x{} at ({}, {}){}",
            window.width,
            window.height,
            window.position.0,
            window.position.1,
            if window.maximized { ", maximized" } else { "" }
        );
    }

    let config = SensorConfiguration {
        verbosity: args.console_verbosity(),
        enable_cameras: !args.no_cameras,
        enable_microphone: !args.no_microphone,
        enable_text_stream: true,
        microphone_format: args.audio_format.clone(),
        ..SensorConfiguration::default()
    };

    match args.backend {
        Backend::Sim => run_hub(sim_catalog(args), config, args)?,
        Backend::Windows => run_windows(config, args)?,
    }

    window.save(&mut store);
    store.save().map_err(|e| e.to_string())
}

fn run_hub<C: DeviceCatalog>(catalog: C, config: SensorConfiguration, args: &Args) -> Result<(), String> {
    let (tx, rx) = mpsc::channel();
    let options = RunOptions {
        duration: (args.seconds > 0).then(|| Duration::from_secs(args.seconds)),
        microphone: args.microphone,
        meter_width: args.meter_width,
        show_status: !args.quiet,
    };
    app::spawn_input_reader(tx.clone())?;
    App::new(catalog, config, tx, rx, options)?.run()
}

#[cfg(target_os = "windows")]
fn run_windows(config: SensorConfiguration, args: &Args) -> Result<(), String> {
    run_hub(singular_windows::WindowsCatalog::new(), config, args)
}

#[cfg(not(target_os = "windows"))]
fn run_windows(_config: SensorConfiguration, _args: &Args) -> Result<(), String> {
    Err("the windows backend is only available on Windows".into())
}

fn sim_catalog(args: &Args) -> SimulatedCatalog {
    let mut catalog = SimulatedCatalog::standard();
    if let Some(count) = args.sim_cameras {
        catalog = catalog.keep_cameras(count);
    }
    if let Some(format) = args.sim_format {
        catalog = catalog.force_camera_format(format);
    }
    if let Some(frames) = args.sim_glitch_after {
        catalog = catalog.with_glitch_after(frames);
    }
    catalog
}

fn settings_path(args: &Args) -> Result<PathBuf, String> {
    if let Some(ref path) = args.settings {
        return Ok(path.clone());
    }
    dirs_next::config_dir()
        .map(|dir| dir.join("singular").join("settings.json"))
        .ok_or_else(|| "no config directory; pass --settings".to_string())
}
