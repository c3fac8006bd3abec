use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};
use singular_core::{
    CameraWidget, DeviceCatalog, DeviceKind, MeterWidget, SensorConfiguration, SensorHub, SessionState,
};

use crate::listener::{ChannelListener, Event};
use crate::view;

const TICK: Duration = Duration::from_millis(50);
const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// How long to run and what to draw.
pub struct RunOptions {
    /// `None` runs until stdin closes or the user quits.
    pub duration: Option<Duration>,
    pub microphone: Option<usize>,
    pub meter_width: u16,
    pub show_status: bool,
}

/// Terminal rendition of the sensor window.
pub struct App<C: DeviceCatalog> {
    hub: SensorHub<C>,
    events: Receiver<Event>,
    meter: MeterWidget,
    cameras: BTreeMap<usize, CameraWidget>,
    camera_states: BTreeMap<usize, SessionState>,
    options: RunOptions,
}

impl<C: DeviceCatalog> App<C> {
    pub fn new(
        catalog: C,
        config: SensorConfiguration,
        tx: Sender<Event>,
        events: Receiver<Event>,
        options: RunOptions,
    ) -> Result<Self, String> {
        let listener = Arc::new(ChannelListener::new(tx));
        let hub = SensorHub::new(catalog, config, listener).map_err(|e| e.to_string())?;
        Ok(Self {
            hub,
            events,
            meter: MeterWidget::new(),
            cameras: BTreeMap::new(),
            camera_states: BTreeMap::new(),
            options,
        })
    }

    /// Start the devices and process events until the run ends.
    pub fn run(&mut self) -> Result<(), String> {
        self.hub.start().map_err(|e| e.to_string())?;
        if let Some(index) = self.options.microphone {
            if let Err(e) = self.hub.switch_microphone(index) {
                warn!("Cannot open microphone {}: {}", index, e);
            }
        }
        self.print_devices();

        let deadline = self.options.duration.map(|d| Instant::now() + d);
        let mut next_status = Instant::now() + STATUS_INTERVAL;

        loop {
            match self.events.recv_timeout(TICK) {
                Ok(Event::Input(line)) => {
                    if !self.handle_input(line.trim()) {
                        break;
                    }
                }
                Ok(Event::InputClosed) => {
                    if deadline.is_none() {
                        info!("Input closed, shutting down");
                        break;
                    }
                }
                Ok(event) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            let now = Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                break;
            }
            if now >= next_status {
                self.print_status();
                next_status = now + STATUS_INTERVAL;
            }
        }

        self.hub.stop_all();
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        Ok(())
    }

    /// Returns `false` when the user asked to quit.
    fn handle_input(&mut self, line: &str) -> bool {
        match line.split_once(' ').unwrap_or((line, "")) {
            (":quit" | ":q", _) => return false,
            (":devices", _) => self.print_devices(),
            (":mic", index) => match index.trim().parse::<usize>() {
                Ok(index) => match self.hub.switch_microphone(index) {
                    Ok(()) => self.meter.set_level(0),
                    Err(e) => println!("Cannot open microphone {}: {}", index, e),
                },
                Err(_) => println!("Usage: :mic <index>"),
            },
            _ if line.is_empty() => {}
            _ => self.hub.text(line),
        }
        true
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Level { session_id, level } => {
                if self.hub.microphone_session_id() == Some(session_id) {
                    self.meter.set_level(level);
                }
            }
            Event::Frame { session_id, frame } => {
                self.cameras.entry(session_id).or_default().update_frame(frame);
            }
            Event::State {
                kind: DeviceKind::Camera,
                session_id,
                state,
            } => {
                self.camera_states.insert(session_id, state);
            }
            Event::State { state, .. } => {
                if !state.is_active() {
                    self.meter.set_level(0);
                }
            }
            Event::Error {
                kind,
                session_id,
                error,
            } => {
                warn!("{:?} session {} failed: {}", kind, session_id, error);
            }
            Event::Console(line) => println!("{}", line),
            Event::Input(_) | Event::InputClosed => {}
        }
    }

    fn print_devices(&self) {
        let speakers = self.hub.list_speakers().unwrap_or_else(|e| {
            warn!("Cannot list speakers: {}", e);
            Vec::new()
        });
        let lines = view::device_lines("Cameras", self.hub.camera_devices(), None)
            .into_iter()
            .chain(view::device_lines(
                "Microphones",
                self.hub.microphone_devices(),
                self.hub.selected_microphone(),
            ))
            .chain(view::device_lines("Speakers", &speakers, None));
        for line in lines {
            println!("{}", line);
        }
    }

    fn print_status(&self) {
        if !self.options.show_status {
            return;
        }
        if let Some(session) = self.hub.microphone_session() {
            let meter = if session.is_metering() {
                view::meter_line(&self.meter, self.options.meter_width)
            } else {
                "(no meter for this format)".to_string()
            };
            println!("Microphone ({}): {}", session.device().name, meter);
        }
        let no_frames = CameraWidget::new();
        for (id, device) in self.hub.camera_devices().iter().enumerate() {
            let widget = self.cameras.get(&id).unwrap_or(&no_frames);
            println!("{}", view::camera_line(id, device, widget, self.camera_states.get(&id)));
        }
    }
}

/// Forward stdin lines to the event loop on a detached thread.
pub fn spawn_input_reader(tx: Sender<Event>) -> Result<(), String> {
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(Event::Input(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!("Cannot read stdin: {}", e);
                        break;
                    }
                }
            }
            let _ = tx.send(Event::InputClosed);
        })
        .map(|_| ())
        .map_err(|e| format!("failed to spawn input thread: {}", e))
}
