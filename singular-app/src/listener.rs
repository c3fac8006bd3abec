use std::sync::mpsc::Sender;

use singular_core::{Bitmap, DeviceKind, SensorError, SensorListener, SessionState};

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum Event {
    State { kind: DeviceKind, session_id: usize, state: SessionState },
    Level { session_id: usize, level: u8 },
    Frame { session_id: usize, frame: Bitmap },
    Error { kind: DeviceKind, session_id: usize, error: SensorError },
    Console(String),
    /// A line typed on stdin.
    Input(String),
    /// Stdin closed.
    InputClosed,
}

/// Forwards sensor events from capture threads to the main loop.
pub struct ChannelListener {
    tx: Sender<Event>,
}

impl ChannelListener {
    pub fn new(tx: Sender<Event>) -> Self {
        Self { tx }
    }

    fn send(&self, event: Event) {
        // The receiver only goes away during shutdown.
        let _ = self.tx.send(event);
    }
}

impl SensorListener for ChannelListener {
    fn on_state_changed(&self, kind: DeviceKind, session_id: usize, state: &SessionState) {
        self.send(Event::State {
            kind,
            session_id,
            state: state.clone(),
        });
    }

    fn on_microphone_level(&self, session_id: usize, level: u8) {
        self.send(Event::Level { session_id, level });
    }

    fn on_camera_frame(&self, session_id: usize, frame: &Bitmap) {
        self.send(Event::Frame {
            session_id,
            frame: frame.clone(),
        });
    }

    fn on_error(&self, kind: DeviceKind, session_id: usize, error: &SensorError) {
        self.send(Event::Error {
            kind,
            session_id,
            error: error.clone(),
        });
    }

    fn on_console(&self, line: &str) {
        self.send(Event::Console(line.to_string()));
    }
}
