//! Verbosity-filtered text console shared by every sensor component.

pub mod text_stream;

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

use chrono::Local;
use log::Level;
use parking_lot::Mutex;

use crate::traits::sensor_listener::SensorListener;

/// Console verbosity levels.
pub mod verbosity {
    /// Lifecycle events: devices starting and stopping, errors.
    pub const INFO: u8 = 1;
    /// Session detail.
    pub const DEBUG: u8 = 2;
    /// Device formats and state transitions.
    pub const TRACE: u8 = 3;
}

struct ConsoleInner {
    verbosity: u8,
    capacity: usize,
    lines: Mutex<VecDeque<String>>,
    listener: Mutex<Option<Arc<dyn SensorListener>>>,
}

/// Cloneable handle to the console.
///
/// A message is kept only when its verbosity is at or below the console's
/// verbosity. Kept lines are timestamped, tagged with the calling thread,
/// mirrored to `log`, stored in a bounded history, and forwarded to the
/// listener.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

impl Console {
    pub fn new(verbosity: u8, capacity: usize) -> Self {
        Self {
            inner: Arc::new(ConsoleInner {
                verbosity,
                capacity: capacity.max(1),
                lines: Mutex::new(VecDeque::new()),
                listener: Mutex::new(None),
            }),
        }
    }

    pub fn set_listener(&self, listener: Arc<dyn SensorListener>) {
        *self.inner.listener.lock() = Some(listener);
    }

    pub fn verbosity(&self) -> u8 {
        self.inner.verbosity
    }

    /// Emit `message` if `verbose` does not exceed the console verbosity.
    pub fn output(&self, message: &str, verbose: u8) {
        if verbose == 0 || self.inner.verbosity < verbose {
            return;
        }

        let level = match verbose {
            verbosity::INFO => Level::Info,
            verbosity::DEBUG => Level::Debug,
            _ => Level::Trace,
        };
        log::log!(level, "{}", message);

        let line = format_line(message);
        {
            let mut lines = self.inner.lines.lock();
            if lines.len() == self.inner.capacity {
                lines.pop_front();
            }
            lines.push_back(line.clone());
        }

        let listener = self.inner.listener.lock().clone();
        if let Some(listener) = listener {
            listener.on_console(&line);
        }
    }

    /// Kept lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.inner.lines.lock().iter().cloned().collect()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(verbosity::INFO, 500)
    }
}

fn format_line(message: &str) -> String {
    let current = thread::current();
    let thread = match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id()),
    };
    format!("[{}] [{}] {}", Local::now().format("%H:%M:%S%.3f"), thread, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::device::DeviceKind;
    use crate::models::error::SensorError;
    use crate::models::state::SessionState;
    use crate::models::video_format::Bitmap;

    #[derive(Default)]
    struct Collector {
        lines: Mutex<Vec<String>>,
    }

    impl SensorListener for Collector {
        fn on_state_changed(&self, _: DeviceKind, _: usize, _: &SessionState) {}
        fn on_microphone_level(&self, _: usize, _: u8) {}
        fn on_camera_frame(&self, _: usize, _: &Bitmap) {}
        fn on_error(&self, _: DeviceKind, _: usize, _: &SensorError) {}
        fn on_console(&self, line: &str) {
            self.lines.lock().push(line.to_string());
        }
    }

    #[test]
    fn filters_by_verbosity() {
        let console = Console::new(verbosity::INFO, 10);
        console.output("kept", verbosity::INFO);
        console.output("dropped", verbosity::TRACE);

        let lines = console.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("kept"));
    }

    #[test]
    fn silent_console_keeps_nothing() {
        let console = Console::new(0, 10);
        console.output("hello", verbosity::INFO);
        assert!(console.lines().is_empty());
    }

    #[test]
    fn history_is_bounded() {
        let console = Console::new(verbosity::TRACE, 2);
        console.output("one", 1);
        console.output("two", 1);
        console.output("three", 1);

        let lines = console.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("two"));
        assert!(lines[1].ends_with("three"));
    }

    #[test]
    fn line_carries_timestamp_and_thread() {
        let console = Console::new(verbosity::INFO, 10);
        thread::Builder::new()
            .name("camera-0".into())
            .spawn({
                let console = console.clone();
                move || console.output("frame", verbosity::INFO)
            })
            .unwrap()
            .join()
            .unwrap();

        let line = &console.lines()[0];
        assert!(line.starts_with('['));
        assert!(line.contains("] [camera-0] frame"));
    }

    #[test]
    fn forwards_to_listener() {
        let console = Console::new(verbosity::INFO, 10);
        let collector = Arc::new(Collector::default());
        console.set_listener(collector.clone());

        console.output("hello", verbosity::INFO);

        assert_eq!(collector.lines.lock().len(), 1);
        assert_eq!(collector.lines.lock()[0], console.lines()[0]);
    }
}
