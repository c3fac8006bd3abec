use super::{verbosity, Console};

/// Echoes text typed by the user into the console.
#[derive(Clone)]
pub struct TextStream {
    console: Console,
}

impl TextStream {
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    pub fn get_text(&self, message: &str) {
        self.console
            .output(&format!("Text Stream: {}", message), verbosity::INFO);
    }
}
