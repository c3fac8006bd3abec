pub mod settings;
pub mod window_state;
