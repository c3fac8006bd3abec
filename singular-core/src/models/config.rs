use super::audio_format::AudioFormat;

/// Configuration for a sensor hub.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfiguration {
    /// Console verbosity, 0 (silent) to 3 (everything).
    pub verbosity: u8,

    /// Start one session per detected camera (default: true).
    pub enable_cameras: bool,

    /// Start the default microphone (default: true).
    pub enable_microphone: bool,

    /// Echo typed text into the console (default: true).
    pub enable_text_stream: bool,

    /// Request this format instead of the device's preferred one.
    pub microphone_format: Option<AudioFormat>,

    /// Console lines kept for display (default: 500).
    pub console_history: usize,
}

impl SensorConfiguration {
    pub const MAX_VERBOSITY: u8 = 3;

    pub fn validate(&self) -> Result<(), String> {
        if self.verbosity > Self::MAX_VERBOSITY {
            return Err(format!("unsupported verbosity: {}", self.verbosity));
        }
        if self.console_history == 0 {
            return Err("console history must hold at least one line".into());
        }
        if let Some(ref format) = self.microphone_format {
            format.validate()?;
        }
        Ok(())
    }
}

impl Default for SensorConfiguration {
    fn default() -> Self {
        Self {
            verbosity: 1,
            enable_cameras: true,
            enable_microphone: true,
            enable_text_stream: true,
            microphone_format: None,
            console_history: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SensorConfiguration::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_verbosity() {
        let config = SensorConfiguration {
            verbosity: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_invalid_forced_format() {
        let mut format = AudioFormat::default();
        format.channel_count = 0;
        let config = SensorConfiguration {
            microphone_format: Some(format),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
