/// Encoding of a single PCM sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    SignedInt,
    UnsignedInt,
    Float,
    Unknown,
}

/// Byte order of multi-byte samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

/// Format of the raw buffers an audio input device delivers.
///
/// Fixed once a session starts. `frame_bytes()` is the stride of one
/// interleaved frame (one sample per channel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormat {
    /// Samples per second per channel.
    pub sample_rate: u32,

    /// Bits per sample (bit depth).
    pub sample_size: u16,

    pub sample_type: SampleType,

    pub byte_order: ByteOrder,

    /// Interleaved channels per frame, at least 1.
    pub channel_count: u16,

    /// Codec identifier, always `audio/pcm` for capture devices.
    pub codec: String,
}

impl AudioFormat {
    pub fn new(
        sample_rate: u32,
        sample_size: u16,
        sample_type: SampleType,
        byte_order: ByteOrder,
        channel_count: u16,
    ) -> Self {
        Self {
            sample_rate,
            sample_size,
            sample_type,
            byte_order,
            channel_count,
            codec: "audio/pcm".into(),
        }
    }

    /// Bytes occupied by one sample.
    pub fn sample_bytes(&self) -> usize {
        self.sample_size as usize / 8
    }

    /// Bytes occupied by one frame across all channels.
    pub fn frame_bytes(&self) -> usize {
        self.sample_bytes() * self.channel_count as usize
    }

    /// Maximum representable magnitude for this encoding, or 0 when the
    /// encoding cannot be metered.
    ///
    /// Only 8-bit and 16-bit integer samples are recognized.
    pub fn peak_amplitude(&self) -> u16 {
        peak_amplitude(self.sample_size, self.sample_type)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.sample_size == 0 || self.sample_size % 8 != 0 {
            return Err(format!("unsupported sample size: {}", self.sample_size));
        }
        if self.channel_count == 0 {
            return Err("channel count must be at least 1".into());
        }
        Ok(())
    }

    /// Human-readable listing of every field, one line each.
    pub fn describe(&self) -> Vec<String> {
        let sample_type = match self.sample_type {
            SampleType::SignedInt => "SignedInt",
            SampleType::UnsignedInt => "UnSignedInt",
            SampleType::Float => "Float",
            SampleType::Unknown => "Unknown",
        };
        let byte_order = match self.byte_order {
            ByteOrder::BigEndian => "BigEndian",
            ByteOrder::LittleEndian => "LittleEndian",
        };
        vec![
            format!("Codec: {}", self.codec),
            format!("Channels: {}", self.channel_count),
            format!("Sample rate: {}", self.sample_rate),
            format!("Sample size: {}", self.sample_size),
            format!("Sample bytes: {}", self.sample_bytes()),
            format!("Channel bytes: {}", self.frame_bytes()),
            format!("Sample type: {}", sample_type),
            format!("Sample byte order: {}", byte_order),
        ]
    }
}

impl Default for AudioFormat {
    /// 8 kHz, 16-bit signed, little-endian mono.
    fn default() -> Self {
        Self::new(8000, 16, SampleType::SignedInt, ByteOrder::LittleEndian, 1)
    }
}

/// Peak amplitude for a bit depth and sample type.
///
/// ```text
///  8 bit unsigned → 255      8 bit signed → 127
/// 16 bit unsigned → 65535   16 bit signed → 32767
/// anything else   → 0
/// ```
pub fn peak_amplitude(sample_size: u16, sample_type: SampleType) -> u16 {
    match (sample_size, sample_type) {
        (8, SampleType::UnsignedInt) => u8::MAX as u16,
        (8, SampleType::SignedInt) => i8::MAX as u16,
        (16, SampleType::UnsignedInt) => u16::MAX,
        (16, SampleType::SignedInt) => i16::MAX as u16,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_amplitude_for_recognized_encodings() {
        assert_eq!(peak_amplitude(8, SampleType::UnsignedInt), 255);
        assert_eq!(peak_amplitude(8, SampleType::SignedInt), 127);
        assert_eq!(peak_amplitude(16, SampleType::UnsignedInt), 65535);
        assert_eq!(peak_amplitude(16, SampleType::SignedInt), 32767);
    }

    #[test]
    fn peak_amplitude_zero_for_unrecognized() {
        assert_eq!(peak_amplitude(24, SampleType::SignedInt), 0);
        assert_eq!(peak_amplitude(32, SampleType::Float), 0);
        assert_eq!(peak_amplitude(16, SampleType::Float), 0);
        assert_eq!(peak_amplitude(8, SampleType::Unknown), 0);
    }

    #[test]
    fn frame_stride() {
        let format = AudioFormat::new(44100, 16, SampleType::SignedInt, ByteOrder::LittleEndian, 2);
        assert_eq!(format.sample_bytes(), 2);
        assert_eq!(format.frame_bytes(), 4);
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let mut format = AudioFormat::default();
        assert!(format.validate().is_ok());

        format.channel_count = 0;
        assert!(format.validate().is_err());

        format.channel_count = 1;
        format.sample_size = 12;
        assert!(format.validate().is_err());
    }

    #[test]
    fn describe_lists_every_field() {
        let lines = AudioFormat::default().describe();
        assert_eq!(lines.len(), 8);
        assert!(lines.contains(&"Sample type: SignedInt".to_string()));
        assert!(lines.contains(&"Sample byte order: LittleEndian".to_string()));
        assert!(lines.contains(&"Channel bytes: 2".to_string()));
    }
}
