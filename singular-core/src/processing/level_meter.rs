use crate::models::audio_format::{AudioFormat, ByteOrder, SampleType};

/// Decodes the magnitude of one sample from its raw bytes.
type SampleDecoder = fn(&[u8]) -> u16;

/// Peak level meter for raw integer PCM buffers.
///
/// Scans every sample of every frame in a buffer, keeps the single
/// largest magnitude across all channels, and maps it to `0..=100`
/// relative to the format's peak amplitude.
///
/// Formats without a peak amplitude (float samples, depths other than
/// 8 or 16 bits) leave the meter disabled: `level()` returns `None`.
#[derive(Debug, Clone)]
pub struct LevelMeter {
    format: AudioFormat,
    peak_amplitude: u16,
    decoder: Option<SampleDecoder>,
}

impl LevelMeter {
    pub fn new(format: AudioFormat) -> Self {
        let peak_amplitude = format.peak_amplitude();
        let decoder = if peak_amplitude == 0 {
            None
        } else {
            decoder_for(&format)
        };
        Self {
            format,
            peak_amplitude,
            decoder,
        }
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    pub fn peak_amplitude(&self) -> u16 {
        self.peak_amplitude
    }

    /// Whether buffers in this format can be metered at all.
    pub fn is_enabled(&self) -> bool {
        self.decoder.is_some() && self.format.channel_count > 0
    }

    /// Largest sample magnitude in `data`, unclamped.
    ///
    /// Only whole frames are scanned; a trailing partial frame is ignored.
    /// Returns 0 when the meter is disabled.
    pub fn scan_peak(&self, data: &[u8]) -> u16 {
        let Some(decode) = self.decoder else {
            return 0;
        };
        let frame_bytes = self.format.frame_bytes();
        if frame_bytes == 0 {
            return 0;
        }
        let whole = data.len() / frame_bytes * frame_bytes;

        data[..whole]
            .chunks_exact(self.format.sample_bytes())
            .map(decode)
            .max()
            .unwrap_or(0)
    }

    /// Level of `data` in `0..=100`, or `None` if the meter is disabled.
    pub fn level(&self, data: &[u8]) -> Option<u8> {
        if !self.is_enabled() {
            return None;
        }
        Some(normalize(self.scan_peak(data), self.peak_amplitude))
    }
}

/// Map a magnitude to a percentage of `peak_amplitude`.
///
/// The magnitude is clamped to the peak first: the absolute value of the
/// most negative signed sample is one larger than the signed peak.
pub fn normalize(magnitude: u16, peak_amplitude: u16) -> u8 {
    if peak_amplitude == 0 {
        return 0;
    }
    let clamped = magnitude.min(peak_amplitude) as u32;
    (clamped * 100 / peak_amplitude as u32) as u8
}

fn decoder_for(format: &AudioFormat) -> Option<SampleDecoder> {
    let decoder: SampleDecoder = match (format.sample_size, format.sample_type, format.byte_order) {
        (8, SampleType::UnsignedInt, _) => decode_u8,
        (8, SampleType::SignedInt, _) => decode_i8,
        (16, SampleType::UnsignedInt, ByteOrder::LittleEndian) => decode_u16_le,
        (16, SampleType::UnsignedInt, ByteOrder::BigEndian) => decode_u16_be,
        (16, SampleType::SignedInt, ByteOrder::LittleEndian) => decode_i16_le,
        (16, SampleType::SignedInt, ByteOrder::BigEndian) => decode_i16_be,
        _ => return None,
    };
    Some(decoder)
}

fn decode_u8(b: &[u8]) -> u16 {
    b[0] as u16
}

fn decode_i8(b: &[u8]) -> u16 {
    (b[0] as i8).unsigned_abs() as u16
}

fn decode_u16_le(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn decode_u16_be(b: &[u8]) -> u16 {
    u16::from_be_bytes([b[0], b[1]])
}

fn decode_i16_le(b: &[u8]) -> u16 {
    i16::from_le_bytes([b[0], b[1]]).unsigned_abs()
}

fn decode_i16_be(b: &[u8]) -> u16 {
    i16::from_be_bytes([b[0], b[1]]).unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(sample_size: u16, sample_type: SampleType, byte_order: ByteOrder, channels: u16) -> AudioFormat {
        AudioFormat::new(48000, sample_size, sample_type, byte_order, channels)
    }

    #[test]
    fn single_full_scale_byte_is_100() {
        let meter = LevelMeter::new(format(8, SampleType::UnsignedInt, ByteOrder::LittleEndian, 1));
        let mut data = vec![0u8; 64];
        data[17] = 0xFF;
        assert_eq!(meter.level(&data), Some(100));
    }

    #[test]
    fn silence_is_zero_in_every_format() {
        let data = vec![0u8; 32];
        for (bits, sample_type) in [
            (8, SampleType::UnsignedInt),
            (8, SampleType::SignedInt),
            (16, SampleType::UnsignedInt),
            (16, SampleType::SignedInt),
        ] {
            for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
                for channels in [1, 2] {
                    let meter = LevelMeter::new(format(bits, sample_type, order, channels));
                    assert_eq!(meter.level(&data), Some(0));
                }
            }
        }
    }

    #[test]
    fn most_negative_signed_sample_clamps_to_100() {
        let meter = LevelMeter::new(format(16, SampleType::SignedInt, ByteOrder::LittleEndian, 1));
        let data = [0x00, 0x80];
        assert_eq!(meter.scan_peak(&data), 32768);
        assert_eq!(meter.level(&data), Some(100));
    }

    #[test]
    fn most_negative_signed_byte_clamps_to_100() {
        let meter = LevelMeter::new(format(8, SampleType::SignedInt, ByteOrder::LittleEndian, 1));
        assert_eq!(meter.level(&[0x80]), Some(100));
        // -64 → 64 * 100 / 127
        assert_eq!(meter.level(&[0xC0]), Some(50));
    }

    #[test]
    fn signed_big_endian_samples() {
        let meter = LevelMeter::new(format(16, SampleType::SignedInt, ByteOrder::BigEndian, 1));
        assert_eq!(meter.scan_peak(&[0x80, 0x00]), 32768);
        assert_eq!(meter.level(&[0x80, 0x00]), Some(100));
        // -16384 → 16384 * 100 / 32767
        assert_eq!(meter.level(&[0xC0, 0x00]), Some(50));
        assert_eq!(meter.level(&[0x40, 0x00]), Some(50));
        assert_eq!(meter.level(&[0x00, 0x40]), Some(0));
    }

    #[test]
    fn stereo_signed_little_endian_scenario() {
        let meter = LevelMeter::new(format(16, SampleType::SignedInt, ByteOrder::LittleEndian, 2));
        // frame 1: (0x0000, 0x0000), frame 2: (0x4000, 0x0000)
        let data = [0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00];
        assert_eq!(meter.peak_amplitude(), 32767);
        assert_eq!(meter.scan_peak(&data), 16384);
        assert_eq!(meter.level(&data), Some(50));
    }

    #[test]
    fn byte_order_is_respected() {
        let little = LevelMeter::new(format(16, SampleType::UnsignedInt, ByteOrder::LittleEndian, 1));
        let big = LevelMeter::new(format(16, SampleType::UnsignedInt, ByteOrder::BigEndian, 1));
        let data = [0x80, 0x00];

        assert_eq!(little.scan_peak(&data), 0x0080);
        assert_eq!(big.scan_peak(&data), 0x8000);
        assert_eq!(big.level(&data), Some(50));
        assert_eq!(little.level(&data), Some(0));
    }

    #[test]
    fn peak_is_global_across_channels() {
        let meter = LevelMeter::new(format(8, SampleType::UnsignedInt, ByteOrder::LittleEndian, 3));
        // Loudest sample sits in the last channel of the second frame.
        let data = [10, 20, 30, 5, 6, 200];
        assert_eq!(meter.scan_peak(&data), 200);
    }

    #[test]
    fn trailing_partial_frame_is_ignored() {
        let meter = LevelMeter::new(format(16, SampleType::SignedInt, ByteOrder::LittleEndian, 2));
        // One whole frame of silence, then two bytes of a loud partial frame.
        let data = [0, 0, 0, 0, 0xFF, 0x7F];
        assert_eq!(meter.level(&data), Some(0));
        assert_eq!(meter.level(&[0xFF]), Some(0));
    }

    #[test]
    fn unsupported_encodings_disable_metering() {
        let deep = LevelMeter::new(format(24, SampleType::SignedInt, ByteOrder::LittleEndian, 1));
        assert!(!deep.is_enabled());
        assert_eq!(deep.level(&[0xFF; 12]), None);

        let float = LevelMeter::new(format(32, SampleType::Float, ByteOrder::LittleEndian, 2));
        assert!(!float.is_enabled());
        assert_eq!(float.level(&[0xFF; 16]), None);
    }

    #[test]
    fn normalize_bounds() {
        assert_eq!(normalize(0, 255), 0);
        assert_eq!(normalize(255, 255), 100);
        assert_eq!(normalize(u16::MAX, u16::MAX), 100);
        assert_eq!(normalize(500, 255), 100);
        assert_eq!(normalize(10, 0), 0);
    }
}
