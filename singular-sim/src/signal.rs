//! Test signal synthesis for the simulated microphone.

use std::f32::consts::TAU;

use singular_core::{AudioFormat, ByteOrder, SampleType};

/// Sine tone whose loudness sweeps up and down in a triangle envelope.
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    frequency: f32,
    sample_rate: f32,
    sweep_secs: f32,
    phase: f32,
    elapsed: f32,
}

impl ToneGenerator {
    pub fn new(frequency: f32, sample_rate: u32, sweep_secs: f32) -> Self {
        Self {
            frequency,
            sample_rate: sample_rate.max(1) as f32,
            sweep_secs: sweep_secs.max(0.001),
            phase: 0.0,
            elapsed: 0.0,
        }
    }

    /// Current envelope gain in `0.0..=1.0`.
    pub fn gain(&self) -> f32 {
        let position = (self.elapsed / self.sweep_secs) % 2.0;
        if position <= 1.0 {
            position
        } else {
            2.0 - position
        }
    }

    /// Next sample in `-1.0..=1.0`.
    pub fn next_sample(&mut self) -> f32 {
        let value = self.phase.sin() * self.gain();
        self.phase = (self.phase + TAU * self.frequency / self.sample_rate) % TAU;
        self.elapsed += 1.0 / self.sample_rate;
        value
    }

    /// Render `frames` frames in `format`, the same value on every channel.
    pub fn render(&mut self, frames: usize, format: &AudioFormat) -> Vec<u8> {
        let mut out = Vec::with_capacity(frames * format.frame_bytes());
        for _ in 0..frames {
            let value = self.next_sample();
            for _ in 0..format.channel_count {
                encode_sample(value, format, &mut out);
            }
        }
        out
    }
}

/// Append `value` (`-1.0..=1.0`) to `out` as one PCM sample in `format`.
///
/// Unsigned encodings are offset so that silence sits at mid-scale.
/// Encodings without an integer layout are written as little- or
/// big-endian `f32` when 32 bits wide, and as zero bytes otherwise.
pub fn encode_sample(value: f32, format: &AudioFormat, out: &mut Vec<u8>) {
    let value = value.clamp(-1.0, 1.0);
    let big = format.byte_order == ByteOrder::BigEndian;

    match (format.sample_size, format.sample_type) {
        (8, SampleType::SignedInt) => out.push(((value * i8::MAX as f32) as i8) as u8),
        (8, SampleType::UnsignedInt) => out.push(((value + 1.0) * 0.5 * u8::MAX as f32) as u8),
        (16, SampleType::SignedInt) => {
            let v = (value * i16::MAX as f32) as i16;
            out.extend_from_slice(&if big { v.to_be_bytes() } else { v.to_le_bytes() });
        }
        (16, SampleType::UnsignedInt) => {
            let v = ((value + 1.0) * 0.5 * u16::MAX as f32) as u16;
            out.extend_from_slice(&if big { v.to_be_bytes() } else { v.to_le_bytes() });
        }
        (32, SampleType::Float) => {
            out.extend_from_slice(&if big { value.to_be_bytes() } else { value.to_le_bytes() });
        }
        _ => out.extend(std::iter::repeat(0u8).take(format.sample_bytes())),
    }
}
