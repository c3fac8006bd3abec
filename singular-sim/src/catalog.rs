use std::time::Duration;

use singular_core::{
    AudioFormat, AudioInputProvider, ByteOrder, CameraProvider, DeviceCatalog, DeviceInfo,
    DeviceKind, PixelFormat, SampleType, SensorError, VideoFormat,
};

use crate::pattern_camera::{PatternCamera, PatternSettings};
use crate::tone_mic::{ToneMicrophone, ToneSettings};

/// One simulated camera and how it streams.
#[derive(Debug, Clone)]
pub struct SimCamera {
    pub info: DeviceInfo,
    pub settings: PatternSettings,
}

/// One simulated microphone and its tone.
#[derive(Debug, Clone)]
pub struct SimMicrophone {
    pub info: DeviceInfo,
    pub settings: ToneSettings,
}

/// Fixed set of simulated devices.
#[derive(Debug, Clone, Default)]
pub struct SimulatedCatalog {
    cameras: Vec<SimCamera>,
    microphones: Vec<SimMicrophone>,
    speakers: Vec<DeviceInfo>,
}

impl SimulatedCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The stock device set: two cameras, three microphones and two speakers.
    ///
    /// The first camera only offers a YUV format the display cannot draw
    /// directly, the second one streams RGB. The third microphone delivers
    /// float samples, which cannot be metered.
    pub fn standard() -> Self {
        Self::empty()
            .with_camera(SimCamera {
                info: DeviceInfo::new("sim-camera-0", "Simulated YUV Camera", DeviceKind::Camera, false),
                settings: PatternSettings {
                    formats: vec![
                        VideoFormat::new(PixelFormat::Yuyv, 640, 480),
                        VideoFormat::new(PixelFormat::Nv12, 640, 480),
                    ],
                    ..PatternSettings::default()
                },
            })
            .with_camera(SimCamera {
                info: DeviceInfo::new("sim-camera-1", "Simulated RGB Camera", DeviceKind::Camera, true),
                settings: PatternSettings::default(),
            })
            .with_microphone(SimMicrophone {
                info: DeviceInfo::new("sim-mic-0", "Simulated Stereo Tone", DeviceKind::Microphone, true),
                settings: ToneSettings::default(),
            })
            .with_microphone(SimMicrophone {
                info: DeviceInfo::new("sim-mic-1", "Simulated 8-bit Tone", DeviceKind::Microphone, false),
                settings: ToneSettings {
                    preferred: AudioFormat::new(8000, 8, SampleType::SignedInt, ByteOrder::LittleEndian, 1),
                    frequency: 220.0,
                    sweep_secs: 1.0,
                    ..ToneSettings::default()
                },
            })
            .with_microphone(SimMicrophone {
                info: DeviceInfo::new("sim-mic-2", "Simulated Float Tone", DeviceKind::Microphone, false),
                settings: ToneSettings {
                    preferred: AudioFormat::new(48000, 32, SampleType::Float, ByteOrder::LittleEndian, 2),
                    ..ToneSettings::default()
                },
            })
            .with_speaker(DeviceInfo::new("sim-speaker-0", "Simulated Speakers", DeviceKind::Speaker, true))
            .with_speaker(DeviceInfo::new("sim-speaker-1", "Simulated Headphones", DeviceKind::Speaker, false))
    }

    pub fn with_camera(mut self, camera: SimCamera) -> Self {
        self.cameras.push(camera);
        self
    }

    pub fn with_microphone(mut self, microphone: SimMicrophone) -> Self {
        self.microphones.push(microphone);
        self
    }

    pub fn with_speaker(mut self, speaker: DeviceInfo) -> Self {
        self.speakers.push(speaker);
        self
    }

    /// Stream every camera in `format` only.
    pub fn force_camera_format(mut self, format: VideoFormat) -> Self {
        for camera in &mut self.cameras {
            camera.settings.formats = vec![format];
        }
        self
    }

    /// Make every camera send one wrong-sized frame after `frames` frames.
    pub fn with_glitch_after(mut self, frames: u64) -> Self {
        for camera in &mut self.cameras {
            camera.settings.glitch_after = Some(frames);
        }
        self
    }

    /// Drop all but the first `count` cameras.
    pub fn keep_cameras(mut self, count: usize) -> Self {
        self.cameras.truncate(count);
        self
    }

    /// Change the pacing of every simulated device.
    pub fn with_intervals(mut self, frame: Duration, buffer: Duration) -> Self {
        for camera in &mut self.cameras {
            camera.settings.frame_interval = frame;
        }
        for microphone in &mut self.microphones {
            microphone.settings.buffer_interval = buffer;
        }
        self
    }
}

impl DeviceCatalog for SimulatedCatalog {
    fn cameras(&self) -> Result<Vec<DeviceInfo>, SensorError> {
        Ok(self.cameras.iter().map(|c| c.info.clone()).collect())
    }

    fn microphones(&self) -> Result<Vec<DeviceInfo>, SensorError> {
        Ok(self.microphones.iter().map(|m| m.info.clone()).collect())
    }

    fn speakers(&self) -> Result<Vec<DeviceInfo>, SensorError> {
        Ok(self.speakers.clone())
    }

    fn open_camera(&self, device: &DeviceInfo) -> Result<Box<dyn CameraProvider>, SensorError> {
        let camera = self
            .cameras
            .iter()
            .find(|c| c.info.id == device.id)
            .ok_or(SensorError::DeviceNotAvailable)?;
        Ok(Box::new(PatternCamera::new(camera.info.clone(), camera.settings.clone())))
    }

    fn open_microphone(&self, device: &DeviceInfo) -> Result<Box<dyn AudioInputProvider>, SensorError> {
        let microphone = self
            .microphones
            .iter()
            .find(|m| m.info.id == device.id)
            .ok_or(SensorError::DeviceNotAvailable)?;
        Ok(Box::new(ToneMicrophone::new(microphone.info.clone(), microphone.settings.clone())))
    }
}
