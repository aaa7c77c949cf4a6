//! The platform subsystems the engine brings up, each wrapping one pair of
//! backend primitives.

use log::info;

use crate::config::Settings;
use crate::display::{Display, DisplayNegotiator};
use crate::error::ServiceError;
use crate::platform::{AudioRequest, InputRequest, Platform, PlatformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    NotAcquired,
    Acquired,
    Released,
}

/// A platform subsystem with an acquire and a release step.
///
/// The engine calls `release` at most once, and only after a successful
/// `acquire`.
pub trait Service<P: Platform> {
    fn name(&self) -> &'static str;

    fn acquire(&mut self, platform: &mut P, settings: &mut Settings) -> Result<(), ServiceError>;

    fn release(&mut self, platform: &mut P) -> Result<(), PlatformError>;

    /// One-line summary of the acquired resource.
    fn describe(&self, _platform: &P) -> Option<String> {
        None
    }
}

/// The services every engine brings up, in acquisition order.
pub fn standard_services<P: Platform + 'static>() -> Vec<Box<dyn Service<P>>> {
    vec![
        Box::new(SystemService::<P>::default()),
        Box::new(VideoService::<P>::default()),
        Box::new(AudioService::<P>::default()),
        Box::new(InputService::<P>::default()),
    ]
}

/// Timer and event layer.
pub struct SystemService<P: Platform> {
    handle: Option<P::System>,
}

impl<P: Platform> Default for SystemService<P> {
    fn default() -> Self {
        Self { handle: None }
    }
}

impl<P: Platform> SystemService<P> {
    pub fn handle(&self) -> Option<&P::System> {
        self.handle.as_ref()
    }
}

impl<P: Platform> Service<P> for SystemService<P> {
    fn name(&self) -> &'static str {
        "system"
    }

    fn acquire(&mut self, platform: &mut P, _settings: &mut Settings) -> Result<(), ServiceError> {
        self.handle = Some(platform.init_system()?);
        Ok(())
    }

    fn release(&mut self, platform: &mut P) -> Result<(), PlatformError> {
        match self.handle.take() {
            Some(handle) => platform.quit_system(handle),
            None => Ok(()),
        }
    }

    fn describe(&self, platform: &P) -> Option<String> {
        self.handle
            .as_ref()
            .map(|_| format!("{} timer and events", platform.name()))
    }
}

/// Window and rendering context, opened through display negotiation.
pub struct VideoService<P: Platform> {
    display: Option<Display<P::Window, P::Context>>,
}

impl<P: Platform> Default for VideoService<P> {
    fn default() -> Self {
        Self { display: None }
    }
}

impl<P: Platform> VideoService<P> {
    pub fn display(&self) -> Option<&Display<P::Window, P::Context>> {
        self.display.as_ref()
    }
}

impl<P: Platform> Service<P> for VideoService<P> {
    fn name(&self) -> &'static str {
        "video"
    }

    fn acquire(&mut self, platform: &mut P, settings: &mut Settings) -> Result<(), ServiceError> {
        let mut negotiator = DisplayNegotiator::new(settings);
        let display = negotiator.open(platform, settings)?;
        info!(
            "display open at {} after {} attempt(s)",
            display.mode(),
            display.attempts()
        );
        self.display = Some(display);
        Ok(())
    }

    fn release(&mut self, platform: &mut P) -> Result<(), PlatformError> {
        match self.display.take() {
            Some(display) => display.close(platform),
            None => Ok(()),
        }
    }

    fn describe(&self, _platform: &P) -> Option<String> {
        self.display.as_ref().map(|display| {
            format!(
                "{} after {} attempt(s)",
                display.mode(),
                display.attempts()
            )
        })
    }
}

/// Audio output device.
pub struct AudioService<P: Platform> {
    device: Option<P::Audio>,
}

impl<P: Platform> Default for AudioService<P> {
    fn default() -> Self {
        Self { device: None }
    }
}

impl<P: Platform> Service<P> for AudioService<P> {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn acquire(&mut self, platform: &mut P, settings: &mut Settings) -> Result<(), ServiceError> {
        let request = AudioRequest::from_settings(settings);
        self.device = Some(platform.open_audio(&request)?);
        Ok(())
    }

    fn release(&mut self, platform: &mut P) -> Result<(), PlatformError> {
        match self.device.take() {
            Some(device) => platform.close_audio(device),
            None => Ok(()),
        }
    }

    fn describe(&self, platform: &P) -> Option<String> {
        self.device
            .as_ref()
            .and_then(|device| platform.describe_audio(device))
    }
}

/// Joysticks, game controllers and haptic devices.
pub struct InputService<P: Platform> {
    devices: Option<P::Input>,
}

impl<P: Platform> Default for InputService<P> {
    fn default() -> Self {
        Self { devices: None }
    }
}

impl<P: Platform> Service<P> for InputService<P> {
    fn name(&self) -> &'static str {
        "input"
    }

    fn acquire(&mut self, platform: &mut P, settings: &mut Settings) -> Result<(), ServiceError> {
        let request = InputRequest::from_settings(settings);
        self.devices = Some(platform.open_input(&request)?);
        Ok(())
    }

    fn release(&mut self, platform: &mut P) -> Result<(), PlatformError> {
        match self.devices.take() {
            Some(devices) => platform.close_input(devices),
            None => Ok(()),
        }
    }

    fn describe(&self, platform: &P) -> Option<String> {
        self.devices
            .as_ref()
            .and_then(|devices| platform.describe_input(devices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessLimits, HeadlessPlatform};

    #[test]
    fn standard_order_is_system_video_audio_input() {
        let names: Vec<&str> = standard_services::<HeadlessPlatform>()
            .iter()
            .map(|service| service.name())
            .collect();
        assert_eq!(names, vec!["system", "video", "audio", "input"]);
    }

    #[test]
    fn video_degrades_settings_until_a_display_opens() {
        let mut platform = HeadlessPlatform::new(HeadlessLimits {
            max_antialiasing: 0,
            fullscreen: false,
            ..HeadlessLimits::default()
        });
        let mut settings = Settings::default();
        let mut video = VideoService::<HeadlessPlatform>::default();
        video.acquire(&mut platform, &mut settings).unwrap();
        assert_eq!((settings.antialiasing, settings.fullscreen), (0, false));
        assert_eq!(video.display().unwrap().attempts(), 4);
        video.release(&mut platform).unwrap();
        assert!(video.display().is_none());
        assert_eq!(platform.open_windows(), 0);
    }

    #[test]
    fn audio_failure_carries_the_platform_cause() {
        let mut platform = HeadlessPlatform::new(HeadlessLimits {
            audio: false,
            ..HeadlessLimits::default()
        });
        let mut audio = AudioService::<HeadlessPlatform>::default();
        let err = audio
            .acquire(&mut platform, &mut Settings::default())
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Platform(PlatformError::new("open audio", "no audio device"))
        );
    }

    #[test]
    fn release_without_acquire_is_a_no_op() {
        let mut platform = HeadlessPlatform::default();
        let mut input = InputService::<HeadlessPlatform>::default();
        assert!(input.release(&mut platform).is_ok());
        assert!(input.describe(&platform).is_none());
    }
}
