use std::time::Instant;

use log::{debug, info};

use super::{AudioRequest, InputRequest, Platform, PlatformError};
use crate::display::DisplayMode;

/// Capabilities of the simulated display and devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessLimits {
    /// Whether windows can be created at all.
    pub display: bool,
    /// Highest antialiasing level a context can be created with.
    pub max_antialiasing: u8,
    pub fullscreen: bool,
    pub audio: bool,
    pub input: bool,
    pub joysticks: u32,
}

impl Default for HeadlessLimits {
    fn default() -> Self {
        Self {
            display: true,
            max_antialiasing: crate::config::MAX_ANTIALIASING,
            fullscreen: true,
            audio: true,
            input: true,
            joysticks: 0,
        }
    }
}

/// Backend that produces no output; used without a display and in tests.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    limits: HeadlessLimits,
    open_windows: u32,
    open_contexts: u32,
}

#[derive(Debug)]
pub struct HeadlessSystem {
    started: Instant,
}

impl HeadlessSystem {
    pub fn ticks(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

#[derive(Debug)]
pub struct HeadlessWindow {
    pub mode: DisplayMode,
}

#[derive(Debug)]
pub struct HeadlessContext {
    pub samples: u8,
}

#[derive(Debug)]
pub struct HeadlessAudio {
    pub request: AudioRequest,
}

#[derive(Debug)]
pub struct HeadlessInput {
    pub joysticks: u32,
}

impl HeadlessPlatform {
    pub fn new(limits: HeadlessLimits) -> Self {
        Self {
            limits,
            open_windows: 0,
            open_contexts: 0,
        }
    }

    pub fn limits(&self) -> HeadlessLimits {
        self.limits
    }

    /// Number of windows created and not yet destroyed.
    pub fn open_windows(&self) -> u32 {
        self.open_windows
    }

    /// Number of contexts created and not yet destroyed.
    pub fn open_contexts(&self) -> u32 {
        self.open_contexts
    }
}

impl Platform for HeadlessPlatform {
    type System = HeadlessSystem;
    type Window = HeadlessWindow;
    type Context = HeadlessContext;
    type Audio = HeadlessAudio;
    type Input = HeadlessInput;

    fn name(&self) -> &'static str {
        "headless"
    }

    fn init_system(&mut self) -> Result<Self::System, PlatformError> {
        info!("headless timer and event layer started");
        Ok(HeadlessSystem {
            started: Instant::now(),
        })
    }

    fn quit_system(&mut self, system: Self::System) -> Result<(), PlatformError> {
        debug!("headless system stopped after {}ms", system.ticks());
        Ok(())
    }

    fn create_window(&mut self, mode: &DisplayMode) -> Result<Self::Window, PlatformError> {
        if !self.limits.display {
            return Err(PlatformError::new("create window", "no display available"));
        }
        if mode.fullscreen && !self.limits.fullscreen {
            return Err(PlatformError::new(
                "create window",
                "fullscreen is not available",
            ));
        }
        self.open_windows += 1;
        Ok(HeadlessWindow { mode: *mode })
    }

    fn create_context(
        &mut self,
        _window: &Self::Window,
        mode: &DisplayMode,
    ) -> Result<Self::Context, PlatformError> {
        if mode.antialiasing > self.limits.max_antialiasing {
            return Err(PlatformError::new(
                "create context",
                format!("{} samples are not supported", mode.samples()),
            ));
        }
        self.open_contexts += 1;
        Ok(HeadlessContext {
            samples: mode.samples(),
        })
    }

    fn destroy_context(&mut self, _context: Self::Context) -> Result<(), PlatformError> {
        self.open_contexts = self.open_contexts.saturating_sub(1);
        Ok(())
    }

    fn destroy_window(&mut self, _window: Self::Window) -> Result<(), PlatformError> {
        self.open_windows = self.open_windows.saturating_sub(1);
        Ok(())
    }

    fn open_audio(&mut self, request: &AudioRequest) -> Result<Self::Audio, PlatformError> {
        if !self.limits.audio {
            return Err(PlatformError::new("open audio", "no audio device"));
        }
        Ok(HeadlessAudio { request: *request })
    }

    fn close_audio(&mut self, _audio: Self::Audio) -> Result<(), PlatformError> {
        Ok(())
    }

    fn open_input(&mut self, request: &InputRequest) -> Result<Self::Input, PlatformError> {
        if !self.limits.input {
            return Err(PlatformError::new("open input", "no input subsystem"));
        }
        let joysticks = if request.joysticks {
            self.limits.joysticks
        } else {
            0
        };
        Ok(HeadlessInput { joysticks })
    }

    fn close_input(&mut self, _input: Self::Input) -> Result<(), PlatformError> {
        Ok(())
    }

    fn describe_audio(&self, audio: &Self::Audio) -> Option<String> {
        Some(format!(
            "{}Hz, {} channel(s), {} sample buffer",
            audio.request.frequency, audio.request.channels, audio.request.buffer
        ))
    }

    fn describe_input(&self, input: &Self::Input) -> Option<String> {
        Some(format!("{} joystick(s)", input.joysticks))
    }
}
