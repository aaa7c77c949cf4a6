//! Backend primitives the services are built on.

pub mod headless;
#[cfg(feature = "sdl2")]
pub mod sdl;

pub use headless::{HeadlessLimits, HeadlessPlatform};
#[cfg(feature = "sdl2")]
pub use sdl::Sdl2Platform;

use thiserror::Error;

use crate::config::Settings;
use crate::display::DisplayMode;

/// Failure reported by a backend primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct PlatformError {
    pub operation: &'static str,
    pub message: String,
}

impl PlatformError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Audio device parameters requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioRequest {
    pub frequency: i32,
    pub channels: u8,
    pub buffer: u16,
}

impl AudioRequest {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            frequency: settings.audio_frequency,
            channels: settings.audio_channels,
            buffer: settings.audio_buffer,
        }
    }
}

/// Input device parameters requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRequest {
    pub joysticks: bool,
}

impl InputRequest {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            joysticks: settings.joysticks,
        }
    }
}

/// Windowing, rendering, audio and input primitives of one backend.
///
/// Every `init`/`create`/`open` hands out an owned handle and the matching
/// `quit`/`destroy`/`close` consumes it. Callers destroy a context before the
/// window it was created for.
pub trait Platform {
    type System;
    type Window;
    type Context;
    type Audio;
    type Input;

    /// Short backend label used in log output.
    fn name(&self) -> &'static str;

    fn init_system(&mut self) -> Result<Self::System, PlatformError>;
    fn quit_system(&mut self, system: Self::System) -> Result<(), PlatformError>;

    fn create_window(&mut self, mode: &DisplayMode) -> Result<Self::Window, PlatformError>;
    fn create_context(
        &mut self,
        window: &Self::Window,
        mode: &DisplayMode,
    ) -> Result<Self::Context, PlatformError>;
    fn destroy_context(&mut self, context: Self::Context) -> Result<(), PlatformError>;
    fn destroy_window(&mut self, window: Self::Window) -> Result<(), PlatformError>;

    fn open_audio(&mut self, request: &AudioRequest) -> Result<Self::Audio, PlatformError>;
    fn close_audio(&mut self, audio: Self::Audio) -> Result<(), PlatformError>;

    fn open_input(&mut self, request: &InputRequest) -> Result<Self::Input, PlatformError>;
    fn close_input(&mut self, input: Self::Input) -> Result<(), PlatformError>;

    /// Human readable description of an opened audio device.
    fn describe_audio(&self, _audio: &Self::Audio) -> Option<String> {
        None
    }

    /// Human readable description of the opened input devices.
    fn describe_input(&self, _input: &Self::Input) -> Option<String> {
        None
    }
}
