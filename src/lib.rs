//! Engine bootstrap layer.
//!
//! The crate brings up the platform subsystems a game needs (timer and
//! events, a window with a rendering context, audio, input devices) in a
//! fixed order and tears them down in reverse. Opening the display
//! negotiates a working mode by relaxing antialiasing and then fullscreen
//! until the backend accepts it. Backends sit behind the [`Platform`] trait
//! so the lifecycle can run headless and in tests.

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod platform;
pub mod requirement;
pub mod service;

pub use config::{DataPaths, Settings, SettingsError};
pub use display::{Display, DisplayMode, DisplayNegotiationExhausted, DisplayNegotiator};
pub use engine::Engine;
pub use error::{InitializationError, ReleaseWarning, ServiceError};
pub use platform::{HeadlessLimits, HeadlessPlatform, Platform, PlatformError};
#[cfg(feature = "sdl2")]
pub use platform::Sdl2Platform;
pub use requirement::{
    AntialiasingRequirement, FullscreenRequirement, Requirement, RequirementChain,
};
pub use service::{Service, ServiceState};
