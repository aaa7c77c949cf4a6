//! Window and rendering-context negotiation.
//!
//! [`DisplayNegotiator`] keeps trying to open a window/context pair with the
//! current settings. Every failed attempt relaxes the active requirement
//! chain by one step: antialiasing first, down to off, then fullscreen.
//! Negotiation ends with the first working pair or once every chain is
//! exhausted.

use std::fmt;

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::Settings;
use crate::platform::{Platform, PlatformError};
use crate::requirement::{AntialiasingRequirement, FullscreenRequirement, RequirementChain};

/// Snapshot of the settings one window/context attempt is made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub antialiasing: u8,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl DisplayMode {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            antialiasing: settings.antialiasing,
            fullscreen: settings.fullscreen,
            vsync: settings.vsync,
        }
    }

    /// Multisample count for the antialiasing level (0 when disabled).
    pub fn samples(&self) -> u8 {
        if self.antialiasing == 0 {
            0
        } else {
            1 << self.antialiasing.min(7)
        }
    }
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} {}, antialiasing {}",
            self.width,
            self.height,
            if self.fullscreen { "fullscreen" } else { "windowed" },
            self.antialiasing
        )?;
        if self.antialiasing > 0 {
            write!(f, " ({}x)", self.samples())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no working display mode after {attempts} attempt(s)")]
pub struct DisplayNegotiationExhausted {
    pub attempts: u32,
    #[source]
    pub last_failure: PlatformError,
}

/// Result of a successful negotiation.
#[derive(Debug)]
pub struct Negotiated<T> {
    pub value: T,
    pub mode: DisplayMode,
    pub attempts: u32,
}

/// An open window with the rendering context created for it.
#[derive(Debug)]
pub struct Display<W, C> {
    window: W,
    context: C,
    mode: DisplayMode,
    attempts: u32,
}

impl<W, C> Display<W, C> {
    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Number of attempts negotiation needed to open this display.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Destroys the context, then the window.
    ///
    /// The window is destroyed even when destroying the context fails; the
    /// first failure is returned.
    pub fn close<P>(self, platform: &mut P) -> Result<(), PlatformError>
    where
        P: Platform<Window = W, Context = C>,
    {
        let context = platform.destroy_context(self.context);
        let window = platform.destroy_window(self.window);
        context.and(window)
    }
}

/// Creates a window and a context for it, destroying the window again if the
/// context cannot be created.
pub fn open_display<P: Platform>(
    platform: &mut P,
    mode: &DisplayMode,
) -> Result<(P::Window, P::Context), PlatformError> {
    let window = platform.create_window(mode)?;
    match platform.create_context(&window, mode) {
        Ok(context) => Ok((window, context)),
        Err(err) => {
            if let Err(destroy) = platform.destroy_window(window) {
                warn!("unable to destroy rejected window: {destroy}");
            }
            Err(err)
        }
    }
}

/// Retry-with-degradation driver for window/context acquisition.
#[derive(Debug)]
pub struct DisplayNegotiator {
    chains: Vec<RequirementChain>,
}

impl DisplayNegotiator {
    /// Captures the current antialiasing and fullscreen values as baselines.
    pub fn new(settings: &Settings) -> Self {
        Self::with_chains(vec![
            RequirementChain::new("antialiasing").with(AntialiasingRequirement::capture(settings)),
            RequirementChain::new("fullscreen").with(FullscreenRequirement::capture(settings)),
        ])
    }

    /// Uses `chains` in the given priority order.
    pub fn with_chains(chains: Vec<RequirementChain>) -> Self {
        Self { chains }
    }

    pub fn chains(&self) -> &[RequirementChain] {
        &self.chains
    }

    /// Calls `attempt` with the mode described by `settings` until it
    /// succeeds, relaxing the settings between failures.
    ///
    /// On exhaustion `settings` is left at the most relaxed values tried.
    pub fn negotiate<T, F>(
        &mut self,
        settings: &mut Settings,
        mut attempt: F,
    ) -> Result<Negotiated<T>, DisplayNegotiationExhausted>
    where
        F: FnMut(&DisplayMode) -> Result<T, PlatformError>,
    {
        let mut chains = self.chains.iter_mut();
        let mut current = chains.next();
        let mut attempts = 0;

        loop {
            let mode = DisplayMode::from_settings(settings);
            attempts += 1;
            debug!("display attempt {attempts}: {mode}");
            let failure = match attempt(&mode) {
                Ok(value) => {
                    info!("display mode {mode} accepted after {attempts} attempt(s)");
                    return Ok(Negotiated {
                        value,
                        mode,
                        attempts,
                    });
                }
                Err(err) => err,
            };
            warn!("display mode {mode} rejected: {failure}");

            loop {
                let Some(chain) = current.as_mut() else {
                    return Err(DisplayNegotiationExhausted {
                        attempts,
                        last_failure: failure,
                    });
                };
                if chain.relax(settings) {
                    break;
                }
                debug!("{} requirements exhausted", chain.name());
                current = chains.next();
            }
        }
    }

    /// Negotiates a window/context pair on `platform`.
    pub fn open<P: Platform>(
        &mut self,
        platform: &mut P,
        settings: &mut Settings,
    ) -> Result<Display<P::Window, P::Context>, DisplayNegotiationExhausted> {
        let negotiated = self.negotiate(settings, |mode| open_display(platform, mode))?;
        let (window, context) = negotiated.value;
        Ok(Display {
            window,
            context,
            mode: negotiated.mode,
            attempts: negotiated.attempts,
        })
    }

    /// Writes the baselines captured at construction back into `settings`.
    pub fn reset(&self, settings: &mut Settings) {
        for chain in &self.chains {
            chain.reset(settings);
        }
    }
}
