use thiserror::Error;

use crate::config::SettingsError;
use crate::display::DisplayNegotiationExhausted;
use crate::platform::PlatformError;

/// Why a service could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    DisplayExhausted(#[from] DisplayNegotiationExhausted),
}

/// Terminal failure of [`Engine::create`](crate::Engine::create).
///
/// By the time this is returned every service acquired before the failure
/// has been released again.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("failed to initialize {service}")]
    ServiceAcquisitionFailed {
        service: &'static str,
        #[source]
        source: ServiceError,
    },
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl InitializationError {
    /// Name of the service that failed, if a service failed.
    pub fn service(&self) -> Option<&'static str> {
        match self {
            Self::ServiceAcquisitionFailed { service, .. } => Some(*service),
            Self::Settings(_) => None,
        }
    }
}

/// A release step that failed during teardown. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to release {service}: {source}")]
pub struct ReleaseWarning {
    pub service: &'static str,
    pub source: PlatformError,
}
