use std::path::Path;

use log::{error, info, warn};

use crate::config::{DataPaths, Settings, SettingsError};
use crate::error::{InitializationError, ReleaseWarning};
use crate::platform::Platform;
use crate::service::{standard_services, Service, ServiceState};

struct ServiceSlot<P: Platform> {
    service: Box<dyn Service<P>>,
    state: ServiceState,
}

/// Ordered owner of the platform services.
///
/// Services are acquired front to back and released back to front. The
/// acquired services always form a prefix of the declared order: a failed
/// acquisition releases everything before it, and dropping the engine
/// releases everything it holds.
pub struct Engine<P: Platform> {
    platform: P,
    settings: Settings,
    paths: Option<DataPaths>,
    slots: Vec<ServiceSlot<P>>,
    acquired: usize,
}

impl<P: Platform + 'static> Engine<P> {
    /// Resolves the data directory, loads its settings and brings up the
    /// system, video, audio and input services in that order.
    pub fn create(
        platform: P,
        binary_path: &Path,
        data_path: Option<&Path>,
    ) -> Result<Self, InitializationError> {
        let paths = DataPaths::resolve(binary_path, data_path)?;
        info!("data directory: {}", paths.data_dir.display());
        let settings = Settings::load(&paths.settings_file())?;

        let mut engine = Self::assemble(platform, settings, standard_services());
        engine.paths = Some(paths);
        engine.acquire_all()?;
        Ok(engine)
    }
}

impl<P: Platform> Engine<P> {
    /// Brings up `services` in the given order.
    pub fn with_services(
        platform: P,
        settings: Settings,
        services: Vec<Box<dyn Service<P>>>,
    ) -> Result<Self, InitializationError> {
        let mut engine = Self::assemble(platform, settings, services);
        engine.acquire_all()?;
        Ok(engine)
    }

    fn assemble(platform: P, settings: Settings, services: Vec<Box<dyn Service<P>>>) -> Self {
        let slots = services
            .into_iter()
            .map(|service| ServiceSlot {
                service,
                state: ServiceState::NotAcquired,
            })
            .collect();
        Self {
            platform,
            settings,
            paths: None,
            slots,
            acquired: 0,
        }
    }

    fn acquire_all(&mut self) -> Result<(), InitializationError> {
        info!("starting {} platform", self.platform.name());
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            let name = slot.service.name();
            info!("acquiring {name}");
            if let Err(source) = slot.service.acquire(&mut self.platform, &mut self.settings) {
                error!("{name} failed: {source}");
                if self.acquired > 0 {
                    warn!("rolling back {} acquired service(s)", self.acquired);
                }
                self.release_all();
                return Err(InitializationError::ServiceAcquisitionFailed {
                    service: name,
                    source,
                });
            }
            slot.state = ServiceState::Acquired;
            self.acquired += 1;
        }
        info!("all {} services acquired", self.acquired);
        Ok(())
    }

    /// Releases every acquired service in reverse order.
    fn release_all(&mut self) {
        while self.acquired > 0 {
            self.acquired -= 1;
            let slot = &mut self.slots[self.acquired];
            let name = slot.service.name();
            info!("releasing {name}");
            if let Err(source) = slot.service.release(&mut self.platform) {
                warn!("{}", ReleaseWarning { service: name, source });
            }
            slot.state = ServiceState::Released;
        }
    }

    /// Releases every service in reverse order. Dropping the engine does the same.
    pub fn destroy(mut self) {
        self.release_all();
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn paths(&self) -> Option<&DataPaths> {
        self.paths.as_ref()
    }

    /// Names and lifecycle states of the services in declaration order.
    pub fn service_states(&self) -> Vec<(&'static str, ServiceState)> {
        self.slots
            .iter()
            .map(|slot| (slot.service.name(), slot.state))
            .collect()
    }

    /// Names and summaries of the acquired services in declaration order.
    pub fn describe(&self) -> Vec<(&'static str, Option<String>)> {
        self.slots[..self.acquired]
            .iter()
            .map(|slot| (slot.service.name(), slot.service.describe(&self.platform)))
            .collect()
    }

    /// Persists the current, possibly degraded, settings to the data directory.
    pub fn save_settings(&self) -> Result<(), SettingsError> {
        let paths = self.paths.as_ref().ok_or(SettingsError::NoDataDirectory)?;
        self.settings.save(&paths.settings_file())
    }
}

impl<P: Platform> Drop for Engine<P> {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::config::SETTINGS_FILE;
    use crate::error::ServiceError;
    use crate::platform::{HeadlessLimits, HeadlessPlatform};

    fn headless(limits: HeadlessLimits) -> HeadlessPlatform {
        HeadlessPlatform::new(limits)
    }

    #[test]
    fn create_acquires_every_standard_service() {
        let dir = tempdir().unwrap();
        let engine = Engine::create(
            headless(HeadlessLimits::default()),
            &dir.path().join("game"),
            None,
        )
        .unwrap();
        let states = engine.service_states();
        assert_eq!(
            states,
            vec![
                ("system", ServiceState::Acquired),
                ("video", ServiceState::Acquired),
                ("audio", ServiceState::Acquired),
                ("input", ServiceState::Acquired),
            ]
        );
        assert_eq!(engine.platform().open_windows(), 1);
        engine.destroy();
    }

    #[test]
    fn create_reads_settings_from_the_data_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "antialiasing": 3, "fullscreen": false }"#,
        )
        .unwrap();
        let engine = Engine::create(
            headless(HeadlessLimits {
                max_antialiasing: 1,
                ..HeadlessLimits::default()
            }),
            Path::new("game"),
            Some(dir.path()),
        )
        .unwrap();
        assert_eq!(engine.settings().antialiasing, 1);
        assert!(!engine.settings().fullscreen);
    }

    #[test]
    fn audio_failure_is_reported_with_its_cause() {
        let dir = tempdir().unwrap();
        let err = Engine::create(
            headless(HeadlessLimits {
                audio: false,
                ..HeadlessLimits::default()
            }),
            &dir.path().join("game"),
            None,
        )
        .err()
        .unwrap();
        assert_eq!(err.service(), Some("audio"));
        match err {
            InitializationError::ServiceAcquisitionFailed { source, .. } => {
                assert!(matches!(source, ServiceError::Platform(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exhausted_negotiation_fails_the_video_service() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), r#"{ "antialiasing": 1 }"#).unwrap();
        let err = Engine::create(
            headless(HeadlessLimits {
                display: false,
                ..HeadlessLimits::default()
            }),
            Path::new("game"),
            Some(dir.path()),
        )
        .err()
        .unwrap();
        assert_eq!(err.service(), Some("video"));
        match err {
            InitializationError::ServiceAcquisitionFailed {
                source: ServiceError::DisplayExhausted(exhausted),
                ..
            } => assert_eq!(exhausted.attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_data_directory_touches_no_service() {
        let dir = tempdir().unwrap();
        let err = Engine::create(
            headless(HeadlessLimits::default()),
            Path::new("game"),
            Some(&dir.path().join("missing")),
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            InitializationError::Settings(SettingsError::MissingDataDirectory(_))
        ));
    }

    #[test]
    fn save_settings_persists_the_negotiated_mode() {
        let dir = tempdir().unwrap();
        let engine = Engine::create(
            headless(HeadlessLimits {
                fullscreen: false,
                max_antialiasing: 0,
                ..HeadlessLimits::default()
            }),
            Path::new("game"),
            Some(dir.path()),
        )
        .unwrap();
        engine.save_settings().unwrap();
        let saved = Settings::load(&dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!((saved.antialiasing, saved.fullscreen), (0, false));
    }

    #[test]
    fn engine_without_data_directory_cannot_save() {
        let engine = Engine::with_services(
            headless(HeadlessLimits::default()),
            Settings::default(),
            Vec::new(),
        )
        .unwrap();
        assert!(matches!(
            engine.save_settings(),
            Err(SettingsError::NoDataDirectory)
        ));
    }
}
