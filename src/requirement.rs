//! Degradable display requirements.
//!
//! A [`Requirement`] remembers the value a setting had when it was captured
//! and can walk that setting toward a safer value one step at a time.
//! [`RequirementChain`] groups requirements that are relaxed as a unit.

use std::fmt;

use log::debug;

use crate::config::Settings;

/// One display parameter that can be relaxed toward a more permissive value.
pub trait Requirement {
    fn name(&self) -> &'static str;

    /// Moves the setting one step toward the safer value.
    ///
    /// Returns `false` without touching `settings` when no step is left.
    fn relax(&mut self, settings: &mut Settings) -> bool;

    /// Writes the captured baseline back into `settings`.
    fn reset(&self, settings: &mut Settings);
}

/// Multisampling level; relaxing decrements it until it reaches 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntialiasingRequirement {
    baseline: u8,
}

impl AntialiasingRequirement {
    pub fn capture(settings: &Settings) -> Self {
        Self {
            baseline: settings.antialiasing,
        }
    }

    pub fn baseline(&self) -> u8 {
        self.baseline
    }
}

impl Requirement for AntialiasingRequirement {
    fn name(&self) -> &'static str {
        "antialiasing"
    }

    fn relax(&mut self, settings: &mut Settings) -> bool {
        if settings.antialiasing == 0 {
            return false;
        }
        settings.antialiasing -= 1;
        debug!("antialiasing relaxed to level {}", settings.antialiasing);
        true
    }

    fn reset(&self, settings: &mut Settings) {
        settings.antialiasing = self.baseline;
    }
}

/// Fullscreen flag; relaxing switches to windowed mode once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenRequirement {
    baseline: bool,
}

impl FullscreenRequirement {
    pub fn capture(settings: &Settings) -> Self {
        Self {
            baseline: settings.fullscreen,
        }
    }

    pub fn baseline(&self) -> bool {
        self.baseline
    }
}

impl Requirement for FullscreenRequirement {
    fn name(&self) -> &'static str {
        "fullscreen"
    }

    fn relax(&mut self, settings: &mut Settings) -> bool {
        if !settings.fullscreen {
            return false;
        }
        settings.fullscreen = false;
        debug!("fullscreen relaxed to windowed");
        true
    }

    fn reset(&self, settings: &mut Settings) {
        settings.fullscreen = self.baseline;
    }
}

/// Ordered group of requirements relaxed front to back.
pub struct RequirementChain {
    name: &'static str,
    members: Vec<Box<dyn Requirement>>,
}

impl RequirementChain {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            members: Vec::new(),
        }
    }

    pub fn with(mut self, requirement: impl Requirement + 'static) -> Self {
        self.members.push(Box::new(requirement));
        self
    }

    pub fn push(&mut self, requirement: Box<dyn Requirement>) {
        self.members.push(requirement);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Relaxes the first member that still has room.
    ///
    /// Returns `false` only once every member is exhausted; an empty chain
    /// always returns `false`.
    pub fn relax(&mut self, settings: &mut Settings) -> bool {
        self.members
            .iter_mut()
            .any(|requirement| requirement.relax(settings))
    }

    /// Restores every member's baseline.
    pub fn reset(&self, settings: &mut Settings) {
        for requirement in &self.members {
            requirement.reset(settings);
        }
    }
}

impl fmt::Debug for RequirementChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.members.iter().map(|member| member.name()).collect();
        f.debug_struct("RequirementChain")
            .field("name", &self.name)
            .field("members", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn settings(antialiasing: u8, fullscreen: bool) -> Settings {
        Settings {
            antialiasing,
            fullscreen,
            ..Settings::default()
        }
    }

    #[test]
    fn antialiasing_steps_down_to_zero() {
        let mut store = settings(2, true);
        let mut requirement = AntialiasingRequirement::capture(&store);
        assert!(requirement.relax(&mut store));
        assert_eq!(store.antialiasing, 1);
        assert!(requirement.relax(&mut store));
        assert_eq!(store.antialiasing, 0);
        assert!(!requirement.relax(&mut store));
        assert!(!requirement.relax(&mut store));
        assert_eq!(store.antialiasing, 0);
    }

    #[test]
    fn fullscreen_relaxes_once() {
        let mut store = settings(0, true);
        let mut requirement = FullscreenRequirement::capture(&store);
        assert!(requirement.relax(&mut store));
        assert!(!store.fullscreen);
        assert!(!requirement.relax(&mut store));
        assert!(!store.fullscreen);
    }

    #[test]
    fn exhausted_relax_leaves_store_untouched() {
        let mut store = settings(0, false);
        let before = store.clone();
        let mut chain = RequirementChain::new("all")
            .with(AntialiasingRequirement::capture(&store))
            .with(FullscreenRequirement::capture(&store));
        assert!(!chain.relax(&mut store));
        assert_eq!(store, before);
    }

    #[test]
    fn reset_restores_baseline_after_any_number_of_steps() {
        for baseline in 0..=4u8 {
            for steps in 0..=6 {
                let mut store = settings(baseline, true);
                let original = store.clone();
                let mut chain = RequirementChain::new("all")
                    .with(AntialiasingRequirement::capture(&store))
                    .with(FullscreenRequirement::capture(&store));
                for _ in 0..steps {
                    chain.relax(&mut store);
                }
                chain.reset(&mut store);
                assert_eq!(store, original, "baseline {baseline}, {steps} steps");
            }
        }
    }

    #[test]
    fn reset_overwrites_rather_than_reverses() {
        let mut store = settings(3, true);
        let requirement = AntialiasingRequirement::capture(&store);
        store.antialiasing = 1;
        requirement.reset(&mut store);
        assert_eq!(store.antialiasing, 3);
    }

    struct Recorder {
        label: &'static str,
        remaining: u32,
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Requirement for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        fn relax(&mut self, _settings: &mut Settings) -> bool {
            self.calls.borrow_mut().push(self.label);
            if self.remaining == 0 {
                return false;
            }
            self.remaining -= 1;
            true
        }

        fn reset(&self, _settings: &mut Settings) {}
    }

    #[test]
    fn chain_drains_first_member_before_second() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut chain = RequirementChain::new("pair")
            .with(Recorder {
                label: "a",
                remaining: 2,
                calls: Rc::clone(&calls),
            })
            .with(Recorder {
                label: "b",
                remaining: 1,
                calls: Rc::clone(&calls),
            });
        let mut store = Settings::default();
        assert!(chain.relax(&mut store));
        assert!(chain.relax(&mut store));
        assert_eq!(*calls.borrow(), vec!["a", "a"]);
        assert!(chain.relax(&mut store));
        assert_eq!(*calls.borrow(), vec!["a", "a", "a", "b"]);
        assert!(!chain.relax(&mut store));
    }

    #[test]
    fn empty_chain_always_fails() {
        let mut chain = RequirementChain::new("empty");
        assert!(chain.is_empty());
        assert!(!chain.relax(&mut Settings::default()));
    }
}
