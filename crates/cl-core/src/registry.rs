use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::profile::CharacterProfile;

/// All character profiles known to the engine, keyed by exact name.
///
/// Built once at load time; profiles are never added while a
/// conversation is running.
#[derive(Debug, Clone, Default)]
pub struct CharacterRegistry {
    profiles: Vec<CharacterProfile>,
    by_name: HashMap<String, usize>,
}

impl CharacterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from profiles, rejecting duplicate names.
    pub fn from_profiles<I>(profiles: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = CharacterProfile>,
    {
        let mut registry = Self::new();
        for profile in profiles {
            registry.add(profile)?;
        }
        Ok(registry)
    }

    /// Register a profile.
    pub fn add(&mut self, profile: CharacterProfile) -> CoreResult<()> {
        if self.by_name.contains_key(&profile.name) {
            return Err(CoreError::DuplicateName(profile.name));
        }
        self.by_name.insert(profile.name.clone(), self.profiles.len());
        self.profiles.push(profile);
        Ok(())
    }

    /// Look up a profile by exact name.
    pub fn find(&self, name: &str) -> Option<&CharacterProfile> {
        self.by_name.get(name).map(|&i| &self.profiles[i])
    }

    /// Whether a profile with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Profiles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterProfile> {
        self.profiles.iter()
    }

    /// Number of registered profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_find() {
        let mut reg = CharacterRegistry::new();
        reg.add(CharacterProfile::new("Apollo")).unwrap();
        reg.add(CharacterProfile::new("Vega")).unwrap();
        assert_eq!(reg.len(), 2);
        assert!(reg.find("Apollo").is_some());
        assert!(reg.find("apollo").is_none());
        assert!(reg.contains("Vega"));
    }

    #[test]
    fn duplicate_rejected() {
        let result = CharacterRegistry::from_profiles([
            CharacterProfile::new("Apollo"),
            CharacterProfile::new("Apollo"),
        ]);
        assert!(matches!(result, Err(CoreError::DuplicateName(n)) if n == "Apollo"));
    }

    #[test]
    fn iteration_keeps_registration_order() {
        let reg = CharacterRegistry::from_profiles([
            CharacterProfile::new("Vega"),
            CharacterProfile::new("Apollo"),
        ])
        .unwrap();
        let names: Vec<_> = reg.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Vega", "Apollo"]);
    }
}
