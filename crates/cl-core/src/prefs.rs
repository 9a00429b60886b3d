use std::collections::HashMap;

/// Key/value flags that survive between play sessions.
///
/// The engine only stores booleans; anything richer belongs to the game.
pub trait Preferences: std::fmt::Debug {
    /// Read a flag. `None` when the key was never written.
    fn get_flag(&self, key: &str) -> Option<bool>;

    /// Write a flag.
    fn set_flag(&mut self, key: &str, value: bool);

    /// Delete a key. Deleting a missing key is a no-op.
    fn remove(&mut self, key: &str);
}

/// In-memory preferences, used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    flags: HashMap<String, bool>,
}

impl MemoryPreferences {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with flags, e.g. values left by a previous run.
    pub fn with_flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.flags.insert(key.into(), value);
        self
    }
}

impl Preferences for MemoryPreferences {
    fn get_flag(&self, key: &str) -> Option<bool> {
        self.flags.get(key).copied()
    }

    fn set_flag(&mut self, key: &str, value: bool) {
        self.flags.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.flags.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut prefs = MemoryPreferences::new();
        assert_eq!(prefs.get_flag("powered"), None);
        prefs.set_flag("powered", true);
        assert_eq!(prefs.get_flag("powered"), Some(true));
        prefs.remove("powered");
        prefs.remove("powered");
        assert_eq!(prefs.get_flag("powered"), None);
    }
}
