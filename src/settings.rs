// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::host::Binding;

/// Key for the global debug flag.
pub const DEBUG_KEY: &str = "debug";

/// Key for the target source name.
pub const SOURCE_KEY: &str = "source";

/// The key holding the checkbox state of one track slot of a group. Tracks
/// are 1-indexed to match their property labels.
pub fn track_key(track: usize, group_id: char) -> String {
    format!("track_{}{}", track, group_id)
}

/// The key holding a group's saved hotkey binding.
pub fn hotkey_key(group_id: char) -> String {
    format!("track_hotkey_{}", group_id)
}

/// A single persisted value.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Text(String),
}

/// Keyed settings storage, mirroring the host's per-plugin settings object.
/// The simulator persists it as a YAML file.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Settings {
    entries: BTreeMap<String, Value>,
}

impl Settings {
    pub fn new() -> Settings {
        Settings::default()
    }

    /// Loads settings from a YAML file.
    pub fn load(path: &Path) -> Result<Settings, Error> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Settings(format!("unable to read {}: {}", path.display(), e)))?;
        serde_yml::from_str(&contents)
            .map_err(|e| Error::Settings(format!("unable to parse {}: {}", path.display(), e)))
    }

    /// Writes settings to a YAML file.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let contents = serde_yml::to_string(self)
            .map_err(|e| Error::Settings(format!("unable to serialize settings: {}", e)))?;
        fs::write(path, contents)
            .map_err(|e| Error::Settings(format!("unable to write {}: {}", path.display(), e)))
    }

    /// Gets a boolean value. Missing or mistyped keys read as false.
    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(Value::Bool(true)))
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.entries.insert(key.to_string(), Value::Bool(value));
    }

    /// Gets a string value. Missing or mistyped keys read as empty.
    pub fn get_string(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(Value::Text(text)) => text.clone(),
            _ => String::new(),
        }
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), Value::Text(value.to_string()));
    }

    /// Gets a saved hotkey binding. None means no binding has been saved
    /// yet, which is the expected state for a fresh group.
    pub fn get_binding(&self, key: &str) -> Option<Binding> {
        match self.entries.get(key) {
            Some(Value::Text(blob)) => Some(Binding::new(blob.clone())),
            _ => None,
        }
    }

    pub fn set_binding(&mut self, key: &str, binding: &Binding) {
        self.entries
            .insert(key.to_string(), Value::Text(binding.as_str().to_string()));
    }

    /// Removes a key entirely.
    pub fn erase(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod test {
    use crate::host::Binding;

    use super::{hotkey_key, track_key, Settings};

    #[test]
    fn test_keys() {
        assert_eq!("track_1a", track_key(1, 'a'));
        assert_eq!("track_6b", track_key(6, 'b'));
        assert_eq!("track_hotkey_a", hotkey_key('a'));
    }

    #[test]
    fn test_accessors() {
        let mut settings = Settings::new();

        // Missing keys read as defaults.
        assert!(!settings.get_bool("debug"));
        assert_eq!("", settings.get_string("source"));
        assert_eq!(None, settings.get_binding(&hotkey_key('a')));

        settings.set_bool("debug", true);
        settings.set_string("source", "microphone");
        let binding = Binding::new(r#"{"key":"Ctrl+1"}"#);
        settings.set_binding(&hotkey_key('a'), &binding);

        assert!(settings.get_bool("debug"));
        assert_eq!("microphone", settings.get_string("source"));
        assert_eq!(Some(binding), settings.get_binding(&hotkey_key('a')));

        settings.erase(&hotkey_key('a'));
        assert_eq!(None, settings.get_binding(&hotkey_key('a')));
    }

    #[test]
    fn test_file_roundtrip() {
        let mut settings = Settings::new();
        settings.set_bool("debug", true);
        settings.set_string("source", "desktop-audio");
        settings.set_bool(&track_key(1, 'a'), true);
        settings.set_bool(&track_key(4, 'a'), true);
        settings.set_binding(&hotkey_key('b'), &Binding::new(r#"{"key":"F13"}"#));

        let dir = tempfile::tempdir().expect("unable to create temp dir");
        let path = dir.path().join("settings.yaml");
        settings.save(&path).expect("unable to save settings");

        let loaded = Settings::load(&path).expect("unable to load settings");
        assert!(loaded.get_bool("debug"));
        assert_eq!("desktop-audio", loaded.get_string("source"));
        assert!(loaded.get_bool(&track_key(1, 'a')));
        assert!(!loaded.get_bool(&track_key(2, 'a')));
        assert!(loaded.get_bool(&track_key(4, 'a')));
        assert_eq!(
            Some(Binding::new(r#"{"key":"F13"}"#)),
            loaded.get_binding(&hotkey_key('b'))
        );
    }
}
