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
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use serde_json::json;

use super::{Binding, Host as HostTrait, HotkeyId};
use crate::error::Error;

/// An in-memory host runtime. Stands in for the real scripting host in unit
/// tests and behind the interactive simulator.
pub struct Host {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Source name to the mixer mask most recently applied to it.
    sources: HashMap<String, u32>,
    hotkeys: HashMap<HotkeyId, Hotkey>,
    next_id: u64,
    total_registrations: usize,
}

struct Hotkey {
    name: String,
    description: String,
    binding: Option<Binding>,
}

impl Host {
    /// Creates a simulated host exposing the given audio sources.
    pub fn new<S: AsRef<str>>(sources: &[S]) -> Host {
        let mut inner = Inner::default();
        for source in sources {
            inner.sources.insert(source.as_ref().to_string(), 0);
        }
        Host {
            inner: Mutex::new(inner),
        }
    }

    /// The mixer mask most recently applied to the source.
    pub fn current_mask(&self, source_name: &str) -> Option<u32> {
        let inner = self.inner.lock().expect("unable to get lock");
        inner.sources.get(source_name).copied()
    }

    /// The number of hotkeys currently registered.
    pub fn active_hotkeys(&self) -> usize {
        let inner = self.inner.lock().expect("unable to get lock");
        inner.hotkeys.len()
    }

    /// The number of register calls made over the host's lifetime.
    pub fn total_registrations(&self) -> usize {
        let inner = self.inner.lock().expect("unable to get lock");
        inner.total_registrations
    }

    /// The description the hotkey was registered with.
    pub fn description_of(&self, id: HotkeyId) -> Option<String> {
        let inner = self.inner.lock().expect("unable to get lock");
        inner
            .hotkeys
            .get(&id)
            .map(|hotkey| hotkey.description.clone())
    }

    /// The name the hotkey was registered under.
    pub fn name_of(&self, id: HotkeyId) -> Option<String> {
        let inner = self.inner.lock().expect("unable to get lock");
        inner.hotkeys.get(&id).map(|hotkey| hotkey.name.clone())
    }

    /// Assigns a key combination to a registered hotkey, the way the host's
    /// hotkey settings UI would.
    pub fn assign_key(&self, id: HotkeyId, combination: &str) {
        let mut inner = self.inner.lock().expect("unable to get lock");
        if let Some(hotkey) = inner.hotkeys.get_mut(&id) {
            hotkey.binding = Some(Binding::new(json!({ "key": combination }).to_string()));
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().expect("unable to get lock");
        write!(f, "simulated host ({} sources)", inner.sources.len())
    }
}

impl HostTrait for Host {
    fn list_audio_sources(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("unable to get lock");
        let mut sources: Vec<String> = inner.sources.keys().cloned().collect();
        sources.sort();
        sources
    }

    fn set_mixer_mask(&self, source_name: &str, mask: u32) -> Result<(), Error> {
        let mut inner = self.inner.lock().expect("unable to get lock");
        match inner.sources.get_mut(source_name) {
            Some(current) => {
                *current = mask;
                Ok(())
            }
            None => Err(Error::TargetNotFound(source_name.to_string())),
        }
    }

    fn register_hotkey(&self, name: &str, description: &str) -> HotkeyId {
        let mut inner = self.inner.lock().expect("unable to get lock");
        let id = HotkeyId::new(inner.next_id);
        inner.next_id += 1;
        inner.total_registrations += 1;
        inner.hotkeys.insert(
            id,
            Hotkey {
                name: name.to_string(),
                description: description.to_string(),
                binding: None,
            },
        );
        id
    }

    fn unregister_hotkey(&self, id: HotkeyId) {
        let mut inner = self.inner.lock().expect("unable to get lock");
        inner.hotkeys.remove(&id);
    }

    fn load_hotkey(&self, id: HotkeyId, binding: &Binding) {
        let mut inner = self.inner.lock().expect("unable to get lock");
        if let Some(hotkey) = inner.hotkeys.get_mut(&id) {
            hotkey.binding = Some(binding.clone());
        }
    }

    fn save_hotkey(&self, id: HotkeyId) -> Option<Binding> {
        let inner = self.inner.lock().expect("unable to get lock");
        inner.hotkeys.get(&id).and_then(|hotkey| hotkey.binding.clone())
    }
}

#[cfg(test)]
mod test {
    use crate::host::{Binding, Host as HostTrait, HotkeyId};

    use super::Host;

    #[test]
    fn test_sources() {
        let host = Host::new(&["microphone", "desktop-audio"]);
        assert_eq!(
            vec!["desktop-audio".to_string(), "microphone".to_string()],
            host.list_audio_sources()
        );

        assert!(host.set_mixer_mask("microphone", 0b101).is_ok());
        assert_eq!(Some(0b101), host.current_mask("microphone"));
        assert_eq!(Some(0), host.current_mask("desktop-audio"));

        assert!(host.set_mixer_mask("unknown", 0b101).is_err());
        assert_eq!(None, host.current_mask("unknown"));
    }

    #[test]
    fn test_hotkeys() {
        let host = Host::new(&["microphone"]);

        let id = host.register_hotkey("track_hotkey_a", "Track Group A");
        assert_eq!(1, host.active_hotkeys());
        assert_eq!(Some("Track Group A".to_string()), host.description_of(id));
        assert_eq!(Some("track_hotkey_a".to_string()), host.name_of(id));

        // Nothing assigned yet.
        assert_eq!(None, host.save_hotkey(id));

        let binding = Binding::new(r#"{"key":"Ctrl+1"}"#);
        host.load_hotkey(id, &binding);
        assert_eq!(Some(binding), host.save_hotkey(id));

        host.unregister_hotkey(id);
        assert_eq!(0, host.active_hotkeys());
        assert_eq!(None, host.save_hotkey(id));

        // Unknown handles are ignored.
        host.unregister_hotkey(HotkeyId::INVALID);
    }
}
