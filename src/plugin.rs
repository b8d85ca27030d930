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
use std::sync::Arc;

use tracing::{error, info, span, Level, Span};

use crate::error::Error;
use crate::host::{Host, HotkeyId};
use crate::mask::{self, NUM_TRACKS};
use crate::registry::TrackGroupRegistry;
use crate::settings::{self, Settings, DEBUG_KEY, SOURCE_KEY};

/// The number of track groups created at load.
pub const NUM_GROUPS: usize = 2;

/// The plugin lifecycle adapter. The host drives it through load, update,
/// save, and unload callbacks, serially on its own dispatch thread. The
/// debug flag, the target source, and the track groups all live here
/// explicitly, with explicit initialization and teardown.
pub struct Plugin {
    host: Arc<dyn Host>,
    registry: TrackGroupRegistry,
    debug: bool,
    /// The logging span.
    span: Span,
}

impl Plugin {
    /// Loads the plugin: reads the persisted flags, creates the track
    /// groups, and registers their hotkeys with the host.
    pub fn load(store: &Settings, host: Arc<dyn Host>) -> Result<Plugin, Error> {
        Plugin::load_with_groups(store, host, NUM_GROUPS)
    }

    /// Loads the plugin with a non-default group count.
    pub fn load_with_groups(
        store: &Settings,
        host: Arc<dyn Host>,
        num_groups: usize,
    ) -> Result<Plugin, Error> {
        let debug = store.get_bool(DEBUG_KEY);
        let source_name = store.get_string(SOURCE_KEY);

        let mut registry = TrackGroupRegistry::create(num_groups, source_name)?;
        registry.bind_all(host.as_ref(), store);

        info!("Track hotkey plugin loaded.");
        Ok(Plugin {
            host,
            registry,
            debug,
            span: span!(Level::INFO, "plugin"),
        })
    }

    /// Applies a settings change: picks up the debug flag, rebinds on a
    /// target source change, and recomputes every group's mask from the
    /// per-track checkbox state.
    pub fn update(&mut self, store: &mut Settings) {
        let _enter = self.span.enter();

        self.debug = store.get_bool(DEBUG_KEY);

        let new_source = store.get_string(SOURCE_KEY);
        if new_source != self.registry.target_source() {
            if !self.registry.target_source().is_empty() {
                info!(
                    old = self.registry.target_source(),
                    new = new_source.as_str(),
                    "Changed target source."
                );
            }
            self.registry
                .on_target_source_changed(&new_source, self.host.as_ref(), store);
        }

        let ids: Vec<char> = self.registry.groups().iter().map(|group| group.id()).collect();
        for id in ids {
            let mut mask = 0;
            for track in 0..NUM_TRACKS {
                if store.get_bool(&settings::track_key(track + 1, id)) {
                    mask |= 1 << track;
                }
            }

            if let Err(e) = self.registry.set_mask(id, mask) {
                error!(
                    group = id.to_string(),
                    err = e.to_string(),
                    "Unable to set track mask."
                );
            } else if self.debug {
                info!(
                    group = id.to_string(),
                    tracks = mask::render_mask(mask),
                    "Updated track mask."
                );
            }
        }
    }

    /// Persists the current hotkey key assignments into the settings store.
    pub fn save(&mut self, store: &mut Settings) {
        self.registry.save_bindings(self.host.as_ref(), store);
    }

    /// Unloads the plugin, deregistering every hotkey.
    pub fn unload(&mut self) {
        let _enter = self.span.enter();
        self.registry.teardown(self.host.as_ref());
        info!("Track hotkey plugin unloaded.");
    }

    /// Relays a hotkey press from the host to the owning group.
    pub fn handle_press(&self, id: HotkeyId, pressed: bool) {
        self.registry.handle_press(id, pressed, self.host.as_ref());
    }

    pub fn registry(&self) -> &TrackGroupRegistry {
        &self.registry
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::host::{sim, Host as _, HotkeyId};
    use crate::registry::BindState;
    use crate::settings::{self, Settings, DEBUG_KEY, SOURCE_KEY};

    use super::Plugin;

    fn bound_id(plugin: &Plugin, id: char) -> HotkeyId {
        match plugin.registry().group(id).expect("group should exist").state() {
            BindState::Bound(hotkey_id) => hotkey_id,
            state => panic!("group '{}' should be bound, was {}", id, state),
        }
    }

    #[test]
    fn test_load_and_update() {
        let host = Arc::new(sim::Host::new(&["microphone", "desktop-audio"]));
        let mut store = Settings::new();
        store.set_bool(DEBUG_KEY, true);
        store.set_string(SOURCE_KEY, "microphone");
        store.set_bool(&settings::track_key(1, 'a'), true);
        store.set_bool(&settings::track_key(4, 'a'), true);
        store.set_bool(&settings::track_key(2, 'b'), true);

        let mut plugin = Plugin::load(&store, host.clone()).expect("unable to load plugin");
        assert!(plugin.debug());
        assert_eq!(2, host.active_hotkeys());

        // The host calls update right after load; masks come from the
        // persisted checkbox state.
        plugin.update(&mut store);
        let registry = plugin.registry();
        assert_eq!(0b001001, registry.group('a').expect("group should exist").mask());
        assert_eq!(0b000010, registry.group('b').expect("group should exist").mask());
        assert_eq!("microphone", registry.target_source());
    }

    #[test]
    fn test_update_rebinds_on_source_change_only() {
        let host = Arc::new(sim::Host::new(&["microphone", "desktop-audio"]));
        let mut store = Settings::new();
        store.set_string(SOURCE_KEY, "microphone");

        let mut plugin = Plugin::load(&store, host.clone()).expect("unable to load plugin");
        plugin.update(&mut store);
        assert_eq!(2, host.total_registrations());

        // Updates without a source change never re-register.
        plugin.update(&mut store);
        plugin.update(&mut store);
        assert_eq!(2, host.total_registrations());
        assert_eq!(2, host.active_hotkeys());

        store.set_string(SOURCE_KEY, "desktop-audio");
        plugin.update(&mut store);
        assert_eq!(4, host.total_registrations());
        assert_eq!(2, host.active_hotkeys());
        assert_eq!("desktop-audio", plugin.registry().target_source());
    }

    #[test]
    fn test_press_applies_mask() {
        let host = Arc::new(sim::Host::new(&["microphone"]));
        let mut store = Settings::new();
        store.set_string(SOURCE_KEY, "microphone");
        store.set_bool(&settings::track_key(6, 'a'), true);

        let mut plugin = Plugin::load(&store, host.clone()).expect("unable to load plugin");
        plugin.update(&mut store);

        plugin.handle_press(bound_id(&plugin, 'a'), true);
        assert_eq!(Some(0b100000), host.current_mask("microphone"));
    }

    #[test]
    fn test_save_and_reload_restores_binding() {
        let host = Arc::new(sim::Host::new(&["microphone"]));
        let mut store = Settings::new();
        store.set_string(SOURCE_KEY, "microphone");

        let mut plugin = Plugin::load(&store, host.clone()).expect("unable to load plugin");
        host.assign_key(bound_id(&plugin, 'a'), "Ctrl+1");
        plugin.save(&mut store);
        plugin.unload();
        assert_eq!(0, host.active_hotkeys());

        // A fresh load restores the saved key combination from the store.
        let plugin = Plugin::load(&store, host.clone()).expect("unable to load plugin");
        let restored = host.save_hotkey(bound_id(&plugin, 'a'));
        assert!(restored.is_some());
        assert!(restored
            .expect("binding should exist")
            .as_str()
            .contains("Ctrl+1"));
    }

    #[test]
    fn test_load_rejects_too_many_groups() {
        let host = Arc::new(sim::Host::new(&["microphone"]));
        let store = Settings::new();
        assert!(Plugin::load_with_groups(&store, host, 27).is_err());
    }
}
