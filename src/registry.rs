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
use core::fmt;

use tracing::{info, span, warn, Level, Span};

use crate::error::Error;
use crate::host::{Binding, Host, HotkeyId};
use crate::mask;
use crate::settings::{self, Settings};

/// The longest hotkey description the host will display, in characters.
/// Longer descriptions are truncated with a trailing ellipsis.
pub const MAX_DESCRIPTION_LEN: usize = 32;

/// Group identifiers are single lowercase letters, so a registry holds at
/// most one group per letter.
const MAX_GROUPS: usize = 26;

/// The hotkey binding state of a group. The old handle is invalidated on
/// every transition out of Bound and must not be reused.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BindState {
    /// No hotkey is registered. Terminal state on teardown.
    Unbound,
    /// A hotkey is registered under the contained handle.
    Bound(HotkeyId),
    /// Transient state while rebinding against a new target source.
    Rebinding,
}

impl fmt::Display for BindState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindState::Unbound => write!(f, "unbound"),
            BindState::Bound(_) => write!(f, "bound"),
            BindState::Rebinding => write!(f, "rebinding"),
        }
    }
}

/// A track group: a named association between a hotkey and a set of mixer
/// tracks on the target source.
pub struct TrackGroup {
    /// Unique single-letter identifier, assigned at creation.
    id: char,
    /// The mixer mask applied when the group's hotkey is pressed. Only the
    /// low track bits are ever set.
    mask: u32,
    /// The saved key combination, round-tripped through the settings store.
    binding: Option<Binding>,
    state: BindState,
}

impl TrackGroup {
    pub fn id(&self) -> char {
        self.id
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn state(&self) -> BindState {
        self.state
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// The hotkey description shown in the host's hotkey settings.
    fn description(&self, source_name: &str) -> String {
        let description = format!(
            "Track Group {} for '{}'",
            self.id.to_ascii_uppercase(),
            source_name
        );
        if description.chars().count() <= MAX_DESCRIPTION_LEN {
            return description;
        }

        let truncated: String = description.chars().take(MAX_DESCRIPTION_LEN - 3).collect();
        format!("{}...", truncated)
    }
}

/// Registers the group's hotkey with the host, installing the saved key
/// combination if one exists.
fn bind(group: &mut TrackGroup, target_source: &str, host: &dyn Host) {
    let description = group.description(target_source);
    let id = host.register_hotkey(&settings::hotkey_key(group.id), &description);
    if let Some(binding) = &group.binding {
        host.load_hotkey(id, binding);
    }
    group.state = BindState::Bound(id);
}

/// An ordered set of track groups targeting a single audio source.
pub struct TrackGroupRegistry {
    groups: Vec<TrackGroup>,
    target_source: String,
    /// The logging span.
    span: Span,
}

impl TrackGroupRegistry {
    /// Creates `count` groups with letter identifiers starting at 'a', all
    /// with an empty mask and no hotkey. Counts beyond the letter alphabet
    /// are a configuration error.
    pub fn create(
        count: usize,
        target_source: impl Into<String>,
    ) -> Result<TrackGroupRegistry, Error> {
        if count > MAX_GROUPS {
            return Err(Error::Configuration(format!(
                "cannot create {} track groups, only {} letter identifiers are available",
                count, MAX_GROUPS
            )));
        }

        let groups = (0..count)
            .map(|i| TrackGroup {
                id: (b'a' + i as u8) as char,
                mask: 0,
                binding: None,
                state: BindState::Unbound,
            })
            .collect();

        Ok(TrackGroupRegistry {
            groups,
            target_source: target_source.into(),
            span: span!(Level::INFO, "track groups"),
        })
    }

    pub fn groups(&self) -> &[TrackGroup] {
        &self.groups
    }

    /// Finds the group with the given identifier.
    pub fn group(&self, id: char) -> Result<&TrackGroup, Error> {
        self.groups
            .iter()
            .find(|group| group.id == id)
            .ok_or(Error::UnknownGroup(id))
    }

    fn group_mut(&mut self, id: char) -> Result<&mut TrackGroup, Error> {
        self.groups
            .iter_mut()
            .find(|group| group.id == id)
            .ok_or(Error::UnknownGroup(id))
    }

    pub fn target_source(&self) -> &str {
        &self.target_source
    }

    /// Stores a new mask for the group. Masks with bits outside the track
    /// slots are rejected rather than truncated, to catch configuration
    /// bugs early. No other side effect.
    pub fn set_mask(&mut self, id: char, mask: u32) -> Result<(), Error> {
        mask::validate_mask(mask)?;
        self.group_mut(id)?.mask = mask;
        Ok(())
    }

    /// Applies the group's stored mask to the target source through the
    /// host mixer. Fails without mutating anything if no target source is
    /// configured or the target no longer exists.
    pub fn apply_mask(&self, id: char, host: &dyn Host) -> Result<(), Error> {
        let group = self.group(id)?;
        if self.target_source.is_empty() {
            return Err(Error::NoTargetSource);
        }

        host.set_mixer_mask(&self.target_source, group.mask)?;
        info!(
            source = self.target_source.as_str(),
            mask = format!("{:#04x}", group.mask),
            tracks = mask::render_mask(group.mask),
            "Set mixer tracks."
        );
        Ok(())
    }

    /// Registers a hotkey for every group, installing any key combination
    /// saved in the settings store.
    pub fn bind_all(&mut self, host: &dyn Host, store: &Settings) {
        let _enter = self.span.enter();

        for group in self.groups.iter_mut() {
            group.binding = store.get_binding(&settings::hotkey_key(group.id));
            bind(group, &self.target_source, host);
        }

        info!(
            groups = self.groups.len(),
            source = self.target_source.as_str(),
            "Registered track group hotkeys."
        );
    }

    /// Rebinds every group's hotkey against a new target source. This is a
    /// destructive rebind: the previous handle is deregistered, the saved
    /// binding is erased from the store, and the hotkey is registered fresh
    /// under the new description.
    pub fn on_target_source_changed(
        &mut self,
        new_name: &str,
        host: &dyn Host,
        store: &mut Settings,
    ) {
        let _enter = self.span.enter();

        self.target_source = new_name.to_string();
        for group in self.groups.iter_mut() {
            if let BindState::Bound(id) = group.state {
                host.unregister_hotkey(id);
            }
            group.state = BindState::Rebinding;
            store.erase(&settings::hotkey_key(group.id));
            group.binding = None;
            bind(group, &self.target_source, host);
        }

        info!(source = new_name, "Rebound track group hotkeys.");
    }

    /// Handles a hotkey press reported by the host. Dispatch is by handle
    /// lookup rather than callback identity. Failures are reported and
    /// swallowed so a bad press never takes down the host.
    pub fn handle_press(&self, id: HotkeyId, pressed: bool, host: &dyn Host) {
        if !pressed {
            return;
        }

        let group_id = self.groups.iter().find_map(|group| match group.state {
            BindState::Bound(bound) if bound == id => Some(group.id),
            _ => None,
        });

        match group_id {
            Some(group_id) => {
                if let Err(e) = self.apply_mask(group_id, host) {
                    warn!(
                        group = group_id.to_string(),
                        err = e.to_string(),
                        "Unable to apply track mask."
                    );
                }
            }
            None => warn!("Received a press for an unregistered hotkey."),
        }
    }

    /// Captures each bound group's current key assignment from the host and
    /// persists it. Groups with no key assigned keep no binding.
    pub fn save_bindings(&mut self, host: &dyn Host, store: &mut Settings) {
        for group in self.groups.iter_mut() {
            if let BindState::Bound(id) = group.state {
                group.binding = host.save_hotkey(id);
                if let Some(binding) = &group.binding {
                    store.set_binding(&settings::hotkey_key(group.id), binding);
                }
            }
        }
    }

    /// Deregisters every hotkey and releases the saved bindings. All groups
    /// end unbound.
    pub fn teardown(&mut self, host: &dyn Host) {
        let _enter = self.span.enter();

        for group in self.groups.iter_mut() {
            if let BindState::Bound(id) = group.state {
                host.unregister_hotkey(id);
            }
            group.state = BindState::Unbound;
            group.binding = None;
        }

        info!("Track groups released.");
    }
}
