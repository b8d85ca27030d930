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
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub mod sim;

/// An opaque serialized key-binding blob. The host owns the format; the
/// registry only round-trips it through save and load and never interprets
/// the contents.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Binding(String);

impl Binding {
    pub fn new(raw: impl Into<String>) -> Binding {
        Binding(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A handle to a hotkey registered with the host's hotkey manager. Handles
/// become invalid when the hotkey is unregistered and must not be reused.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HotkeyId(u64);

impl HotkeyId {
    /// Sentinel for "no hotkey registered".
    pub const INVALID: HotkeyId = HotkeyId(u64::MAX);

    pub fn new(raw: u64) -> HotkeyId {
        HotkeyId(raw)
    }
}

/// The host runtime boundary. The real host loads, drives, and tears down
/// the plugin; everything here is a contract on its behavior, not a
/// reimplementation of it.
pub trait Host: fmt::Display + Send + Sync {
    /// Enumerates the names of the audio-capable sources. May be empty.
    fn list_audio_sources(&self) -> Vec<String>;

    /// Applies the mixer track mask to the named source. Fails if the
    /// source does not exist.
    fn set_mixer_mask(&self, source_name: &str, mask: u32) -> Result<(), Error>;

    /// Registers a hotkey with the hotkey manager and returns its handle.
    fn register_hotkey(&self, name: &str, description: &str) -> HotkeyId;

    /// Removes a previously registered hotkey. Unknown handles are ignored.
    fn unregister_hotkey(&self, id: HotkeyId);

    /// Installs a saved key combination on a registered hotkey.
    fn load_hotkey(&self, id: HotkeyId, binding: &Binding);

    /// Serializes the key combination currently assigned to the hotkey.
    /// None means no key has been assigned yet, which is expected for a
    /// fresh hotkey and is not an error.
    fn save_hotkey(&self, id: HotkeyId) -> Option<Binding>;
}
