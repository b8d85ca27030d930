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
use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::warn;

use crate::host::sim;
use crate::mask;
use crate::plugin::Plugin;
use crate::registry::BindState;
use crate::settings::{self, Settings, SOURCE_KEY};

const PRESS: &str = "press";
const MASK: &str = "mask";
const SOURCE: &str = "source";
const TRACKS: &str = "tracks";
const SOURCES: &str = "sources";
const KEY: &str = "key";
const SAVE: &str = "save";
const QUIT: &str = "quit";

/// An interactive console that drives the plugin lifecycle against the
/// simulated host, the way the real host's property panel and hotkey
/// manager would.
pub struct Console<'a> {
    plugin: &'a mut Plugin,
    store: &'a mut Settings,
    sim: &'a sim::Host,
    settings_path: Option<&'a Path>,
}

impl<'a> Console<'a> {
    pub fn new(
        plugin: &'a mut Plugin,
        store: &'a mut Settings,
        sim: &'a sim::Host,
        settings_path: Option<&'a Path>,
    ) -> Console<'a> {
        Console {
            plugin,
            store,
            sim,
            settings_path,
        }
    }

    /// Runs the console until quit or end of input.
    pub fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), io::Error>
    where
        R: BufRead,
        W: Write,
    {
        loop {
            write!(
                writer,
                "Command ({}, {}, {}, {}, {}, {}, {}, {}): ",
                PRESS, MASK, SOURCE, TRACKS, SOURCES, KEY, SAVE, QUIT,
            )?;
            writer.flush()?;

            let mut input = String::default();
            if reader.read_line(&mut input)? == 0 {
                return Ok(());
            }
            if !self.dispatch(input.trim(), &mut writer)? {
                return Ok(());
            }
        }
    }

    /// Handles a single command. Returns false when the console should exit.
    fn dispatch<W: Write>(&mut self, input: &str, writer: &mut W) -> Result<bool, io::Error> {
        let fields: Vec<&str> = input.split_whitespace().collect();
        if fields.is_empty() {
            return Ok(true);
        }

        match fields[0].to_lowercase().as_str() {
            PRESS => self.press(&fields[1..], writer)?,
            MASK => self.mask(&fields[1..], writer)?,
            SOURCE => self.source(&fields[1..], writer)?,
            TRACKS => self.tracks(writer)?,
            SOURCES => self.sources(writer)?,
            KEY => self.key(&fields[1..], writer)?,
            SAVE => self.save(writer)?,
            QUIT => return Ok(false),
            _ => {
                warn!(input = input, "Unrecognized command");
                writeln!(writer, "Unrecognized command.")?;
            }
        }
        Ok(true)
    }

    fn press<W: Write>(&mut self, args: &[&str], writer: &mut W) -> Result<(), io::Error> {
        let group_id = match parse_group_id(args) {
            Some(group_id) => group_id,
            None => return writeln!(writer, "Usage: {} <group>", PRESS),
        };

        match self.plugin.registry().group(group_id) {
            Ok(group) => match group.state() {
                BindState::Bound(id) => {
                    self.plugin.handle_press(id, true);
                    writeln!(writer, "Pressed hotkey for group '{}'.", group_id)?;
                }
                _ => writeln!(writer, "Group '{}' has no registered hotkey.", group_id)?,
            },
            Err(e) => writeln!(writer, "{}", e)?,
        }
        Ok(())
    }

    fn mask<W: Write>(&mut self, args: &[&str], writer: &mut W) -> Result<(), io::Error> {
        if args.len() != 2 {
            return writeln!(
                writer,
                "Usage: {} <group> <{} 0/1 flags, e.g. 100100>",
                MASK,
                mask::NUM_TRACKS
            );
        }
        let group_id = match parse_group_id(&args[..1]) {
            Some(group_id) => group_id,
            None => return writeln!(writer, "Group must be a single lowercase letter."),
        };
        let flags = match parse_flags(args[1]) {
            Some(flags) => flags,
            None => {
                return writeln!(
                    writer,
                    "Flags must be exactly {} characters of 0 or 1.",
                    mask::NUM_TRACKS
                )
            }
        };

        // Mirror the host property flow: the checkboxes land in the
        // settings store, then an update recomputes the masks.
        for (track, flag) in flags.iter().enumerate() {
            self.store
                .set_bool(&settings::track_key(track + 1, group_id), *flag);
        }
        self.plugin.update(self.store);

        match self.plugin.registry().group(group_id) {
            Ok(group) => writeln!(
                writer,
                "Group '{}': {}",
                group_id,
                mask::render_mask(group.mask())
            )?,
            Err(e) => writeln!(writer, "{}", e)?,
        }
        Ok(())
    }

    fn source<W: Write>(&mut self, args: &[&str], writer: &mut W) -> Result<(), io::Error> {
        if args.len() != 1 {
            return writeln!(writer, "Usage: {} <name>", SOURCE);
        }

        self.store.set_string(SOURCE_KEY, args[0]);
        self.plugin.update(self.store);
        writeln!(writer, "Target source is now '{}'.", args[0])?;
        Ok(())
    }

    fn tracks<W: Write>(&mut self, writer: &mut W) -> Result<(), io::Error> {
        for group in self.plugin.registry().groups() {
            writeln!(
                writer,
                "Group '{}' [{}]: {:#04x} ({})",
                group.id(),
                group.state(),
                group.mask(),
                mask::render_mask(group.mask())
            )?;
        }
        Ok(())
    }

    fn sources<W: Write>(&mut self, writer: &mut W) -> Result<(), io::Error> {
        for source in self.plugin.host().list_audio_sources() {
            writeln!(writer, "- {}", source)?;
        }
        Ok(())
    }

    fn key<W: Write>(&mut self, args: &[&str], writer: &mut W) -> Result<(), io::Error> {
        if args.len() != 2 {
            return writeln!(writer, "Usage: {} <group> <combination>", KEY);
        }
        let group_id = match parse_group_id(&args[..1]) {
            Some(group_id) => group_id,
            None => return writeln!(writer, "Group must be a single lowercase letter."),
        };

        match self.plugin.registry().group(group_id) {
            Ok(group) => match group.state() {
                BindState::Bound(id) => {
                    self.sim.assign_key(id, args[1]);
                    writeln!(writer, "Assigned '{}' to group '{}'.", args[1], group_id)?;
                }
                _ => writeln!(writer, "Group '{}' has no registered hotkey.", group_id)?,
            },
            Err(e) => writeln!(writer, "{}", e)?,
        }
        Ok(())
    }

    fn save<W: Write>(&mut self, writer: &mut W) -> Result<(), io::Error> {
        self.plugin.save(self.store);
        if let Some(path) = self.settings_path {
            if let Err(e) = self.store.save(path) {
                writeln!(writer, "Unable to save settings: {}", e)?;
                return Ok(());
            }
        }
        writeln!(writer, "Settings saved.")?;
        Ok(())
    }
}

fn parse_group_id(args: &[&str]) -> Option<char> {
    if args.len() != 1 {
        return None;
    }
    let mut chars = args[0].chars();
    match (chars.next(), chars.next()) {
        (Some(id), None) if id.is_ascii_lowercase() => Some(id),
        _ => None,
    }
}

fn parse_flags(input: &str) -> Option<Vec<bool>> {
    if input.chars().count() != mask::NUM_TRACKS {
        return None;
    }
    input
        .chars()
        .map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}
