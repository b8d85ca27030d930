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
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};

use mixkeys::console::Console;
use mixkeys::host::{sim, Host};
use mixkeys::mask;
use mixkeys::plugin::Plugin;
use mixkeys::settings::{Settings, SOURCE_KEY};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A hotkey-driven mixer track router."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renders a track mask from per-track 0/1 flags.
    Mask {
        /// The track flags, one character per track. For example, 100100.
        flags: String,
    },
    /// Runs the plugin interactively against a simulated host.
    Run {
        /// The path to the settings file.
        settings_path: String,
        /// Comma-separated audio source names for the simulated host.
        #[arg(short, long)]
        sources: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mask { flags } => {
            let flags = flags
                .chars()
                .map(|c| match c {
                    '0' => Ok(false),
                    '1' => Ok(true),
                    _ => Err("track flags must be 0 or 1"),
                })
                .collect::<Result<Vec<bool>, &str>>()?;
            let mask = mask::mask_from_flags(&flags)?;

            println!("{:#04x} ({})", mask, mask::render_mask(mask));
        }
        Commands::Run {
            settings_path,
            sources,
        } => {
            let path = PathBuf::from(settings_path);
            let mut settings = if path.exists() {
                Settings::load(&path)?
            } else {
                Settings::new()
            };

            let sources: Vec<String> = match sources {
                Some(sources) => sources.split(',').map(str::to_string).collect(),
                None => vec!["desktop-audio".to_string(), "microphone".to_string()],
            };
            let host = Arc::new(sim::Host::new(&sources));

            // Default the target source so first-run settings apply somewhere.
            if settings.get_string(SOURCE_KEY).is_empty() {
                if let Some(first) = host.list_audio_sources().first() {
                    settings.set_string(SOURCE_KEY, first);
                }
            }

            let mut plugin = Plugin::load(&settings, host.clone())?;
            plugin.update(&mut settings);

            let mut console =
                Console::new(&mut plugin, &mut settings, host.as_ref(), Some(path.as_path()));
            console.run(io::stdin().lock(), io::stdout())?;

            plugin.unload();
        }
    }

    Ok(())
}
