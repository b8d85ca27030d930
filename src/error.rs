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

/// Typed errors for the registry and settings layer so callers can tell
/// fatal misconfiguration apart from recoverable runtime failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fatal misconfiguration, surfaced at startup. Aborts initialization.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A lookup used a group identifier the registry never created.
    #[error("no track group with id '{0}'")]
    UnknownGroup(char),

    /// Mask application was requested before a target source was configured.
    #[error("no target source configured")]
    NoTargetSource,

    /// The configured target source does not exist in the host.
    #[error("target source '{0}' not found")]
    TargetNotFound(String),

    /// Settings file I/O or parse failure.
    #[error("settings error: {0}")]
    Settings(String),
}
