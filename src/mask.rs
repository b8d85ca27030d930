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
use crate::error::Error;

/// The number of mixer track slots per source.
pub const NUM_TRACKS: usize = 6;

/// A mask with every meaningful track bit set.
pub const FULL_MASK: u32 = (1 << NUM_TRACKS) - 1;

/// Packs an ordered sequence of track flags into a mixer mask. Bit `i` is
/// set iff `flags[i]` is true.
pub fn mask_from_flags(flags: &[bool]) -> Result<u32, Error> {
    if flags.len() != NUM_TRACKS {
        return Err(Error::Configuration(format!(
            "expected {} track flags, got {}",
            NUM_TRACKS,
            flags.len()
        )));
    }

    let mut mask = 0;
    for (track, flag) in flags.iter().enumerate() {
        if *flag {
            mask |= 1 << track;
        }
    }
    Ok(mask)
}

/// Unpacks a mixer mask into per-track flags. Inverse of [`mask_from_flags`].
pub fn flags_from_mask(mask: u32) -> [bool; NUM_TRACKS] {
    let mut flags = [false; NUM_TRACKS];
    for (track, flag) in flags.iter_mut().enumerate() {
        *flag = mask & (1 << track) != 0;
    }
    flags
}

/// Rejects masks with bits set beyond the track slots. Out-of-range bits are
/// a configuration bug and are never silently truncated.
pub fn validate_mask(mask: u32) -> Result<(), Error> {
    if mask > FULL_MASK {
        return Err(Error::Configuration(format!(
            "mask {:#04x} has bits set outside the {} track slots",
            mask, NUM_TRACKS
        )));
    }
    Ok(())
}

/// Renders a mask in a fixed-width, human-readable form, one `X` per set
/// track bit in ascending track order.
pub fn render_mask(mask: u32) -> String {
    let mut output = String::new();
    for track in 0..NUM_TRACKS {
        let marker = if mask & (1 << track) != 0 { 'X' } else { ' ' };
        output.push_str(&format!("Track {}: {}", track + 1, marker));
        if track < NUM_TRACKS - 1 {
            output.push_str(" | ");
        }
    }
    output
}

#[cfg(test)]
mod test {
    use super::{flags_from_mask, mask_from_flags, render_mask, validate_mask, FULL_MASK};

    #[test]
    fn test_mask_from_flags() {
        let mask = mask_from_flags(&[true, false, false, true, false, false])
            .expect("mask should have been computed");
        assert_eq!(0b001001, mask);
        assert_eq!(9, mask);

        assert_eq!(
            0,
            mask_from_flags(&[false; 6]).expect("mask should have been computed")
        );
        assert_eq!(
            FULL_MASK,
            mask_from_flags(&[true; 6]).expect("mask should have been computed")
        );
    }

    #[test]
    fn test_mask_from_flags_rejects_wrong_length() {
        assert!(mask_from_flags(&[]).is_err());
        assert!(mask_from_flags(&[true; 5]).is_err());
        assert!(mask_from_flags(&[true; 7]).is_err());
    }

    #[test]
    fn test_flags_roundtrip() {
        // Every valid mask maps to exactly one flag sequence and back.
        for mask in 0..=FULL_MASK {
            let flags = flags_from_mask(mask);
            assert_eq!(
                mask,
                mask_from_flags(&flags).expect("mask should have been computed")
            );
        }
    }

    #[test]
    fn test_validate_mask() {
        for mask in 0..=FULL_MASK {
            assert!(validate_mask(mask).is_ok());
        }
        assert!(validate_mask(FULL_MASK + 1).is_err());
        assert!(validate_mask(0x100).is_err());
        assert!(validate_mask(u32::MAX).is_err());
    }

    #[test]
    fn test_render_mask() {
        assert_eq!(
            "Track 1:   | Track 2:   | Track 3:   | Track 4:   | Track 5:   | Track 6:  ",
            render_mask(0)
        );
        assert_eq!(
            "Track 1: X | Track 2: X | Track 3: X | Track 4: X | Track 5: X | Track 6: X",
            render_mask(0b111111)
        );
        assert_eq!(
            "Track 1: X | Track 2:   | Track 3:   | Track 4: X | Track 5:   | Track 6:  ",
            render_mask(0b001001)
        );
    }

    #[test]
    fn test_render_mask_matches_set_bits() {
        for mask in 0..=FULL_MASK {
            let rendered = render_mask(mask);
            for (track, flag) in flags_from_mask(mask).iter().enumerate() {
                let marked = format!("Track {}: X", track + 1);
                assert_eq!(*flag, rendered.contains(&marked), "mask {:#04x}", mask);
            }
        }
    }
}
