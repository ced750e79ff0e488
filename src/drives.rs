use std::fmt;
use std::path::PathBuf;

use crate::volume::Volumes;

const DRIVE_LETTERS: std::ops::RangeInclusive<u8> = b'A'..=b'Z';

/// A mounted drive, identified by its letter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Drive {
    letter: char,
}

impl Drive {
    /// Create a drive for the given letter.
    ///
    /// Returns `None` when `letter` is not an ASCII letter.
    pub fn new(letter: char) -> Option<Self> {
        if letter.is_ascii_alphabetic() {
            Some(Drive {
                letter: letter.to_ascii_uppercase(),
            })
        } else {
            None
        }
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    /// Root directory of the drive, e.g. `D:\`.
    pub fn root(&self) -> PathBuf {
        PathBuf::from(format!("{}:\\", self.letter))
    }
}

impl fmt::Display for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.letter)
    }
}

/// Decode a logical drive bitmask.
///
/// Bit 0 is `A`, bit 25 is `Z`. The remaining high bits carry no
/// drive and are ignored.
pub fn drives_from_mask(mask: u32) -> Vec<Drive> {
    DRIVE_LETTERS
        .enumerate()
        .filter(|(bit, _)| mask & (1u32 << bit) != 0)
        .map(|(_, letter)| Drive {
            letter: letter as char,
        })
        .collect()
}

/// Get the drives that are currently mounted.
///
/// A failing bitmask query is treated as no drives being mounted.
pub fn mounted_drives<V: Volumes + ?Sized>(volumes: &V) -> Vec<Drive> {
    let mask = match volumes.logical_drives() {
        Ok(mask) => mask,
        Err(err) => {
            log::warn!("Cannot query logical drives: {err:#}");
            0
        }
    };

    let drives = drives_from_mask(mask);
    log::debug!("Logical drive mask {mask:#010x}: {} drives", drives.len());
    drives
}
