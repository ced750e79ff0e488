use std::path::PathBuf;

use crate::drives::{mounted_drives, Drive};

/// Volume label of an RP2040 in BOOTSEL mode.
pub const TARGET_LABEL: &str = "RPI-RP2";

/// Access to the mounted volumes of the host.
pub trait Volumes {
    /// Bitmask of mounted drive letters, bit 0 being `A`.
    fn logical_drives(&self) -> anyhow::Result<u32>;

    /// Volume label of a drive.
    fn volume_label(&self, drive: &Drive) -> anyhow::Result<String>;

    /// Directory that files for the drive are copied into.
    fn mount_point(&self, drive: &Drive) -> PathBuf {
        drive.root()
    }
}

/// Check whether the drive carries the given volume label.
///
/// Failing to read the label counts as a mismatch.
pub fn has_label<V: Volumes + ?Sized>(volumes: &V, drive: &Drive, label: &str) -> bool {
    match volumes.volume_label(drive) {
        Ok(drive_label) => {
            log::debug!("{drive} has label `{drive_label}`");
            drive_label == label
        }
        Err(err) => {
            log::debug!("Cannot read label of {drive}: {err:#}");
            false
        }
    }
}

/// Find the first mounted drive with the given volume label.
pub fn find_drive<V: Volumes + ?Sized>(volumes: &V, label: &str) -> Option<Drive> {
    mounted_drives(volumes)
        .into_iter()
        .find(|drive| has_label(volumes, drive, label))
}

/// Volumes of the running system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemVolumes;

#[cfg(windows)]
impl Volumes for SystemVolumes {
    fn logical_drives(&self) -> anyhow::Result<u32> {
        use windows::Win32::Storage::FileSystem::GetLogicalDrives;

        let mask = unsafe { GetLogicalDrives() };
        if mask == 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(mask)
    }

    fn volume_label(&self, drive: &Drive) -> anyhow::Result<String> {
        use anyhow::Context;
        use windows::core::PCWSTR;
        use windows::Win32::Storage::FileSystem::GetVolumeInformationW;

        let root: Vec<u16> = drive
            .root()
            .to_string_lossy()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();

        let mut label = [0u16; 256];
        let result = unsafe {
            GetVolumeInformationW(
                PCWSTR(root.as_ptr()),
                Some(&mut label),
                None,
                None,
                None,
                None,
            )
        };
        result.with_context(|| format!("Cannot get volume information for {drive}"))?;

        let len = label.iter().position(|&c| c == 0).unwrap_or(label.len());
        Ok(String::from_utf16_lossy(&label[..len]))
    }
}

// Drive letters only exist on Windows, elsewhere nothing is ever mounted.
#[cfg(not(windows))]
impl Volumes for SystemVolumes {
    fn logical_drives(&self) -> anyhow::Result<u32> {
        Ok(0)
    }

    fn volume_label(&self, drive: &Drive) -> anyhow::Result<String> {
        anyhow::bail!("Volume labels of {drive} are only available on Windows")
    }
}
