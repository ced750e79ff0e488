use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use itertools::Itertools;
use xshell::Shell;

use crate::copy::copy_to_mount;
use crate::flags::UploadUf2;
use crate::uf2::{family_name, Uf2Summary};
use crate::volume::{find_drive, Volumes};

/// Result of an upload run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The copy step was reached, whether or not the copy succeeded.
    Attempted,
    /// The run stopped before copying.
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Attempted => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
        }
    }
}

/// Copy the firmware in `flags` to the first drive with the target label.
pub fn run<V: Volumes + ?Sized>(flags: &UploadUf2, volumes: &V) -> Outcome {
    let uf2_path = &flags.uf2_path;
    if !flags.rest.is_empty() {
        log::debug!("Ignoring extra arguments: {:?}", flags.rest);
    }
    if !uf2_path.is_file() {
        println!("UF2 file not found: {}", uf2_path.display());
        return Outcome::Failed;
    }

    describe_firmware(uf2_path);

    let drive = match find_drive(volumes, flags.label()) {
        Some(drive) => drive,
        None => {
            println!("Raspberry Pi Pico is not connected in mass-storage (BOOTSEL) mode.");
            return Outcome::Failed;
        }
    };
    let mount = volumes.mount_point(&drive);
    log::info!("Found `{}` on {drive}", flags.label());

    println!(
        "Copying UF2 file: {} -> {}",
        uf2_path.display(),
        mount.display()
    );
    match copy(uf2_path, &mount) {
        Ok(destination) => {
            log::debug!("Wrote `{}`", destination.display());
            println!("Copy complete.");
        }
        Err(err) => println!("Error while copying: {err:#}"),
    }

    Outcome::Attempted
}

fn copy(source: &Path, mount: &Path) -> anyhow::Result<PathBuf> {
    let shell = Shell::new()?;
    copy_to_mount(&shell, source, mount)
}

/// Print the block count and families of the firmware.
///
/// The image is copied as-is, so problems are only reported. This is a
/// separate read of the file, the copy reads it again.
fn describe_firmware(uf2_path: &Path) {
    let summary = File::open(uf2_path).and_then(|f| Uf2Summary::read(BufReader::new(f)));
    match summary {
        Ok(summary) if summary.blocks == 0 => {
            log::warn!("`{}` contains no UF2 blocks", uf2_path.display())
        }
        Ok(summary) => {
            let families = summary
                .family_ids
                .iter()
                .map(|&id| family_name(id).map_or_else(|| format!("{id:#010x}"), str::to_owned))
                .join(", ");
            if families.is_empty() {
                println!("Firmware: {} UF2 blocks", summary.blocks);
            } else {
                println!("Firmware: {} UF2 blocks ({families})", summary.blocks);
            }
        }
        Err(err) => log::warn!("Cannot read `{}` as UF2: {err}", uf2_path.display()),
    }
}

