//! End-to-end tests of the upload flow.
//!
//! Drives are simulated by a fake `Volumes` whose mount points are
//! temporary directories, so the real copy path runs unchanged.
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::bail;
use tempfile::TempDir;
use upload_uf2::drives::Drive;
use upload_uf2::flags::UploadUf2;
use upload_uf2::upload::{run, Outcome};
use upload_uf2::volume::Volumes;

struct FakeDrive {
    label: &'static str,
    mount: PathBuf,
}

#[derive(Default)]
struct FakeVolumes {
    drives: HashMap<char, FakeDrive>,
}

impl FakeVolumes {
    fn with_drive(mut self, letter: char, label: &'static str, mount: &Path) -> Self {
        self.drives.insert(
            letter,
            FakeDrive {
                label,
                mount: mount.to_path_buf(),
            },
        );
        self
    }
}

impl Volumes for FakeVolumes {
    fn logical_drives(&self) -> anyhow::Result<u32> {
        Ok(self
            .drives
            .keys()
            .fold(0, |mask, &letter| mask | 1u32 << (letter as u8 - b'A')))
    }

    fn volume_label(&self, drive: &Drive) -> anyhow::Result<String> {
        match self.drives.get(&drive.letter()) {
            Some(fake) => Ok(fake.label.to_string()),
            None => bail!("{drive} is not mounted"),
        }
    }

    fn mount_point(&self, drive: &Drive) -> PathBuf {
        self.drives[&drive.letter()].mount.clone()
    }
}

fn flags(args: &[&OsString]) -> UploadUf2 {
    UploadUf2::from_vec(args.iter().map(|&arg| arg.clone()).collect()).unwrap()
}

fn firmware(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("blink.uf2");
    let content: Vec<u8> = (0..2048u32).map(|i| (i * 7) as u8).collect();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn copies_to_matching_drive() {
    let source_dir = TempDir::new().unwrap();
    let pico = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    let source = firmware(&source_dir);

    let volumes = FakeVolumes::default()
        .with_drive('C', "Windows", other.path())
        .with_drive('E', "RPI-RP2", pico.path());

    let outcome = run(&flags(&[&source.clone().into_os_string()]), &volumes);

    assert_eq!(outcome, Outcome::Attempted);
    assert_eq!(
        fs::read(pico.path().join("blink.uf2")).unwrap(),
        fs::read(&source).unwrap()
    );
    assert!(!other.path().join("blink.uf2").exists());
}

#[test]
fn missing_source_fails() {
    let source_dir = TempDir::new().unwrap();
    let pico = TempDir::new().unwrap();
    let volumes = FakeVolumes::default().with_drive('E', "RPI-RP2", pico.path());

    let missing = source_dir.path().join("missing.uf2").into_os_string();
    assert_eq!(run(&flags(&[&missing]), &volumes), Outcome::Failed);
    assert_eq!(fs::read_dir(pico.path()).unwrap().count(), 0);
}

#[test]
fn directory_source_fails() {
    let source_dir = TempDir::new().unwrap();
    let volumes = FakeVolumes::default();

    let dir = source_dir.path().as_os_str().to_owned();
    assert_eq!(run(&flags(&[&dir]), &volumes), Outcome::Failed);
}

#[test]
fn no_matching_drive_fails() {
    let source_dir = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    let source = firmware(&source_dir).into_os_string();

    let volumes = FakeVolumes::default().with_drive('D', "DATA", data.path());

    assert_eq!(run(&flags(&[&source]), &volumes), Outcome::Failed);
    assert_eq!(fs::read_dir(data.path()).unwrap().count(), 0);
}

#[test]
fn label_can_be_overridden() {
    let source_dir = TempDir::new().unwrap();
    let pico2 = TempDir::new().unwrap();
    let source = firmware(&source_dir).into_os_string();

    let volumes = FakeVolumes::default().with_drive('F', "RP2350", pico2.path());

    let label_flag = OsString::from("--label");
    let label = OsString::from("RP2350");
    let outcome = run(&flags(&[&label_flag, &label, &source]), &volumes);

    assert_eq!(outcome, Outcome::Attempted);
    assert!(pico2.path().join("blink.uf2").is_file());
}

#[test]
fn rejected_write_still_succeeds() {
    let source_dir = TempDir::new().unwrap();
    let source = firmware(&source_dir).into_os_string();
    // A missing mount point stands in for a read-only medium, permission
    // bits do not stop writes when running as root.
    let unwritable = source_dir.path().join("ejected").join("drive");

    let volumes = FakeVolumes::default().with_drive('E', "RPI-RP2", &unwritable);

    assert_eq!(run(&flags(&[&source]), &volumes), Outcome::Attempted);
    assert!(!unwritable.exists());
}

fn upload_uf2() -> Command {
    Command::new(env!("CARGO_BIN_EXE_upload-uf2"))
}

#[test]
fn binary_without_argument_prints_usage() {
    let output = upload_uf2().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("usage: upload-uf2"));
}

#[test]
fn binary_with_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = upload_uf2()
        .arg(dir.path().join("missing.uf2"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("UF2 file not found"));
}

#[test]
fn binary_ignores_extra_arguments() {
    let dir = TempDir::new().unwrap();
    let source = firmware(&dir);
    let output = upload_uf2().arg(&source).arg("extra").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("usage: upload-uf2"));
    assert!(stdout.contains("Raspberry Pi Pico is not connected"));
    assert_eq!(output.status.code(), Some(1));
}
