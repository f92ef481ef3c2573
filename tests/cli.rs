use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rp_calib::Mmio;

fn scratch(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rp_calib_cli_{}_{}", name, std::process::id()));
    let f = File::create(&path).unwrap();
    f.set_len(Mmio::page_size() as u64).unwrap();
    path
}

fn set_calibration(dev: &Path, values: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_set_calibration"))
        .env_remove("RP_CALIB_DEV_MEM")
        .env_remove("RP_CALIB_BASE")
        .arg("--dev-mem")
        .arg(dev)
        .args(["--base", "0"])
        .args(values)
        .output()
        .unwrap()
}

fn registers(dev: &Path) -> [u32; 4] {
    let bytes = fs::read(dev).unwrap();
    let mut words = [0u32; 4];
    for (i, w) in words.iter_mut().enumerate() {
        *w = u32::from_ne_bytes(bytes[4 * i..4 * i + 4].try_into().unwrap());
    }
    words
}

#[test]
fn defaults_without_arguments() {
    let dev = scratch("defaults");
    let out = set_calibration(&dev, &[]);
    let regs = registers(&dev);
    fs::remove_file(&dev).unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(regs, [2048, 82, 4252, 228]);
}

#[test]
fn four_arguments_truncated_in_order() {
    let dev = scratch("four");
    let out = set_calibration(&dev, &["2000.7", "80", "-1", "abc"]);
    let regs = registers(&dev);
    fs::remove_file(&dev).unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(regs, [2000, 80, 0xFFFF_FFFF, 0]);
}

#[test]
fn wrong_count_uses_defaults() {
    let dev = scratch("three");
    let out = set_calibration(&dev, &["1", "2", "3"]);
    let regs = registers(&dev);
    fs::remove_file(&dev).unwrap();

    assert!(out.status.success());
    assert_eq!(regs, [2048, 82, 4252, 228]);
}

#[test]
fn hyphenated_values_are_numbers_not_options() {
    let dev = scratch("hyphen");
    let out = set_calibration(&dev, &["-.5", "-abc", "-inf", "-0x10"]);
    let regs = registers(&dev);
    fs::remove_file(&dev).unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(regs, [0, 0, 0x8000_0000, 0xFFFF_FFF0]);
}

#[test]
fn lone_dash_reads_as_zero() {
    let dev = scratch("dash");
    let out = set_calibration(&dev, &["1", "2", "-", "-2.9"]);
    let regs = registers(&dev);
    fs::remove_file(&dev).unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(regs, [1, 2, 0, 0xFFFF_FFFE]);
}

#[test]
fn missing_device_exits_with_one() {
    let dev = std::env::temp_dir().join(format!("rp_calib_cli_missing_{}", std::process::id()));
    let out = set_calibration(&dev, &["1", "2", "3", "4"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("open"));
    assert!(!dev.exists());
}

#[test]
fn rerun_is_idempotent() {
    let dev = scratch("rerun");
    let args = ["10", "20", "30", "40"];
    set_calibration(&dev, &args);
    let first = registers(&dev);
    set_calibration(&dev, &args);
    let second = registers(&dev);
    fs::remove_file(&dev).unwrap();

    assert_eq!(first, [10, 20, 30, 40]);
    assert_eq!(first, second);
}

#[test]
fn verbose_reports_writes() {
    let dev = scratch("verbose");
    let out = Command::new(env!("CARGO_BIN_EXE_set_calibration"))
        .arg("-v")
        .arg("--dev-mem")
        .arg(&dev)
        .args(["--base", "0x0"])
        .output()
        .unwrap();
    fs::remove_file(&dev).unwrap();

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success());
    assert!(stdout.contains("Wrote 0x00000800 to 0x0"));
    assert!(stdout.contains("Wrote 0x000000E4 to 0xC"));
}
