use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use rp_calib::{Calibration, Mmio, CALIBRATION_BASE, DEV_MEM};

/// Write DAC/ADC gain and offset calibration into the FPGA register block
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// gain_dac offset_dac gain_adc offset_adc (all four, or none for defaults)
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    values: Vec<String>,

    /// Physical memory device to map
    #[arg(long, env = "RP_CALIB_DEV_MEM", default_value = DEV_MEM)]
    dev_mem: PathBuf,

    /// Physical address of the register block (decimal or 0x hex)
    #[arg(long, env = "RP_CALIB_BASE", value_parser = parse_addr, default_value_t = CALIBRATION_BASE)]
    base: u64,

    /// Report the mapping and every written word
    #[arg(short, long)]
    verbose: bool,
}

fn parse_addr(s: &str) -> std::result::Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let cal = Calibration::from_args(args.values.as_slice());

    let mut mm = Mmio::map_device(&args.dev_mem, args.base, Mmio::page_size())?;
    if args.verbose {
        println!(
            "Mapped {} bytes of {} at {:#X}",
            mm.len(),
            args.dev_mem.display(),
            mm.base()
        );
    }

    let mut regs = mm
        .registers()
        .with_context(|| format!("placing register block at {:#X}", args.base))?;
    regs.apply(&cal);

    if args.verbose {
        for (i, word) in cal.words().iter().enumerate() {
            println!("Wrote 0x{:08X} to {:#X}", word, args.base + 4 * i as u64);
        }
    }

    Ok(())
}
