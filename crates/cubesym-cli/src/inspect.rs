use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use cubesym_mcu_db::{read_mcu_file, ReadOptions};
use cubesym_symbol::{build_banks, BankSet, LogSink, PinLabels};
use itertools::Itertools;

#[derive(Args, Debug, Clone)]
#[command(about = "Show how the pins of one MCU definition are merged and banked")]
pub struct InspectArgs {
    /// MCU definition XML file
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Ignore alternate functions
    #[arg(long)]
    pub short_pins: bool,

    /// Print the banks as JSON
    #[arg(long)]
    pub json: bool,
}

fn print_banks(banks: &BankSet) {
    for (name, pins) in banks.iter() {
        println!("{} ({} pins)", name.title().bold(), pins.len());
        for pin in pins {
            let alternates = if pin.alternates.is_empty() {
                String::new()
            } else {
                format!(" [{}]", pin.alternates.iter().join(", "))
            };
            println!(
                "  {:>4}  {:<24} {}{}",
                pin.number,
                pin.name,
                pin.pin_type.to_string().cyan(),
                alternates.dimmed()
            );
        }
    }
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let options = ReadOptions {
        collect_signals: !args.short_pins,
    };
    let mcu = read_mcu_file(&args.file, &options)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let labels = if args.short_pins {
        PinLabels::Short
    } else {
        PinLabels::Full
    };
    let banks = build_banks(&mcu, labels, &mut LogSink::new(mcu.ref_name.clone()));

    if args.json {
        let json = serde_json::json!({
            "ref_name": mcu.ref_name,
            "package": mcu.package,
            "banks": banks,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!(
        "{} {} ({} pins)",
        mcu.ref_name.green().bold(),
        mcu.package.name,
        banks.pin_count()
    );
    print_banks(&banks);
    Ok(())
}
