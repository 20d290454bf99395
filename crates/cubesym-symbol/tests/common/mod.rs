#![allow(dead_code)]

use cubesym_symbol::{McuDefinition, Package, PinRecord, PinType};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn pin(number: &str, name: &str, pin_type: &str) -> PinRecord {
    PinRecord::new(number, name, PinType::parse(pin_type))
}

pub fn gpio(number: &str, name: &str, alternates: &[&str]) -> PinRecord {
    pin(number, name, "I/O").with_alternates(alternates.iter().copied())
}

/// Eight pin QFN part used throughout the layout tests:
/// ports A (3 pins) and B (1 pin), one OTHER pin, one supply pin each and
/// the exposed pad numbered 9.
pub fn small_qfn() -> McuDefinition {
    McuDefinition {
        ref_name: "STM32T001U8".to_string(),
        package: Package::new("UFQFPN8", false),
        pins: vec![
            pin("1", "VDD", "Power"),
            gpio("2", "PA0", &["ADC_IN0"]),
            gpio("3", "PA1", &[]),
            pin("4", "NRST", "Reset"),
            pin("5", "VSS", "Power"),
            gpio("6", "PB0", &[]),
            gpio("7", "PA10", &[]),
            pin("8", "BOOT0", "Boot"),
        ],
    }
}

/// A part without any GPIO port.
pub fn portless() -> McuDefinition {
    McuDefinition {
        ref_name: "PORTLESS".to_string(),
        package: Package::new("SO8", false),
        pins: vec![
            pin("1", "NRST", "Reset"),
            pin("2", "BOOT0", "Boot"),
            pin("3", "VDD", "Power"),
            pin("4", "VSS", "Power"),
        ],
    }
}
