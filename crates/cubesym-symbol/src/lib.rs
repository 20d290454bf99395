//! Layout engine turning microcontroller pin definitions into KiCad
//! schematic symbols.
//!
//! The pipeline for one chip is [`merge_pins`] → [`classify`] → [`plan`] →
//! [`emit_symbol`]; [`generate_symbols`] runs all of it for every requested
//! layout and [`LibraryWriter`] collects the results into a library file.

pub mod bank;
pub mod diagnostics;
pub mod emit;
pub mod geometry;
pub mod library;
pub mod metrics;
pub mod pin;

use std::fmt;
use std::str::FromStr;

use cubesym_sexpr::Sexpr;
use serde::{Deserialize, Serialize};

pub use bank::{classify, BankName, BankSet, Package};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, NullSink, Severity};
pub use emit::{emit_symbol, report_type_fallbacks};
pub use geometry::{plan, LayoutMode, SymbolGeometry};
pub use library::LibraryWriter;
pub use pin::{merge_pins, PinOrigin, PinRecord, PinType};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("unsupported glyph {glyph:?} in label '{label}'")]
    UnsupportedGlyph { glyph: char, label: String },
}

/// Pin data of one chip as read from the database, before merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McuDefinition {
    pub ref_name: String,
    pub package: Package,
    pub pins: Vec<PinRecord>,
}

/// Which symbol variants to generate per chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutSelection {
    /// One consolidated body
    Single,
    /// One unit per bank
    Multi,
    /// Both variants, the multi-part symbol named with a `_u` suffix
    #[default]
    Both,
}

impl LayoutSelection {
    pub fn modes(self) -> &'static [LayoutMode] {
        match self {
            LayoutSelection::Single => &[LayoutMode::Consolidated],
            LayoutSelection::Multi => &[LayoutMode::MultiPart],
            LayoutSelection::Both => &[LayoutMode::Consolidated, LayoutMode::MultiPart],
        }
    }
}

impl FromStr for LayoutSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(LayoutSelection::Single),
            "multi" => Ok(LayoutSelection::Multi),
            "both" => Ok(LayoutSelection::Both),
            other => Err(format!(
                "unknown layout '{other}', expected one of: single, multi, both"
            )),
        }
    }
}

impl fmt::Display for LayoutSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayoutSelection::Single => "single",
            LayoutSelection::Multi => "multi",
            LayoutSelection::Both => "both",
        })
    }
}

/// What goes into a pin's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinLabels {
    /// The pin name followed by its alternate functions
    #[default]
    Full,
    /// The pin name only. Names merged in from records sharing the pin
    /// number are dropped along with the functions.
    Short,
}

/// Library name of the symbol drawn for `ref_name` in `mode`.
pub fn symbol_name(ref_name: &str, mode: LayoutMode) -> String {
    match mode {
        LayoutMode::Consolidated => ref_name.to_string(),
        LayoutMode::MultiPart => format!("{ref_name}_u"),
    }
}

/// Merge and classify the pins of `mcu`.
///
/// Pins whose type falls back to `bidirectional` are reported here, once per
/// chip, however many symbols are drawn from the banks afterwards.
pub fn build_banks(
    mcu: &McuDefinition,
    labels: PinLabels,
    sink: &mut dyn DiagnosticSink,
) -> BankSet {
    let mut pins = merge_pins(mcu.pins.iter().cloned(), sink);
    if labels == PinLabels::Short {
        for pin in &mut pins {
            pin.alternates.clear();
        }
    }

    let banks = classify(pins, &mcu.package, sink);
    report_type_fallbacks(&banks, sink);
    banks
}

/// Generate the symbols for one chip, one per layout in `selection`.
pub fn generate_symbols(
    mcu: &McuDefinition,
    selection: LayoutSelection,
    labels: PinLabels,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<Sexpr>, SymbolError> {
    let banks = build_banks(mcu, labels, sink);
    log::debug!(
        "{}: {} pins in {} banks",
        mcu.ref_name,
        banks.pin_count(),
        banks.iter().count()
    );

    selection
        .modes()
        .iter()
        .map(|&mode| -> Result<Sexpr, SymbolError> {
            let geometry = plan(&banks, mode)?;
            let name = symbol_name(&mcu.ref_name, mode);
            Ok(emit_symbol(&name, &mcu.package.name, &banks, &geometry))
        })
        .collect()
}
