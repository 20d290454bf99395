//! Grouping of pins into banks.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::pin::{PinOrigin, PinRecord, PinType};

static GROUND_PIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^VSS").unwrap());
static POWER_PIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^VDD").unwrap());
static PORT_PIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^P([A-Z])\d").unwrap());
static QFN_PACKAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"QFPN(\d*)").unwrap());
static SORT_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\D*)(\d*)").unwrap());

/// Name of a bank. Banks order by their printed name, so `OTHER` lands
/// between the `O` and `P` ports and `VDD` precedes `VSS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BankName {
    /// GPIO port, by letter
    Port(char),
    /// `VSS`
    Ground,
    /// `VDD`
    Power,
    /// `OTHER`
    Other,
}

impl BankName {
    /// Title printed above the bank's unit in multi-part symbols.
    pub fn title(&self) -> String {
        match self {
            BankName::Port(letter) => format!("PORT {letter}"),
            other => other.to_string(),
        }
    }

    /// `VSS` and `VDD` share the bottom row of a consolidated symbol; every
    /// other bank is laid out on the sides.
    pub fn is_supply(&self) -> bool {
        matches!(self, BankName::Ground | BankName::Power)
    }
}

impl fmt::Display for BankName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankName::Port(letter) => write!(f, "{letter}"),
            BankName::Ground => f.write_str("VSS"),
            BankName::Power => f.write_str("VDD"),
            BankName::Other => f.write_str("OTHER"),
        }
    }
}

impl Ord for BankName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for BankName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for BankName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Package a chip is delivered in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Package {
    pub name: String,
    pub has_power_pad: bool,
}

impl Package {
    pub fn new(name: impl Into<String>, has_power_pad: bool) -> Self {
        Self {
            name: name.into(),
            has_power_pad,
        }
    }
}

/// Finalized mapping from bank name to the bank's pins in output order.
///
/// `VSS`, `VDD` and `OTHER` are always present, port banks only when at
/// least one pin belongs to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BankSet {
    banks: BTreeMap<BankName, Vec<PinRecord>>,
}

impl Default for BankSet {
    fn default() -> Self {
        let banks = [BankName::Other, BankName::Ground, BankName::Power]
            .into_iter()
            .map(|name| (name, Vec::new()))
            .collect();
        Self { banks }
    }
}

impl BankSet {
    pub fn pins(&self, name: &BankName) -> &[PinRecord] {
        self.banks.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every bank in name order
    pub fn iter(&self) -> impl Iterator<Item = (&BankName, &[PinRecord])> {
        self.banks.iter().map(|(name, pins)| (name, pins.as_slice()))
    }

    /// Banks drawn on the sides of a consolidated symbol: all but `VSS` and
    /// `VDD`, in name order. `OTHER` is included even when empty.
    pub fn lateral(&self) -> impl Iterator<Item = (&BankName, &[PinRecord])> {
        self.iter().filter(|(name, _)| !name.is_supply())
    }

    pub fn all_pins(&self) -> impl Iterator<Item = &PinRecord> {
        self.banks.values().flatten()
    }

    pub fn pin_count(&self) -> usize {
        self.banks.values().map(Vec::len).sum()
    }

    fn push(&mut self, name: BankName, pin: PinRecord) {
        self.banks.entry(name).or_default().push(pin);
    }
}

/// Bank a pin name belongs to.
pub fn bank_for(name: &str) -> BankName {
    if GROUND_PIN.is_match(name) {
        BankName::Ground
    } else if POWER_PIN.is_match(name) {
        BankName::Power
    } else if let Some(port) = PORT_PIN
        .captures(name)
        .and_then(|caps| caps[1].chars().next())
    {
        BankName::Port(port)
    } else {
        BankName::Other
    }
}

/// Sort key ordering pins within a bank: the leading non-digit run of the
/// name followed by the next digit run zero-padded to three places, so `PA9`
/// sorts before `PA10`.
pub fn pin_sort_key(name: &str) -> String {
    match SORT_KEY.captures(name) {
        Some(caps) => format!("{}{:0>3}", &caps[1], &caps[2]),
        None => name.to_string(),
    }
}

/// Assign every pin to exactly one bank, add the exposed pad of QFN
/// packages to `VSS`, and order each bank by [`pin_sort_key`].
pub fn classify(
    pins: Vec<PinRecord>,
    package: &Package,
    sink: &mut dyn DiagnosticSink,
) -> BankSet {
    let mut banks = BankSet::default();
    for pin in pins {
        banks.push(bank_for(&pin.name), pin);
    }

    if let Some(pad) = exposed_pad(package, &banks, sink) {
        banks.push(BankName::Ground, pad);
    }

    for pins in banks.banks.values_mut() {
        pins.sort_by_cached_key(|pin| pin_sort_key(&pin.name));
    }

    banks
}

fn exposed_pad(
    package: &Package,
    banks: &BankSet,
    sink: &mut dyn DiagnosticSink,
) -> Option<PinRecord> {
    let caps = QFN_PACKAGE.captures(&package.name)?;
    let Ok(count) = caps[1].parse::<u32>() else {
        sink.report(Diagnostic::PadCountMissing {
            package: package.name.clone(),
        });
        return None;
    };

    let pin_type = if package.has_power_pad {
        PinType::Power
    } else {
        PinType::Passive
    };
    let number = (count + 1).to_string();
    if banks.all_pins().any(|pin| pin.number == number) {
        sink.report(Diagnostic::PadNumberTaken {
            package: package.name.clone(),
            number,
        });
        return None;
    }

    let mut pad = PinRecord::new(number, "Pad", pin_type);
    pad.origin = PinOrigin::ExposedPad;

    sink.report(Diagnostic::PadSynthesized {
        package: package.name.clone(),
        number: pad.number.clone(),
        pin_type: pad.pin_type.to_string(),
    });
    Some(pad)
}
