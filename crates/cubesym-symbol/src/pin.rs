use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Electrical type as written in the MCU database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum PinType {
    Io,
    MonoIo,
    Input,
    Boot,
    Reset,
    Output,
    Supply,
    Power,
    NoConnect,
    Passive,
    /// Result of merging records whose types disagree.
    DualRole,
    Empty,
    Unrecognized(String),
}

impl PinType {
    pub fn parse(source: &str) -> Self {
        match source.trim() {
            "I/O" => PinType::Io,
            "MonoIO" => PinType::MonoIo,
            "I" => PinType::Input,
            "Boot" => PinType::Boot,
            "Reset" => PinType::Reset,
            "O" => PinType::Output,
            "S" => PinType::Supply,
            "Power" => PinType::Power,
            "NC" => PinType::NoConnect,
            "Passive" => PinType::Passive,
            "" => PinType::Empty,
            other => PinType::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PinType::Io => "I/O",
            PinType::MonoIo => "MonoIO",
            PinType::Input => "I",
            PinType::Boot => "Boot",
            PinType::Reset => "Reset",
            PinType::Output => "O",
            PinType::Supply => "S",
            PinType::Power => "Power",
            PinType::NoConnect => "NC",
            PinType::Passive => "Passive",
            PinType::DualRole => "dual-role",
            PinType::Empty => "",
            PinType::Unrecognized(source) => source,
        }
    }
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PinOrigin {
    /// Listed in the package data
    #[default]
    Package,
    /// Exposed thermal pad added for QFN packages
    ExposedPad,
}

/// One physical pin of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinRecord {
    pub number: String,
    pub name: String,
    pub pin_type: PinType,
    pub alternates: Vec<String>,
    pub origin: PinOrigin,
}

impl PinRecord {
    /// Whitespace is removed from `name`.
    pub fn new(number: impl Into<String>, name: &str, pin_type: PinType) -> Self {
        Self {
            number: number.into(),
            name: name.chars().filter(|c| !c.is_whitespace()).collect(),
            pin_type,
            alternates: Vec::new(),
            origin: PinOrigin::Package,
        }
    }

    pub fn with_alternates<I, S>(mut self, alternates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for alternate in alternates {
            push_unique(&mut self.alternates, alternate.into());
        }
        self
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin != PinOrigin::Package
    }

    /// Full label: the name followed by every alternate function, `/` separated.
    pub fn label(&self) -> String {
        if self.alternates.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.name, self.alternates.join("/"))
        }
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Collapse records sharing a pin number into one record per number, in
/// first-seen order.
///
/// The first name seen for a number stays the pin name; later names that
/// differ become alternate functions, followed by their own functions. If
/// the merged records disagree on the electrical type the result is
/// [`PinType::DualRole`]. `DualRole` absorbs any further type, so the outcome
/// only depends on the set of types merged, not on their order.
pub fn merge_pins<I>(records: I, sink: &mut dyn DiagnosticSink) -> Vec<PinRecord>
where
    I: IntoIterator<Item = PinRecord>,
{
    let mut merged: Vec<PinRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(&slot) = index.get(&record.number) else {
            index.insert(record.number.clone(), merged.len());
            merged.push(record);
            continue;
        };

        let pin = &mut merged[slot];
        if pin.name != record.name {
            push_unique(&mut pin.alternates, record.name.clone());
        }
        for alternate in record.alternates {
            push_unique(&mut pin.alternates, alternate);
        }
        if pin.pin_type != record.pin_type {
            pin.pin_type = PinType::DualRole;
        }

        sink.report(Diagnostic::PinMerged {
            number: pin.number.clone(),
            name: pin.name.clone(),
            merged_name: record.name,
            pin_type: pin.pin_type.to_string(),
            alternates: pin.alternates.clone(),
        });
    }

    merged
}
