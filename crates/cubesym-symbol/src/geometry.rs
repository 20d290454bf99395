//! Symbol layout.
//!
//! Everything here is integer arithmetic in grid units (mil, y pointing up).
//! The emitter converts to millimetres.

use serde::{Deserialize, Serialize};

use crate::bank::{BankName, BankSet};
use crate::metrics::widest_label;
use crate::pin::PinRecord;
use crate::SymbolError;

/// Vertical distance between two pins.
pub const PIN_SPACING: i64 = 100;
/// Pin slots reserved per row of side banks in a consolidated symbol.
pub const BANK_ROW_PITCH: i64 = 17;
pub const PIN_LENGTH: i64 = 300;
/// Gap between the body outline and a pin name.
pub const PIN_NAME_OFFSET: i64 = 50;
pub const GRID: i64 = 100;
/// Width of two spaces, kept free between the labels and the outline.
pub const LABEL_PADDING: i64 = 76;
/// Extra width given to each unit of a multi-part symbol.
pub const UNIT_MARGIN: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// One body with every bank around its edges
    Consolidated,
    /// One unit per non-empty bank
    MultiPart,
}

/// Direction a pin points to, away from its connection point into the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Right,
    Up,
    Left,
    Down,
}

impl Orientation {
    /// Rotation in degrees as KiCad writes it.
    pub fn angle(self) -> u32 {
        match self {
            Orientation::Right => 0,
            Orientation::Up => 90,
            Orientation::Left => 180,
            Orientation::Down => 270,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub start: Point,
    pub end: Point,
}

/// Where a bank's pins go: the first pin sits at `origin`, the rest follow
/// `spacing` apart down the edge (or rightwards for vertical pins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankPlacement {
    pub bank: BankName,
    pub origin: Point,
    pub spacing: i64,
    pub orientation: Orientation,
}

impl BankPlacement {
    pub fn pin_position(&self, index: usize) -> Point {
        let step = self.spacing * index as i64;
        match self.orientation {
            Orientation::Right | Orientation::Left => {
                Point::new(self.origin.x, self.origin.y - step)
            }
            Orientation::Up | Orientation::Down => Point::new(self.origin.x + step, self.origin.y),
        }
    }
}

/// One drawn unit: an outline plus the banks placed around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Body {
    /// 1-based KiCad unit number
    pub unit: u32,
    pub label: Option<String>,
    pub width: i64,
    pub height: i64,
    pub frame: Rect,
    pub placements: Vec<BankPlacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolGeometry {
    pub mode: LayoutMode,
    pub bodies: Vec<Body>,
}

/// Next grid line strictly above `value`.
fn round_up(value: i64) -> i64 {
    value + (GRID - value.rem_euclid(GRID))
}

/// Half of a body height, floored to the grid.
fn half_height(height: i64) -> i64 {
    let half = height / 2;
    half - half.rem_euclid(GRID)
}

/// Half of a body width, moved up to the grid when it falls between lines.
fn half_width(width: i64) -> i64 {
    let half = width / 2;
    half + half.rem_euclid(GRID)
}

/// Width of a body carrying labels on `sides` edges for a widest label of
/// `widest` grid units.
fn body_width(widest: i64, sides: i64) -> i64 {
    round_up((widest + PIN_NAME_OFFSET + PIN_LENGTH) * sides + LABEL_PADDING)
}

fn frame(half_width: i64, top: i64, height: i64) -> Rect {
    Rect {
        start: Point::new(-half_width + PIN_LENGTH, top + PIN_SPACING),
        end: Point::new(half_width - PIN_LENGTH, top - height),
    }
}

pub fn plan(banks: &BankSet, mode: LayoutMode) -> Result<SymbolGeometry, SymbolError> {
    let bodies = match mode {
        LayoutMode::Consolidated => vec![plan_consolidated(banks)?],
        LayoutMode::MultiPart => plan_units(banks)?,
    };
    Ok(SymbolGeometry { mode, bodies })
}

/// Pin rows taken by one side: a full row pitch for every bank but the
/// last, which only takes its own pins. An empty side takes nothing.
fn column_height(bank_sizes: &[usize]) -> i64 {
    match bank_sizes.split_last() {
        Some((last, rest)) => BANK_ROW_PITCH * rest.len() as i64 + *last as i64,
        None => 0,
    }
}

fn consolidated_height(banks: &BankSet) -> i64 {
    let (mut left, mut right) = (Vec::new(), Vec::new());
    for (i, (_, pins)) in banks.lateral().enumerate() {
        if i % 2 == 0 {
            left.push(pins.len());
        } else {
            right.push(pins.len());
        }
    }

    let supply = banks
        .pins(&BankName::Ground)
        .len()
        .max(banks.pins(&BankName::Power).len()) as i64;
    let sides = column_height(&left).max(column_height(&right));

    (sides + 1 + supply) * PIN_SPACING
}

fn plan_consolidated(banks: &BankSet) -> Result<Body, SymbolError> {
    let height = consolidated_height(banks);
    let top = half_height(height);

    let widest = widest_label(banks.all_pins().filter(|pin| !pin.is_synthetic()))?;
    let width = body_width(widest, 2);
    let half = half_width(width);

    let row_offset = |row: i64| top - PIN_SPACING * BANK_ROW_PITCH * row;
    let placement = |bank: &BankName, x: i64, y: i64, orientation| BankPlacement {
        bank: bank.clone(),
        origin: Point::new(x, y),
        spacing: PIN_SPACING,
        orientation,
    };

    let mut placements = Vec::new();
    let mut row = 0;
    let mut on_left = true;
    let (mut last_left, mut last_right) = (0, 0);

    for (name, pins) in banks.lateral() {
        if on_left {
            last_left = pins.len();
            last_right = 0;
            placements.push(placement(name, -half, row_offset(row), Orientation::Right));
        } else {
            last_right = pins.len();
            placements.push(placement(name, half, row_offset(row), Orientation::Left));
            row += 1;
        }
        on_left = !on_left;
    }

    // A completed row already advanced `row`; step back so VSS and VDD sit
    // under the last row instead of one row lower.
    if on_left && !placements.is_empty() {
        row -= 1;
    }

    let supply_y = row_offset(row) - PIN_SPACING * (last_left.max(last_right) as i64 + 1);
    placements.push(placement(
        &BankName::Power,
        -half,
        supply_y,
        Orientation::Right,
    ));
    placements.push(placement(
        &BankName::Ground,
        half,
        supply_y,
        Orientation::Left,
    ));

    Ok(Body {
        unit: 1,
        label: None,
        width,
        height,
        frame: frame(half, top, height),
        placements,
    })
}

/// Units in emission order: side banks by name, then `VSS`, then `VDD`,
/// skipping empty banks.
fn unit_order(banks: &BankSet) -> Vec<(&BankName, &[PinRecord])> {
    banks
        .lateral()
        .chain([
            (&BankName::Ground, banks.pins(&BankName::Ground)),
            (&BankName::Power, banks.pins(&BankName::Power)),
        ])
        .filter(|(_, pins)| !pins.is_empty())
        .collect()
}

fn plan_units(banks: &BankSet) -> Result<Vec<Body>, SymbolError> {
    unit_order(banks)
        .into_iter()
        .zip(1..)
        .map(|((name, pins), unit)| -> Result<Body, SymbolError> {
            let height = pins.len() as i64 * PIN_SPACING;
            let top = half_height(height);
            let width = body_width(widest_label(pins)?, 1) + UNIT_MARGIN;
            let half = half_width(width);

            Ok(Body {
                unit,
                label: Some(name.title()),
                width,
                height,
                frame: frame(half, top, height),
                placements: vec![BankPlacement {
                    bank: name.clone(),
                    origin: Point::new(half, top),
                    spacing: PIN_SPACING,
                    orientation: Orientation::Left,
                }],
            })
        })
        .collect()
}
