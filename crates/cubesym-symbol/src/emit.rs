//! Conversion of a planned symbol into a KiCad `(symbol ...)` block.

use cubesym_sexpr::Sexpr;

use crate::bank::BankSet;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::geometry::{Body, Point, SymbolGeometry, PIN_LENGTH, PIN_NAME_OFFSET, PIN_SPACING};
use crate::pin::{PinRecord, PinType};

/// Text height of every field and pin label.
const TEXT_SIZE: i64 = 50;
const FRAME_STROKE: i64 = 10;

/// Format a grid value (mil) as millimetres without rounding noise.
pub fn format_mm(grid: i64) -> String {
    // 1 mil is 254 ten-thousandths of a millimetre
    let scaled = grid * 254;
    let sign = if scaled < 0 { "-" } else { "" };
    let scaled = scaled.unsigned_abs();
    let (whole, frac) = (scaled / 10_000, scaled % 10_000);
    if frac == 0 {
        format!("{sign}{whole}")
    } else {
        let frac = format!("{frac:04}");
        format!("{sign}{whole}.{}", frac.trim_end_matches('0'))
    }
}

fn mm(grid: i64) -> Sexpr {
    Sexpr::symbol(format_mm(grid))
}

fn at(point: Point, angle: u32) -> Sexpr {
    Sexpr::node(
        "at",
        [mm(point.x), mm(point.y), Sexpr::symbol(angle.to_string())],
    )
}

fn xy(head: &str, point: Point) -> Sexpr {
    Sexpr::node(head, [mm(point.x), mm(point.y)])
}

fn effects(hidden: bool) -> Sexpr {
    let size = Sexpr::node("size", [mm(TEXT_SIZE), mm(TEXT_SIZE)]);
    let mut items = vec![Sexpr::node("font", [size])];
    if hidden {
        items.push(Sexpr::symbol("hide"));
    }
    Sexpr::node("effects", items)
}

fn yes(head: &str) -> Sexpr {
    Sexpr::node(head, [Sexpr::symbol("yes")])
}

/// KiCad electrical type for a database pin type. Types outside the known
/// vocabulary fall back to `bidirectional`.
pub fn electrical_type(pin_type: &PinType) -> &'static str {
    match pin_type {
        PinType::Input | PinType::Boot | PinType::Reset => "input",
        PinType::Output => "output",
        PinType::Supply | PinType::Power => "power_in",
        PinType::NoConnect => "no_connect",
        PinType::Passive => "passive",
        PinType::Io
        | PinType::MonoIo
        | PinType::DualRole
        | PinType::Empty
        | PinType::Unrecognized(_) => "bidirectional",
    }
}

/// Report every pin of `banks` whose type falls back to `bidirectional`.
pub fn report_type_fallbacks(banks: &BankSet, sink: &mut dyn DiagnosticSink) {
    for pin in banks.all_pins() {
        match &pin.pin_type {
            PinType::Empty => sink.report(Diagnostic::EmptyPinType {
                pin: pin.name.clone(),
            }),
            PinType::Unrecognized(source) => sink.report(Diagnostic::UnrecognizedPinType {
                pin: pin.name.clone(),
                pin_type: source.clone(),
            }),
            _ => {}
        }
    }
}

fn property(id: u32, key: &str, value: &str, offset: i64, hidden: bool) -> Sexpr {
    Sexpr::node(
        "property",
        [
            Sexpr::string(key),
            Sexpr::string(value),
            Sexpr::node("id", [Sexpr::symbol(id.to_string())]),
            at(Point::new(0, offset), 0),
            effects(hidden),
        ],
    )
}

fn pin_sexpr(pin: &PinRecord, position: Point, angle: u32) -> Sexpr {
    let kind = electrical_type(&pin.pin_type);
    let mut items = vec![
        Sexpr::symbol(kind),
        Sexpr::symbol("line"),
        at(position, angle),
        Sexpr::node("length", [mm(PIN_LENGTH)]),
        Sexpr::node("name", [Sexpr::string(&pin.name), effects(false)]),
        Sexpr::node("number", [Sexpr::string(&pin.number), effects(false)]),
    ];
    items.extend(pin.alternates.iter().map(|alternate| {
        Sexpr::node(
            "alternate",
            [
                Sexpr::string(alternate),
                Sexpr::symbol(kind),
                Sexpr::symbol("line"),
            ],
        )
    }));
    Sexpr::node("pin", items)
}

fn body_sexpr(symbol_name: &str, body: &Body, banks: &BankSet) -> Sexpr {
    let stroke = Sexpr::node(
        "stroke",
        [
            Sexpr::node("width", [mm(FRAME_STROKE)]),
            Sexpr::node("type", [Sexpr::symbol("default")]),
            Sexpr::node("color", ["0", "0", "0", "0"].map(Sexpr::symbol)),
        ],
    );
    let mut items = vec![
        Sexpr::string(format!("{symbol_name}_{}_1", body.unit)),
        Sexpr::node(
            "rectangle",
            [
                xy("start", body.frame.start),
                xy("end", body.frame.end),
                stroke,
                Sexpr::node("fill", [Sexpr::node("type", [Sexpr::symbol("background")])]),
            ],
        ),
    ];

    if let Some(label) = &body.label {
        let above = Point::new(0, body.frame.start.y + PIN_SPACING);
        items.push(Sexpr::node(
            "text",
            [Sexpr::string(label), at(above, 0), effects(false)],
        ));
    }

    for placement in &body.placements {
        let angle = placement.orientation.angle();
        for (index, pin) in banks.pins(&placement.bank).iter().enumerate() {
            items.push(pin_sexpr(pin, placement.pin_position(index), angle));
        }
    }

    Sexpr::node("symbol", items)
}

/// Build the library entry for one chip.
///
/// `name` becomes the symbol name and value, `footprint` the (hidden)
/// footprint field. Each body of `geometry` is written as its own unit.
pub fn emit_symbol(
    name: &str,
    footprint: &str,
    banks: &BankSet,
    geometry: &SymbolGeometry,
) -> Sexpr {
    let mut items = vec![
        Sexpr::string(name),
        Sexpr::node("pin_names", [Sexpr::node("offset", [mm(PIN_NAME_OFFSET)])]),
        yes("in_bom"),
        yes("on_board"),
        property(0, "Reference", "U", PIN_SPACING, false),
        property(1, "Value", name, -PIN_SPACING, false),
        property(2, "Footprint", footprint, -2 * PIN_SPACING, true),
        property(3, "Datasheet", "", 0, true),
    ];
    items.extend(geometry.bodies.iter().map(|body| body_sexpr(name, body, banks)));
    Sexpr::node("symbol", items)
}
