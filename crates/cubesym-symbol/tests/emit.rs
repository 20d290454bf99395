mod common;

use common::{gpio, init_logger, pin, small_qfn};
use cubesym_sexpr::{format_sexpr, parse, Sexpr};
use cubesym_symbol::emit::{electrical_type, format_mm};
use cubesym_symbol::{
    generate_symbols, Diagnostic, LayoutSelection, LibraryWriter, NullSink, PinLabels, PinType,
};

fn symbols(selection: LayoutSelection) -> Vec<Sexpr> {
    generate_symbols(&small_qfn(), selection, PinLabels::Full, &mut NullSink).unwrap()
}

fn library_text(symbols: &[Sexpr]) -> String {
    let mut writer = LibraryWriter::new(Vec::new()).unwrap();
    for symbol in symbols {
        writer.write_symbol(symbol).unwrap();
    }
    assert_eq!(writer.symbols_written(), symbols.len());
    String::from_utf8(writer.finish().unwrap()).unwrap()
}

#[test]
fn test_format_mm() {
    assert_eq!(format_mm(300), "7.62");
    assert_eq!(format_mm(100), "2.54");
    assert_eq!(format_mm(-200), "-5.08");
    assert_eq!(format_mm(0), "0");
    assert_eq!(format_mm(50), "1.27");
    assert_eq!(format_mm(10), "0.254");
    assert_eq!(format_mm(-1000), "-25.4");
}

#[test]
fn test_library_round_trips_through_parser() {
    init_logger();
    let text = library_text(&symbols(LayoutSelection::Both));
    let library = parse(&text).unwrap();

    assert_eq!(library.head(), Some("kicad_symbol_lib"));
    assert_eq!(
        library.child("version").and_then(|v| v.atom_at(1)),
        Some("20211014")
    );
    assert_eq!(
        library.child("generator").and_then(|v| v.atom_at(1)),
        Some("cubesym")
    );

    let names: Vec<_> = library
        .children("symbol")
        .filter_map(|symbol| symbol.atom_at(1))
        .collect();
    assert_eq!(names, ["STM32T001U8", "STM32T001U8_u"]);
}

#[test]
fn test_every_pin_is_emitted_once() {
    // Eight package pins plus the exposed pad.
    for symbol in symbols(LayoutSelection::Both) {
        let mut numbers: Vec<_> = symbol
            .descendants("pin")
            .into_iter()
            .filter_map(|pin| pin.child("number").and_then(|n| n.atom_at(1)))
            .collect();
        assert_eq!(numbers.len(), 9);
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), 9);
    }
}

#[test]
fn test_symbol_header() {
    let symbol = &symbols(LayoutSelection::Single)[0];

    assert_eq!(symbol.atom_at(1), Some("STM32T001U8"));
    assert!(symbol.child("in_bom").is_some());
    assert!(symbol.child("on_board").is_some());

    let properties: Vec<_> = symbol
        .children("property")
        .map(|p| (p.atom_at(1).unwrap(), p.atom_at(2).unwrap()))
        .collect();
    assert_eq!(
        properties,
        [
            ("Reference", "U"),
            ("Value", "STM32T001U8"),
            ("Footprint", "UFQFPN8"),
            ("Datasheet", ""),
        ]
    );
}

#[test]
fn test_consolidated_pin_position() {
    let symbol = &symbols(LayoutSelection::Single)[0];
    let pins = symbol.descendants("pin");

    let first = pins[0];
    assert_eq!(first.child("name").and_then(|n| n.atom_at(1)), Some("PA0"));
    let at = first.child("at").unwrap();
    assert_eq!(
        (at.atom_at(1), at.atom_at(2), at.atom_at(3)),
        (Some("-25.4"), Some("27.94"), Some("0"))
    );

    insta::assert_snapshot!(format_sexpr(pins[1], 0), @r#"
    (pin bidirectional line
      (at -25.4 25.4 0)
      (length 7.62)
      (name "PA1" (effects (font (size 1.27 1.27))))
      (number "3" (effects (font (size 1.27 1.27))))
    )
    "#);
}

#[test]
fn test_alternates_only_when_present() {
    let symbol = &symbols(LayoutSelection::Single)[0];

    for pin in symbol.descendants("pin") {
        let name = pin.child("name").and_then(|n| n.atom_at(1)).unwrap();
        let alternates: Vec<_> = pin
            .children("alternate")
            .filter_map(|alt| alt.atom_at(1))
            .collect();
        if name == "PA0" {
            assert_eq!(alternates, ["ADC_IN0"]);
        } else {
            assert!(alternates.is_empty(), "{name} has alternates {alternates:?}");
        }
    }
}

#[test]
fn test_units_and_labels() {
    let multi = &symbols(LayoutSelection::Multi)[0];
    assert_eq!(multi.atom_at(1), Some("STM32T001U8_u"));

    let units: Vec<_> = multi
        .children("symbol")
        .filter_map(|unit| unit.atom_at(1))
        .collect();
    assert_eq!(
        units,
        [
            "STM32T001U8_u_1_1",
            "STM32T001U8_u_2_1",
            "STM32T001U8_u_3_1",
            "STM32T001U8_u_4_1",
            "STM32T001U8_u_5_1",
        ]
    );

    let first = multi.children("symbol").next().unwrap();
    let label = first.child("text").unwrap();
    assert_eq!(label.atom_at(1), Some("PORT A"));
    let at = label.child("at").unwrap();
    assert_eq!((at.atom_at(1), at.atom_at(2)), (Some("0"), Some("7.62")));

    let consolidated = &symbols(LayoutSelection::Single)[0];
    assert!(consolidated.descendants("text").is_empty());
}

#[test]
fn test_electrical_types() {
    let kinds: Vec<_> = ["I/O", "Reset", "Power", "NC", "Passive", "Mystery", ""]
        .into_iter()
        .map(|source| electrical_type(&PinType::parse(source)))
        .collect();
    assert_eq!(
        kinds,
        [
            "bidirectional",
            "input",
            "power_in",
            "no_connect",
            "passive",
            "bidirectional",
            "bidirectional"
        ]
    );
    assert_eq!(electrical_type(&PinType::DualRole), "bidirectional");
}

#[test]
fn test_type_fallbacks_reported_once_per_chip() {
    let mut mcu = small_qfn();
    mcu.pins.push(pin("20", "VCAP", "Analog"));
    mcu.pins.push(pin("21", "NC1", ""));

    let mut diagnostics = Vec::new();
    let symbols =
        generate_symbols(&mcu, LayoutSelection::Both, PinLabels::Full, &mut diagnostics).unwrap();
    assert_eq!(symbols.len(), 2);

    let fallbacks: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| {
            matches!(
                d,
                Diagnostic::UnrecognizedPinType { .. } | Diagnostic::EmptyPinType { .. }
            )
        })
        .collect();
    assert_eq!(
        fallbacks,
        vec![
            Diagnostic::EmptyPinType {
                pin: "NC1".to_string(),
            },
            Diagnostic::UnrecognizedPinType {
                pin: "VCAP".to_string(),
                pin_type: "Analog".to_string(),
            },
        ]
    );
}

#[test]
fn test_short_labels_drop_merged_names() {
    let mut mcu = small_qfn();
    mcu.pins.push(gpio("6", "PB8", &["I2C1_SCL"]));

    let symbols =
        generate_symbols(&mcu, LayoutSelection::Both, PinLabels::Short, &mut NullSink).unwrap();
    for symbol in &symbols {
        assert!(symbol.descendants("alternate").is_empty());
        assert_eq!(symbol.descendants("pin").len(), 9);
    }

    let full =
        generate_symbols(&mcu, LayoutSelection::Single, PinLabels::Full, &mut NullSink).unwrap();
    let alternates: Vec<_> = full[0]
        .descendants("alternate")
        .into_iter()
        .filter_map(|alt| alt.atom_at(1))
        .collect();
    assert_eq!(alternates, ["ADC_IN0", "PB8", "I2C1_SCL"]);
}

#[test]
fn test_unrecognized_type_still_emits_pin() {
    let mut mcu = small_qfn();
    mcu.pins.push(pin("20", "VCAP", "Analog"));
    assert!(matches!(mcu.pins[8].pin_type, PinType::Unrecognized(_)));

    let mut diagnostics = Vec::new();
    let symbols =
        generate_symbols(&mcu, LayoutSelection::Single, PinLabels::Full, &mut diagnostics)
            .unwrap();

    assert_eq!(symbols[0].descendants("pin").len(), 10);
    assert!(diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::UnrecognizedPinType { pin, .. } if pin == "VCAP")));
}

#[test]
fn test_empty_library_is_balanced() {
    let text = library_text(&[]);
    let library = parse(&text).unwrap();
    assert_eq!(library.children("symbol").count(), 0);
}
