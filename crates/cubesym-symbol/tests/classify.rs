mod common;

use std::collections::HashSet;

use common::{gpio, pin, small_qfn};
use cubesym_symbol::bank::{bank_for, pin_sort_key};
use cubesym_symbol::{
    build_banks, classify, merge_pins, BankName, Diagnostic, NullSink, Package, PinLabels,
    PinOrigin, PinType,
};

fn names(pins: &[cubesym_symbol::PinRecord]) -> Vec<&str> {
    pins.iter().map(|pin| pin.name.as_str()).collect()
}

#[test]
fn test_bank_for_names() {
    assert_eq!(bank_for("VSS"), BankName::Ground);
    assert_eq!(bank_for("VSSA"), BankName::Ground);
    assert_eq!(bank_for("VDD"), BankName::Power);
    assert_eq!(bank_for("VDDA"), BankName::Power);
    assert_eq!(bank_for("PA0"), BankName::Port('A'));
    assert_eq!(bank_for("PC14-OSC32_IN"), BankName::Port('C'));
    assert_eq!(bank_for("PH0-OSC_IN"), BankName::Port('H'));
    assert_eq!(bank_for("NRST"), BankName::Other);
    assert_eq!(bank_for("VBAT"), BankName::Other);
    assert_eq!(bank_for("PDR_ON"), BankName::Other);
    assert_eq!(bank_for("Pad"), BankName::Other);
}

#[test]
fn test_sort_key() {
    assert_eq!(pin_sort_key("PA9"), "PA009");
    assert_eq!(pin_sort_key("PA10"), "PA010");
    assert_eq!(pin_sort_key("NRST"), "NRST000");
    assert_eq!(pin_sort_key("PC14-OSC32_IN"), "PC014");
}

#[test]
fn test_pins_sort_numerically() {
    let pins = vec![
        gpio("1", "PA2", &[]),
        gpio("2", "PA10", &[]),
        gpio("3", "PA1", &[]),
    ];

    let banks = classify(pins, &Package::new("LQFP48", false), &mut NullSink);
    assert_eq!(names(banks.pins(&BankName::Port('A'))), ["PA1", "PA2", "PA10"]);
}

#[test]
fn test_equal_keys_keep_input_order() {
    let pins = vec![
        pin("1", "VDD", "Power"),
        pin("2", "VDDA", "Power"),
        pin("3", "VDD", "Power"),
    ];

    let banks = classify(pins, &Package::new("LQFP48", false), &mut NullSink);
    let numbers: Vec<_> = banks
        .pins(&BankName::Power)
        .iter()
        .map(|pin| pin.number.as_str())
        .collect();
    // "VDD" and "VDD" share a key and keep their order; "VDDA" sorts after.
    assert_eq!(numbers, ["1", "3", "2"]);
}

#[test]
fn test_reserved_banks_always_exist() {
    let banks = classify(Vec::new(), &Package::new("LQFP48", false), &mut NullSink);

    let bank_names: Vec<_> = banks.iter().map(|(name, _)| name.to_string()).collect();
    assert_eq!(bank_names, ["OTHER", "VDD", "VSS"]);
    assert_eq!(banks.pin_count(), 0);
}

#[test]
fn test_banks_iterate_by_name() {
    let pins = vec![
        gpio("1", "PP0", &[]),
        gpio("2", "PB0", &[]),
        gpio("3", "PA0", &[]),
        gpio("4", "PO0", &[]),
    ];

    let banks = classify(pins, &Package::new("LQFP48", false), &mut NullSink);
    let order: Vec<_> = banks.lateral().map(|(name, _)| name.to_string()).collect();
    assert_eq!(order, ["A", "B", "O", "OTHER", "P"]);
}

#[test]
fn test_every_pin_lands_in_one_bank() {
    let mcu = small_qfn();
    let merged = merge_pins(mcu.pins.clone(), &mut NullSink);
    let banks = classify(merged.clone(), &mcu.package, &mut NullSink);

    let classified: Vec<_> = banks
        .all_pins()
        .filter(|pin| !pin.is_synthetic())
        .map(|pin| pin.number.clone())
        .collect();
    let unique: HashSet<_> = classified.iter().cloned().collect();
    let input: HashSet<_> = merged.iter().map(|pin| pin.number.clone()).collect();

    assert_eq!(classified.len(), merged.len());
    assert_eq!(unique, input);
}

#[test]
fn test_qfn_pad_without_power_pad() {
    let mut diagnostics = Vec::new();
    let banks = classify(
        vec![pin("1", "VSS", "Power")],
        &Package::new("UFQFPN48", false),
        &mut diagnostics,
    );

    let pads: Vec<_> = banks.all_pins().filter(|pin| pin.is_synthetic()).collect();
    assert_eq!(pads.len(), 1);
    assert_eq!(pads[0].number, "49");
    assert_eq!(pads[0].name, "Pad");
    assert_eq!(pads[0].pin_type, PinType::Passive);
    assert_eq!(pads[0].origin, PinOrigin::ExposedPad);
    assert!(banks
        .pins(&BankName::Ground)
        .iter()
        .any(|pin| pin.is_synthetic()));
    assert!(matches!(
        diagnostics.as_slice(),
        [Diagnostic::PadSynthesized { number, .. }] if number == "49"
    ));
}

#[test]
fn test_qfn_pad_with_power_pad() {
    let banks = classify(Vec::new(), &Package::new("VFQFPN36", true), &mut NullSink);

    let ground = banks.pins(&BankName::Ground);
    assert_eq!(ground.len(), 1);
    assert_eq!(ground[0].number, "37");
    assert_eq!(ground[0].pin_type, PinType::Power);
}

#[test]
fn test_pad_sorts_before_vss() {
    let banks = build_banks(&small_qfn(), PinLabels::Full, &mut NullSink);
    assert_eq!(names(banks.pins(&BankName::Ground)), ["Pad", "VSS"]);
}

#[test]
fn test_no_pad_for_other_packages() {
    let banks = classify(Vec::new(), &Package::new("LQFP64", false), &mut NullSink);
    assert_eq!(banks.pin_count(), 0);
}

#[test]
fn test_qfn_without_count_is_reported() {
    let mut diagnostics = Vec::new();
    let banks = classify(Vec::new(), &Package::new("UFQFPN", false), &mut diagnostics);

    assert_eq!(banks.pin_count(), 0);
    assert_eq!(
        diagnostics,
        vec![Diagnostic::PadCountMissing {
            package: "UFQFPN".to_string()
        }]
    );
}

#[test]
fn test_pad_skipped_when_number_is_listed() {
    let mut diagnostics = Vec::new();
    let banks = classify(
        vec![gpio("1", "PA0", &[]), pin("49", "VSS", "Power")],
        &Package::new("UFQFPN48", true),
        &mut diagnostics,
    );

    let numbers: Vec<_> = banks.all_pins().map(|pin| pin.number.as_str()).collect();
    assert_eq!(numbers.len(), 2);
    assert!(banks.all_pins().all(|pin| !pin.is_synthetic()));
    assert_eq!(
        diagnostics,
        vec![Diagnostic::PadNumberTaken {
            package: "UFQFPN48".to_string(),
            number: "49".to_string(),
        }]
    );
}
