//! Reader for the per-chip XML files of the STM32Cube MCU database.
//!
//! Each file has an `Mcu` root naming the chip and its package and one `Pin`
//! element per package pin, with the pin's alternate functions as nested
//! `Signal` elements:
//!
//! ```xml
//! <Mcu RefName="STM32F103C(8-B)Tx" Package="LQFP48" HasPowerPad="false">
//!   <Pin Name="PA0-WKUP" Position="10" Type="I/O">
//!     <Signal Name="ADC1_IN0"/>
//!     <Signal Name="GPIO"/>
//!   </Pin>
//! </Mcu>
//! ```

use std::path::Path;

use cubesym_symbol::{McuDefinition, Package, PinRecord, PinType};
use roxmltree::{Document, Node};

/// Signal present on every GPIO pin; not an alternate function.
const GPIO_SIGNAL: &str = "GPIO";

#[derive(Debug, thiserror::Error)]
pub enum McuDbError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("element <{element}> has no '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    #[error("expected an <Mcu> root element, found <{0}>")]
    UnexpectedRoot(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Collect `Signal` names as alternate functions. When off, pins carry
    /// their names only.
    pub collect_signals: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            collect_signals: true,
        }
    }
}

fn required<'a>(node: &Node<'a, '_>, attribute: &str) -> Result<&'a str, McuDbError> {
    node.attribute(attribute)
        .ok_or_else(|| McuDbError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

fn elements<'a, 'input>(
    node: &Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

fn parse_pin(node: &Node, options: &ReadOptions) -> Result<PinRecord, McuDbError> {
    let number = required(node, "Position")?;
    let name = required(node, "Name")?;
    let pin_type = PinType::parse(node.attribute("Type").unwrap_or_default());

    let mut pin = PinRecord::new(number, name, pin_type);
    if options.collect_signals {
        let signals = elements(node, "Signal")
            .map(|signal| required(&signal, "Name"))
            .collect::<Result<Vec<_>, _>>()?;
        pin = pin.with_alternates(signals.into_iter().filter(|&s| s != GPIO_SIGNAL));
    }
    Ok(pin)
}

/// Parse one MCU definition document.
///
/// The default namespace of the database files is ignored; elements are
/// matched on their local names.
pub fn parse_mcu(xml: &str, options: &ReadOptions) -> Result<McuDefinition, McuDbError> {
    let document = Document::parse(xml)?;
    let root = document.root_element();
    if root.tag_name().name() != "Mcu" {
        return Err(McuDbError::UnexpectedRoot(
            root.tag_name().name().to_string(),
        ));
    }

    let ref_name = required(&root, "RefName")?;
    let package = Package::new(
        required(&root, "Package")?,
        root.attribute("HasPowerPad") == Some("true"),
    );

    let pins = elements(&root, "Pin")
        .map(|pin| parse_pin(&pin, options))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "{ref_name}: {} pin records, package {}",
        pins.len(),
        package.name
    );

    Ok(McuDefinition {
        ref_name: ref_name.to_string(),
        package,
        pins,
    })
}

pub fn read_mcu_file(path: &Path, options: &ReadOptions) -> Result<McuDefinition, McuDbError> {
    let xml = std::fs::read_to_string(path).map_err(|source| McuDbError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_mcu(&xml, options)
}

/// Library group of a database file: the first `prefix_len` characters of
/// its file stem (`STM32F103C8Tx.xml` → `STM32F1` for 7).
pub fn group_key(path: &Path, prefix_len: usize) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(stem.chars().take(prefix_len).collect())
}
