use std::io::{self, Write};

use cubesym_sexpr::{format_sexpr, Sexpr};

/// File format version written into generated libraries (KiCad 6).
pub const LIBRARY_VERSION: &str = "20211014";
pub const GENERATOR: &str = "cubesym";

/// Streams symbols into a `.kicad_sym` library.
///
/// The header is written on creation and the closing parenthesis by
/// [`LibraryWriter::finish`]; symbols are appended one at a time so a
/// whole database never has to be held in memory.
pub struct LibraryWriter<W: Write> {
    out: W,
    symbols: usize,
}

impl<W: Write> LibraryWriter<W> {
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "(kicad_symbol_lib")?;
        writeln!(out, "  (version {LIBRARY_VERSION})")?;
        writeln!(out, "  (generator {GENERATOR})")?;
        Ok(Self { out, symbols: 0 })
    }

    pub fn write_symbol(&mut self, symbol: &Sexpr) -> io::Result<()> {
        writeln!(self.out, "{}", format_sexpr(symbol, 1))?;
        self.symbols += 1;
        Ok(())
    }

    pub fn symbols_written(&self) -> usize {
        self.symbols
    }

    pub fn finish(mut self) -> io::Result<W> {
        writeln!(self.out, ")")?;
        self.out.flush()?;
        Ok(self.out)
    }
}
