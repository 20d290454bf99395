//! S-expression model for KiCad symbol libraries.
//!
//! Generated libraries are built as a [`Sexpr`] tree and printed with
//! [`format_sexpr`], so every list that is opened is also closed. The parser
//! reads the same dialect back and is used to check generated output.

/// An S-expression value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sexpr {
    /// Unquoted token: keywords and numbers
    Symbol(String),
    /// Quoted text
    String(String),
    List(Vec<Sexpr>),
}

impl Sexpr {
    /// Create a symbol (unquoted atom)
    pub fn symbol(s: impl Into<String>) -> Self {
        Sexpr::Symbol(s.into())
    }

    /// Create a string (quoted atom)
    pub fn string(s: impl Into<String>) -> Self {
        Sexpr::String(s.into())
    }

    /// Create a list headed by the keyword `head`, e.g. `(length 7.62)`.
    pub fn node(head: &str, rest: impl IntoIterator<Item = Sexpr>) -> Self {
        let mut items = vec![Sexpr::symbol(head)];
        items.extend(rest);
        Sexpr::List(items)
    }

    pub fn is_atom(&self) -> bool {
        self.as_atom().is_some()
    }

    /// Get the atom value if this is a symbol or a string
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Sexpr::Symbol(s) | Sexpr::String(s) => Some(s),
            Sexpr::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sexpr]> {
        match self {
            Sexpr::List(items) => Some(items),
            _ => None,
        }
    }

    /// Keyword heading this list, if it is a list starting with a symbol
    pub fn head(&self) -> Option<&str> {
        match self.as_list()?.first()? {
            Sexpr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Atom at position `index` of this list (0 is the head).
    pub fn atom_at(&self, index: usize) -> Option<&str> {
        self.as_list()?.get(index)?.as_atom()
    }

    /// First direct child list headed by `head`
    pub fn child(&self, head: &str) -> Option<&Sexpr> {
        self.as_list()?
            .iter()
            .find(|item| item.head() == Some(head))
    }

    /// Direct child lists headed by `head`
    pub fn children<'a>(&'a self, head: &'a str) -> impl Iterator<Item = &'a Sexpr> + 'a {
        self.as_list()
            .unwrap_or_default()
            .iter()
            .filter(move |item| item.head() == Some(head))
    }

    /// Every list headed by `head` anywhere below (and including) this node,
    /// in document order.
    pub fn descendants(&self, head: &str) -> Vec<&Sexpr> {
        let mut found = Vec::new();
        collect_descendants(self, head, &mut found);
        found
    }
}

fn collect_descendants<'a>(node: &'a Sexpr, head: &str, found: &mut Vec<&'a Sexpr>) {
    if let Sexpr::List(items) = node {
        if node.head() == Some(head) {
            found.push(node);
        }
        for item in items {
            collect_descendants(item, head, found);
        }
    }
}

/// Errors that can occur during parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected ')' at line {line}, column {column}")]
    UnexpectedClose { line: usize, column: usize },
    #[error("list opened at line {line}, column {column} is never closed")]
    UnclosedList { line: usize, column: usize },
    #[error("string starting at line {line}, column {column} is never terminated")]
    UnterminatedString { line: usize, column: usize },
}

/// Parser for S-expressions
pub struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            chars: input.char_indices().peekable(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Parse a single expression
    pub fn parse(&mut self) -> Result<Sexpr, ParseError> {
        self.skip_trivia();
        match self.peek() {
            None => Err(ParseError::UnexpectedEof),
            Some('(') => self.parse_list(),
            Some(')') => Err(ParseError::UnexpectedClose {
                line: self.line,
                column: self.column,
            }),
            Some('"') => self.parse_string(),
            Some(_) => Ok(self.parse_symbol()),
        }
    }

    /// Parse expressions until the input is exhausted
    pub fn parse_all(&mut self) -> Result<Vec<Sexpr>, ParseError> {
        let mut exprs = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek().is_none() {
                return Ok(exprs);
            }
            exprs.push(self.parse()?);
        }
    }

    fn parse_list(&mut self) -> Result<Sexpr, ParseError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut items = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(ParseError::UnclosedList { line, column }),
                Some(')') => {
                    self.bump();
                    break;
                }
                Some(_) => items.push(self.parse()?),
            }
            if items.len() % 1000 == 0 {
                log::trace!("Parsed {} items of list at {line}:{column}", items.len());
            }
        }

        Ok(Sexpr::List(items))
    }

    fn parse_symbol(&mut self) -> Sexpr {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            self.bump();
        }
        Sexpr::Symbol(self.input[start..self.pos].to_string())
    }

    fn parse_string(&mut self) -> Result<Sexpr, ParseError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut text = String::new();

        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString { line, column }),
                Some('"') => return Ok(Sexpr::String(text)),
                Some('\\') => match self.bump() {
                    None => return Err(ParseError::UnterminatedString { line, column }),
                    Some('n') => text.push('\n'),
                    Some('r') => text.push('\r'),
                    Some('t') => text.push('\t'),
                    Some(other) => text.push(other),
                },
                Some(ch) => text.push(ch),
            }
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == ';' {
                while let Some(ch) = self.bump() {
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn bump(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.pos = pos + ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }
}

/// Parse a string into an S-expression
pub fn parse(input: &str) -> Result<Sexpr, ParseError> {
    log::trace!("Parsing S-expression from {} bytes of input", input.len());
    Parser::new(input).parse()
}

/// Parse a string into multiple S-expressions
pub fn parse_all(input: &str) -> Result<Vec<Sexpr>, ParseError> {
    log::trace!(
        "Parsing multiple S-expressions from {} bytes of input",
        input.len()
    );
    let result = Parser::new(input).parse_all();
    if let Ok(exprs) = &result {
        log::trace!("Parsed {} top-level S-expressions", exprs.len());
    }
    result
}

/// Forms printed on a single line even though they contain nested lists.
const INLINE_FORMS: &[&str] = &[
    "alternate",
    "effects",
    "fill",
    "font",
    "name",
    "number",
    "pin_names",
    "property",
    "rectangle",
    "stroke",
    "text",
];

/// Format an S-expression in the layout KiCad uses for symbol libraries.
///
/// Lists made only of atoms, and the forms in `INLINE_FORMS`, stay on one
/// line. Any other list keeps its leading atoms on the opening line and puts
/// each remaining item on its own line, one level deeper.
pub fn format_sexpr(sexpr: &Sexpr, indent_level: usize) -> String {
    let mut out = String::new();
    push_indent(&mut out, indent_level);
    write_node(&mut out, sexpr, indent_level);
    out
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_node(out: &mut String, sexpr: &Sexpr, level: usize) {
    match sexpr {
        Sexpr::Symbol(s) => out.push_str(s),
        Sexpr::String(s) => {
            out.push('"');
            out.push_str(&escape_string(s));
            out.push('"');
        }
        Sexpr::List(items) if is_inline(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_node(out, item, level);
            }
            out.push(')');
        }
        Sexpr::List(items) => {
            let leading = items.iter().take_while(|item| item.is_atom()).count();
            out.push('(');
            for (i, item) in items[..leading].iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_node(out, item, level);
            }
            for item in &items[leading..] {
                out.push('\n');
                push_indent(out, level + 1);
                write_node(out, item, level + 1);
            }
            out.push('\n');
            push_indent(out, level);
            out.push(')');
        }
    }
}

fn is_inline(items: &[Sexpr]) -> bool {
    let mut nested = items.iter().filter_map(Sexpr::as_list).peekable();
    if nested.peek().is_none() {
        return true;
    }
    matches!(items.first(), Some(Sexpr::Symbol(head)) if INLINE_FORMS.contains(&head.as_str()))
        && nested.all(is_inline)
}

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ => result.push(ch),
        }
    }
    result
}
