/// Template parsing: splits a raw rule into literal text and `#symbol#` placeholders.

use serde::{Deserialize, Serialize};

use crate::core::grammar::GrammarError;

/// Character opening and closing a placeholder.
pub const DELIMITER: char = '#';

/// Post-expansion text transforms that may trail a placeholder name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// `.capitalize`: uppercase the first character of the expansion.
    Capitalize,
}

impl Modifier {
    pub const ALL: [Modifier; 1] = [Modifier::Capitalize];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Capitalize => "capitalize",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Capitalize => {
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// A `#name.modifier#` reference to another group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Group name with recognized modifiers stripped.
    pub symbol: String,
    /// Modifiers in the order they are written.
    pub modifiers: Vec<Modifier>,
    /// Text found between the delimiters.
    pub raw: String,
}

impl Placeholder {
    /// Split trailing `.modifier` suffixes off a placeholder body.
    ///
    /// Unrecognized suffixes stay part of the symbol name.
    pub fn parse(raw: &str) -> Placeholder {
        let mut symbol = raw;
        let mut modifiers = Vec::new();

        'strip: loop {
            for modifier in Modifier::ALL {
                let stripped = symbol
                    .strip_suffix(modifier.name())
                    .and_then(|rest| rest.strip_suffix('.'));
                if let Some(rest) = stripped {
                    modifiers.push(modifier);
                    symbol = rest;
                    continue 'strip;
                }
            }
            break;
        }
        modifiers.reverse();

        Placeholder {
            symbol: symbol.to_string(),
            modifiers,
            raw: raw.to_string(),
        }
    }

    /// Apply this placeholder's modifiers to an expansion of its symbol.
    pub fn apply_modifiers(&self, text: String) -> String {
        self.modifiers
            .iter()
            .fold(text, |acc, modifier| modifier.apply(&acc))
    }
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Reference to another group: `#name#`.
    Placeholder(Placeholder),
}

/// A parsed rule: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub source: String,
    pub segments: Vec<Segment>,
}

impl Template {
    /// Parse a rule string into literal and placeholder segments.
    ///
    /// Delimiters pair up in order of appearance (1st with 2nd, 3rd with 4th,
    /// and so on). An odd number of delimiters is an error.
    pub fn parse(input: &str) -> Result<Template, GrammarError> {
        let delimiters: Vec<usize> = input.match_indices(DELIMITER).map(|(i, _)| i).collect();
        if delimiters.len() % 2 != 0 {
            return Err(GrammarError::UnbalancedDelimiters {
                template: input.to_string(),
            });
        }

        let mut segments = Vec::new();
        let mut cursor = 0;
        for pair in delimiters.chunks_exact(2) {
            let (open, close) = (pair[0], pair[1]);
            if open > cursor {
                segments.push(Segment::Literal(input[cursor..open].to_string()));
            }
            segments.push(Segment::Placeholder(Placeholder::parse(
                &input[open + 1..close],
            )));
            cursor = close + 1;
        }
        if cursor < input.len() {
            segments.push(Segment::Literal(input[cursor..].to_string()));
        }

        Ok(Template {
            source: input.to_string(),
            segments,
        })
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(placeholder) => Some(placeholder),
            Segment::Literal(_) => None,
        })
    }

    /// Render the segments back into rule syntax.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(placeholder) => {
                    out.push(DELIMITER);
                    out.push_str(&placeholder.raw);
                    out.push(DELIMITER);
                }
            }
        }
        out
    }
}
