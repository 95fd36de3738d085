//! Pipe-delimited HL7v2 message model.
//!
//! Field numbering follows HL7: `segment.field(3)` is `PID-3`. In the `MSH` segment the
//! field separator itself is `MSH-1` and the encoding characters are `MSH-2`, so
//! `MSH-9` is the message type exactly as HL7 documentation numbers it.

use crate::{Hl7Error, Hl7Result, SEGMENT_SEPARATOR};
use std::fmt;

/// Name of the message header segment.
pub const HEADER_SEGMENT: &str = "MSH";

/// The delimiter set declared by a message's `MSH-1`/`MSH-2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub subcomponent: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

impl Delimiters {
    /// The `MSH-2` value, e.g. `^~\&`.
    pub fn encoding_characters(&self) -> String {
        [self.component, self.repetition, self.escape, self.subcomponent]
            .iter()
            .collect()
    }

    /// Reads the delimiters declared at the start of an `MSH` segment.
    ///
    /// `MSH-1` is always honoured. When `MSH-2` is not four distinct characters the
    /// standard `^~\&` set is used instead.
    fn from_header(segment: &str) -> Self {
        let defaults = Self::default();
        let mut chars = segment.chars().skip(HEADER_SEGMENT.len());
        let Some(field) = chars.next() else {
            return defaults;
        };

        let encoding: Vec<char> = chars.take_while(|c| *c != field).collect();
        let declared = match encoding[..] {
            [component, repetition, escape, subcomponent] => Some(Self {
                field,
                component,
                repetition,
                escape,
                subcomponent,
            }),
            _ => None,
        };

        if let Some(declared) = declared.filter(Self::is_distinct) {
            return declared;
        }

        tracing::debug!(
            msh_2 = %encoding.iter().collect::<String>(),
            "MSH-2 is not a usable encoding set, using default delimiters"
        );
        let fallback = Self { field, ..defaults };
        if fallback.is_distinct() {
            fallback
        } else {
            defaults
        }
    }

    fn is_distinct(&self) -> bool {
        let all = [
            self.field,
            self.component,
            self.repetition,
            self.escape,
            self.subcomponent,
        ];
        all.iter()
            .enumerate()
            .all(|(i, c)| !all[i + 1..].contains(c))
    }

    /// Escapes delimiter characters (and line breaks) inside a field value.
    pub fn escape(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            let sequence = match c {
                c if c == self.field => "F",
                c if c == self.component => "S",
                c if c == self.repetition => "R",
                c if c == self.escape => "E",
                c if c == self.subcomponent => "T",
                '\r' => "X0D",
                '\n' => "X0A",
                other => {
                    out.push(other);
                    continue;
                }
            };
            out.push(self.escape);
            out.push_str(sequence);
            out.push(self.escape);
        }
        out
    }

    /// Reverses [`Delimiters::escape`]. Unknown or unterminated sequences are kept verbatim.
    pub fn unescape(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(start) = rest.find(self.escape) {
            out.push_str(&rest[..start]);
            let after = &rest[start + self.escape.len_utf8()..];

            let Some(end) = after.find(self.escape) else {
                out.push_str(&rest[start..]);
                return out;
            };

            let sequence = &after[..end];
            match self.decode_sequence(sequence) {
                Some(decoded) => out.push_str(&decoded),
                None => {
                    out.push(self.escape);
                    out.push_str(sequence);
                    out.push(self.escape);
                }
            }
            rest = &after[end + self.escape.len_utf8()..];
        }

        out.push_str(rest);
        out
    }

    fn decode_sequence(&self, sequence: &str) -> Option<String> {
        match sequence {
            "F" => Some(self.field.to_string()),
            "S" => Some(self.component.to_string()),
            "R" => Some(self.repetition.to_string()),
            "E" => Some(self.escape.to_string()),
            "T" => Some(self.subcomponent.to_string()),
            hex if hex.starts_with('X') => {
                let digits = &hex.as_bytes()[1..];
                if digits.is_empty()
                    || digits.len() % 2 != 0
                    || !digits.iter().all(u8::is_ascii_hexdigit)
                {
                    return None;
                }
                // All ASCII from here, so byte offsets are char boundaries.
                let bytes = (1..hex.len())
                    .step_by(2)
                    .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
                    .collect::<Option<Vec<u8>>>()?;
                String::from_utf8(bytes).ok()
            }
            _ => None,
        }
    }
}

/// One segment: a three-character name followed by its fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    name: String,
    delimiters: Delimiters,
    /// `fields[0]` is field 1. For `MSH` it holds the field separator.
    fields: Vec<String>,
}

impl Segment {
    /// Creates an empty segment.
    pub fn new(name: impl Into<String>, delimiters: Delimiters) -> Self {
        Self {
            name: name.into(),
            delimiters,
            fields: Vec::new(),
        }
    }

    /// Creates an `MSH` segment with `MSH-1` and `MSH-2` filled from `delimiters`.
    pub fn header(delimiters: Delimiters) -> Self {
        Self {
            name: HEADER_SEGMENT.to_owned(),
            delimiters,
            fields: vec![
                delimiters.field.to_string(),
                delimiters.encoding_characters(),
            ],
        }
    }

    fn parse(text: &str, delimiters: Delimiters) -> Hl7Result<Self> {
        let mut parts = text.split(delimiters.field);
        let name = parts.next().unwrap_or_default();

        if name.len() != 3
            || !name
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(Hl7Error::Malformed(format!("invalid segment name: '{name}'")));
        }

        let mut fields = Vec::new();
        if name == HEADER_SEGMENT {
            fields.push(delimiters.field.to_string());
        }
        fields.extend(parts.map(str::to_owned));

        Ok(Self {
            name: name.to_owned(),
            delimiters,
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw (still escaped) text of field `number`, or `None` if the segment is shorter.
    pub fn field(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.fields.get(i))
            .map(String::as_str)
    }

    /// Unescaped value of the first repetition of field `number`.
    pub fn value(&self, number: usize) -> Option<String> {
        let field = self.field(number)?;
        let first = field
            .split(self.delimiters.repetition)
            .next()
            .unwrap_or_default();
        Some(self.delimiters.unescape(first))
    }

    /// Unescaped component `index` (1-based) of the first repetition of field `number`.
    pub fn component(&self, number: usize, index: usize) -> Option<String> {
        let field = self.field(number)?;
        let first = field
            .split(self.delimiters.repetition)
            .next()
            .unwrap_or_default();
        let component = first
            .split(self.delimiters.component)
            .nth(index.checked_sub(1)?)?;
        Some(self.delimiters.unescape(component))
    }

    /// Sets field `number` to `value`, escaping delimiters and padding skipped fields.
    pub fn set_value(&mut self, number: usize, value: &str) -> &mut Self {
        let escaped = self.delimiters.escape(value);
        self.set_raw(number, escaped)
    }

    /// Sets field `number` to component-separated `components`, each escaped.
    pub fn set_components(&mut self, number: usize, components: &[&str]) -> &mut Self {
        let separator = self.delimiters.component.to_string();
        let joined = components
            .iter()
            .map(|c| self.delimiters.escape(c))
            .collect::<Vec<_>>()
            .join(&separator);
        self.set_raw(number, joined)
    }

    fn set_raw(&mut self, number: usize, raw: String) -> &mut Self {
        let Some(index) = number.checked_sub(1) else {
            return self;
        };
        if self.fields.len() <= index {
            self.fields.resize(index + 1, String::new());
        }
        self.fields[index] = raw;
        self
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        // MSH-1 is the separator written between the name and MSH-2.
        let skip = usize::from(self.name == HEADER_SEGMENT);
        for field in self.fields.iter().skip(skip) {
            write!(f, "{}{}", self.delimiters.field, field)?;
        }
        Ok(())
    }
}

/// A parsed HL7v2 message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hl7Message {
    delimiters: Delimiters,
    segments: Vec<Segment>,
}

impl Hl7Message {
    /// Builds a message from already constructed segments.
    pub fn from_segments(delimiters: Delimiters, segments: Vec<Segment>) -> Self {
        Self {
            delimiters,
            segments,
        }
    }

    /// Parses message text.
    ///
    /// Segments are separated by `\r`; `\n` and `\r\n` are tolerated since messages
    /// often pass through tools that rewrite line endings. Delimiters are taken from
    /// `MSH` when the message starts with one.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::Malformed`] if the text has no segments or a segment name is
    /// not three upper-case alphanumerics.
    pub fn parse(text: &str) -> Hl7Result<Self> {
        let mut lines = text
            .split([SEGMENT_SEPARATOR, '\n'])
            .filter(|line| !line.trim().is_empty())
            .peekable();

        let delimiters = match lines.peek() {
            None => return Err(Hl7Error::Malformed("message contains no segments".into())),
            Some(first) if first.starts_with(HEADER_SEGMENT) => Delimiters::from_header(first),
            Some(_) => Delimiters::default(),
        };

        let segments = lines
            .map(|line| Segment::parse(line, delimiters))
            .collect::<Hl7Result<Vec<_>>>()?;

        Ok(Self {
            delimiters,
            segments,
        })
    }

    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// First segment named `name`.
    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name == name)
    }

    /// The `MSH` segment, if present.
    pub fn header(&self) -> Option<&Segment> {
        self.segment(HEADER_SEGMENT)
    }
}

impl fmt::Display for Hl7Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEGMENT_SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "MSH|^~\\&|INFOCTOR|HOSPITAL|HL7RECV|ANYWHERE|20230101000000||ADT^A01|MSG00001|P|2.3\rPID|||87654321-8765-4321-8765-432187654321||Doe^John||1990-01-01|male";

    #[test]
    fn numbers_header_fields_like_hl7() {
        let message = Hl7Message::parse(SAMPLE).expect("parse");
        let msh = message.header().expect("MSH present");

        assert_eq!(msh.field(1), Some("|"));
        assert_eq!(msh.field(2), Some("^~\\&"));
        assert_eq!(msh.field(3), Some("INFOCTOR"));
        assert_eq!(msh.field(9), Some("ADT^A01"));
        assert_eq!(msh.component(9, 2).as_deref(), Some("A01"));
        assert_eq!(msh.field(10), Some("MSG00001"));
        assert_eq!(msh.field(12), Some("2.3"));
        assert_eq!(msh.field(13), None);
    }

    #[test]
    fn reads_pid_components() {
        let message = Hl7Message::parse(SAMPLE).expect("parse");
        let pid = message.segment("PID").expect("PID present");

        assert_eq!(pid.field(1), Some(""));
        assert_eq!(pid.component(5, 1).as_deref(), Some("Doe"));
        assert_eq!(pid.component(5, 2).as_deref(), Some("John"));
        assert_eq!(pid.component(5, 3), None);
        assert_eq!(pid.value(8).as_deref(), Some("male"));
        assert_eq!(pid.value(9), None);
    }

    #[test]
    fn display_reproduces_parsed_text() {
        let message = Hl7Message::parse(SAMPLE).expect("parse");
        assert_eq!(message.to_string(), SAMPLE);
    }

    #[test]
    fn tolerates_newline_separated_segments() {
        let text = SAMPLE.replace('\r', "\r\n");
        let message = Hl7Message::parse(&text).expect("parse");
        assert_eq!(message.segments().len(), 2);
    }

    #[test]
    fn honours_declared_delimiters() {
        let message = Hl7Message::parse("MSH#*~\\&#APP\rPID###ID##Doe*John").expect("parse");
        let pid = message.segment("PID").expect("PID present");

        assert_eq!(message.delimiters().field, '#');
        assert_eq!(pid.component(5, 2).as_deref(), Some("John"));
    }

    #[test]
    fn rejects_empty_and_badly_named_segments() {
        assert!(matches!(Hl7Message::parse(""), Err(Hl7Error::Malformed(_))));
        assert!(matches!(
            Hl7Message::parse("\r\n\r"),
            Err(Hl7Error::Malformed(_))
        ));
        assert!(matches!(
            Hl7Message::parse("MSH|^~\\&|APP\rpatient|x"),
            Err(Hl7Error::Malformed(_))
        ));
    }

    #[test]
    fn falls_back_to_default_encoding_characters() {
        for text in ["MSH|^~|APP\rPID|||ID||Doe^John", "MSH|...\rPID|||ID||Doe^John", "MSH"] {
            let message = Hl7Message::parse(text).expect(text);
            assert_eq!(message.delimiters(), Delimiters::default(), "{text}");
        }

        let message = Hl7Message::parse("MSH|^^^^|APP\rPID|||ID||Doe^John").expect("parse");
        let pid = message.segment("PID").expect("PID present");
        assert_eq!(message.delimiters(), Delimiters::default());
        assert_eq!(pid.component(5, 2).as_deref(), Some("John"));
    }

    #[test]
    fn escapes_delimiters_in_values() {
        let mut pid = Segment::new("PID", Delimiters::default());
        pid.set_components(5, &["O|Brien^", "Mary&Jo"]);

        assert_eq!(pid.to_string(), "PID|||||O\\F\\Brien\\S\\^Mary\\T\\Jo");
        assert_eq!(pid.component(5, 1).as_deref(), Some("O|Brien^"));
        assert_eq!(pid.component(5, 2).as_deref(), Some("Mary&Jo"));
    }

    #[test]
    fn unescape_decodes_hex_and_keeps_unknown_sequences() {
        let delimiters = Delimiters::default();

        assert_eq!(delimiters.unescape("a\\X0D\\b"), "a\rb");
        assert_eq!(delimiters.unescape("a\\H\\b"), "a\\H\\b");
        assert_eq!(delimiters.unescape("trailing\\E"), "trailing\\E");
        assert_eq!(delimiters.escape("line\nbreak"), "line\\X0A\\break");
    }

    #[test]
    fn unescape_keeps_hex_sequences_with_non_hex_digits() {
        let delimiters = Delimiters::default();

        assert_eq!(delimiters.unescape("\\XA\u{e9}B\\"), "\\XA\u{e9}B\\");
        assert_eq!(delimiters.unescape("\\X\u{e9}\\"), "\\X\u{e9}\\");
        assert_eq!(delimiters.unescape("\\XZZ\\"), "\\XZZ\\");
        assert_eq!(delimiters.unescape("\\X0\\"), "\\X0\\");
        assert_eq!(delimiters.unescape("\\X\\"), "\\X\\");
        assert_eq!(delimiters.unescape("\\Xc3a9\\"), "\u{e9}");
    }

    #[test]
    fn header_builder_writes_encoding_characters() {
        let mut msh = Segment::header(Delimiters::default());
        msh.set_value(3, "INFOCTOR");

        assert_eq!(msh.to_string(), "MSH|^~\\&|INFOCTOR");
    }
}
