//! `PRINT`/`PRINT USING` output formatting (spec.md §4.4.6).
//!
//! Plain `PRINT` pads to the next multiple of 14 columns on a `,`
//! separator and emits nothing between items on a `;`. `PRINT USING`
//! instead walks a format-string mini-language, consuming one value per
//! numeric/string field it finds.

/// Tracks the output column so `,` zone-padding can compute how many
/// spaces to insert — `sbasic-eval`'s statement executor owns one of
/// these per PRINT destination (screen or a file).
#[derive(Default)]
pub struct Cursor {
    column: usize,
}

const ZONE_WIDTH: usize = 14;

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, out: &mut String, text: &str) {
        out.push_str(text);
        match text.rfind('\n') {
            Some(idx) => self.column = text[idx + 1..].chars().count(),
            None => self.column += text.chars().count(),
        }
    }

    pub fn newline(&mut self, out: &mut String) {
        out.push('\n');
        self.column = 0;
    }

    /// Pads with spaces up to the next 14-column zone boundary.
    pub fn zone_pad(&mut self, out: &mut String) {
        let next = ((self.column / ZONE_WIDTH) + 1) * ZONE_WIDTH;
        let pad = next - self.column;
        for _ in 0..pad {
            out.push(' ');
        }
        self.column = next;
    }

    /// `TAB(n)`: pads with spaces up to an absolute 0-based column, doing
    /// nothing if the cursor is already past it.
    pub fn pad_to(&mut self, out: &mut String, col: usize) {
        if self.column < col {
            for _ in 0..(col - self.column) {
                out.push(' ');
            }
            self.column = col;
        }
    }
}

/// One parsed field from a `PRINT USING` format string.
#[derive(Debug, PartialEq)]
pub enum FormatField {
    /// Literal text to copy through unchanged.
    Literal(String),
    /// `#`/`.`/`+`/trailing `-`/`$$`/`**` numeric field.
    Numeric {
        digits_before: usize,
        digits_after: usize,
        has_point: bool,
        leading_sign: bool,
        trailing_sign: bool,
        currency: bool,
        asterisk_fill: bool,
    },
    /// `^^^^` exponential numeric field.
    Exponential { mantissa_digits: usize },
    /// `\   \` fixed-width string field (width = 2 + spaces between the
    /// backslashes).
    StringField { width: usize },
    /// `!` single-character field.
    FirstChar,
    /// `&` whole-string field.
    WholeString,
}

pub fn parse_format(fmt: &str) -> Vec<FormatField> {
    let chars: Vec<char> = fmt.chars().collect();
    let mut fields = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '#' | '.' | '+' if is_numeric_start(&chars, i) => {
                let (field, next) = parse_numeric_field(&chars, i);
                fields.push(field);
                i = next;
            }
            '^' => {
                let start = i;
                while i < chars.len() && chars[i] == '^' {
                    i += 1;
                }
                fields.push(FormatField::Exponential {
                    mantissa_digits: i - start - 4,
                });
            }
            '$' if chars.get(i + 1) == Some(&'$') => {
                let (field, next) = parse_numeric_field(&chars, i);
                fields.push(field);
                i = next;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                let (field, next) = parse_numeric_field(&chars, i);
                fields.push(field);
                i = next;
            }
            '\\' => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i] != '\\' {
                    i += 1;
                }
                if i < chars.len() {
                    i += 1;
                }
                fields.push(FormatField::StringField { width: i - start });
            }
            '!' => {
                fields.push(FormatField::FirstChar);
                i += 1;
            }
            '&' => {
                fields.push(FormatField::WholeString);
                i += 1;
            }
            c => {
                let start = i;
                while i < chars.len() && !matches!(chars[i], '#' | '.' | '^' | '\\' | '!' | '&') {
                    i += 1;
                }
                let _ = c;
                fields.push(FormatField::Literal(chars[start..i].iter().collect()));
            }
        }
    }
    fields
}

fn is_numeric_start(chars: &[char], i: usize) -> bool {
    matches!(chars[i], '#' | '.')
        || (chars[i] == '+' && chars.get(i + 1).map(|c| matches!(c, '#' | '.')).unwrap_or(false))
}

fn parse_numeric_field(chars: &[char], mut i: usize) -> (FormatField, usize) {
    let start = i;
    let leading_sign = chars[i] == '+';
    if leading_sign {
        i += 1;
    }
    let currency = chars.get(i) == Some(&'$') && chars.get(i + 1) == Some(&'$');
    let asterisk_fill = chars.get(i) == Some(&'*') && chars.get(i + 1) == Some(&'*');
    if currency || asterisk_fill {
        i += 2;
    }
    let mut digits_before = 0;
    while chars.get(i) == Some(&'#') {
        digits_before += 1;
        i += 1;
    }
    let mut has_point = false;
    let mut digits_after = 0;
    if chars.get(i) == Some(&'.') {
        has_point = true;
        i += 1;
        while chars.get(i) == Some(&'#') {
            digits_after += 1;
            i += 1;
        }
    }
    let trailing_sign = chars.get(i) == Some(&'-') && !leading_sign;
    if trailing_sign {
        i += 1;
    }
    let _ = start;
    (
        FormatField::Numeric {
            digits_before,
            digits_after,
            has_point,
            leading_sign,
            trailing_sign,
            currency,
            asterisk_fill,
        },
        i,
    )
}

pub fn format_numeric_field(value: f64, field: &FormatField) -> String {
    let FormatField::Numeric {
        digits_before,
        digits_after,
        has_point,
        leading_sign,
        trailing_sign,
        currency,
        asterisk_fill,
        ..
    } = field
    else {
        return String::new();
    };
    let sign = if value < 0.0 { "-" } else if *leading_sign { "+" } else { "" };
    let magnitude = value.abs();
    let body = if *has_point {
        format!("{magnitude:.*}", digits_after)
    } else {
        format!("{:.0}", magnitude.round())
    };
    let total_width = digits_before + if *has_point { 1 + digits_after } else { 0 };
    let fill_char = if *asterisk_fill { '*' } else { ' ' };
    let mut padded = body.clone();
    while padded.len() < total_width {
        padded.insert(0, fill_char);
    }
    let prefix = if *currency { "$" } else { "" };
    let mut out = format!("{sign}{prefix}{padded}");
    if *trailing_sign {
        out.push(if value < 0.0 { '-' } else { ' ' });
    }
    out
}

pub fn format_exponential(value: f64, mantissa_digits: usize) -> String {
    let s = format!("{value:.*E}", mantissa_digits);
    s.replace('E', "E+").replace("E+-", "E-")
}

pub fn format_string_field(value: &str, field: &FormatField) -> String {
    match field {
        FormatField::StringField { width } => {
            let mut s: String = value.chars().take(*width).collect();
            while s.chars().count() < *width {
                s.push(' ');
            }
            s
        }
        FormatField::FirstChar => value.chars().next().map(|c| c.to_string()).unwrap_or_default(),
        FormatField::WholeString => value.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_pad_advances_to_next_fourteen_column_boundary() {
        let mut cursor = Cursor::new();
        let mut out = String::new();
        cursor.write(&mut out, "hi");
        cursor.zone_pad(&mut out);
        assert_eq!(out, format!("hi{}", " ".repeat(12)));
    }

    #[test]
    fn parse_format_splits_literal_and_numeric_fields() {
        let fields = parse_format("Total: ##.##");
        assert_eq!(fields[0], FormatField::Literal("Total: ".into()));
        assert!(matches!(fields[1], FormatField::Numeric { digits_before: 2, digits_after: 2, .. }));
    }

    #[test]
    fn numeric_field_pads_with_spaces() {
        let fields = parse_format("###.##");
        let rendered = format_numeric_field(3.5, &fields[0]);
        assert_eq!(rendered, "  3.50");
    }

    #[test]
    fn string_field_width_from_backslashes() {
        let fields = parse_format("\\   \\");
        assert_eq!(fields[0], FormatField::StringField { width: 5 });
        assert_eq!(format_string_field("ab", &fields[0]), "ab   ");
    }
}
