//! CSV parsing (RFC 4180 quoting, configurable delimiter)

/// Split `text` into rows of fields.
///
/// Quoted fields may contain the delimiter, doubled quotes and line breaks.
/// A trailing line break does not start a new row; blank lines in between
/// yield empty rows. A quoted field still open at the end of the input is
/// closed there.
pub fn parse(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut was_quoted = false;
    let mut row_started = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !was_quoted => {
                in_quotes = true;
                was_quoted = true;
                row_started = true;
            }
            c if c == delimiter => {
                row.push(std::mem::take(&mut field));
                was_quoted = false;
                row_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                if row_started {
                    row.push(std::mem::take(&mut field));
                }
                rows.push(std::mem::take(&mut row));
                was_quoted = false;
                row_started = false;
            }
            _ => {
                field.push(c);
                row_started = true;
            }
        }
    }

    if row_started {
        row.push(field);
        rows.push(row);
    }

    rows
}
