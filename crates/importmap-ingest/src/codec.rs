//! Delimited text parsing and writing.

use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use importmap_model::{Delimiter, ImportOptions, ImportTable, InputFormatError};

use crate::error::{CodecError, Result};

/// File extensions accepted by [`read_import_file`] (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Parses one line into trimmed fields.
///
/// `"` toggles quoting and is itself dropped, so doubled quotes inside a
/// quoted field are not unescaped. The delimiter splits only outside quotes.
pub fn parse_line(line: &str, delimiter: Delimiter) -> Vec<String> {
    let separator = delimiter.as_char();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Parses delimited text into rows.
///
/// Lines are split on `\n` (a trailing `\r` is ignored) and fully blank
/// lines are dropped. A leading byte order mark is stripped.
pub fn parse(text: &str, delimiter: Delimiter) -> std::result::Result<Vec<Vec<String>>, InputFormatError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rows: Vec<Vec<String>> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_line(line, delimiter))
        .collect();

    if rows.is_empty() {
        return Err(InputFormatError::EmptyInput);
    }
    Ok(rows)
}

/// Writes a caption header row followed by the data rows.
///
/// Fields containing the delimiter, a comma, a double quote or a line break
/// are quoted, with internal quotes doubled.
pub fn serialize(rows: &[Vec<String>], caption_headers: &[String], delimiter: Delimiter) -> Result<String> {
    let mut out = Vec::new();
    write_record(&mut out, caption_headers, delimiter)?;
    for row in rows {
        write_record(&mut out, row, delimiter)?;
    }
    // Every field came in as a `String`, so the bytes are valid UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn write_record(out: &mut Vec<u8>, record: &[String], delimiter: Delimiter) -> Result<()> {
    // The csv writer only quotes its own delimiter; commas are quoted for tab output too.
    let quote_style = if delimiter != Delimiter::Comma && record.iter().any(|f| f.contains(',')) {
        QuoteStyle::Always
    } else {
        QuoteStyle::Necessary
    };
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .quote_style(quote_style)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(&mut *out);
    writer.write_record(record)?;
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Reads and parses an import file from disk.
///
/// Rejects files without a supported extension and content that is not
/// UTF-8 text before anything is parsed.
pub fn read_import_file(path: &Path, options: &ImportOptions) -> Result<ImportTable> {
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        });
    if !supported {
        return Err(InputFormatError::UnrecognizedFile {
            path: path.to_path_buf(),
        }
        .into());
    }

    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CodecError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CodecError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let text = decode(path, bytes)?;
    let rows = parse(&text, options.delimiter)?;

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        delimiter = %options.delimiter,
        has_header = options.has_header,
        "Parsed import file"
    );

    Ok(ImportTable::new(rows, options.has_header))
}

/// UTF-8 only; UTF-16 byte order marks are reported by name.
fn decode(path: &Path, bytes: Vec<u8>) -> std::result::Result<String, InputFormatError> {
    let encoding = match bytes.get(0..2) {
        Some([0xFF, 0xFE]) => Some("UTF-16 LE"),
        Some([0xFE, 0xFF]) => Some("UTF-16 BE"),
        _ => None,
    };
    if let Some(encoding) = encoding {
        return Err(InputFormatError::Encoding {
            path: path.to_path_buf(),
            encoding,
        });
    }

    String::from_utf8(bytes).map_err(|_| InputFormatError::Encoding {
        path: path.to_path_buf(),
        encoding: "non-UTF-8",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_parse_line_respects_quotes() {
        let fields = parse_line(r#"a, "b, c" ,d"#, Delimiter::Comma);
        assert_eq!(fields, strings(&["a", "b, c", "d"]));
    }

    #[test]
    fn test_parse_line_drops_doubled_quotes() {
        let fields = parse_line(r#""say ""hi""",x"#, Delimiter::Comma);
        assert_eq!(fields, strings(&["say hi", "x"]));
    }

    #[test]
    fn test_parse_tab_delimited() {
        let rows = parse("Name\tEmail\nAnn, Lee\tann@x.io\n", Delimiter::Tab).unwrap();
        assert_eq!(rows[1], strings(&["Ann, Lee", "ann@x.io"]));
    }

    #[test]
    fn test_parse_drops_blank_lines_and_bom() {
        let rows = parse("\u{feff}Name,Email\r\n\r\n  \nAnn,ann@x.io\r\n", Delimiter::Comma).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], strings(&["Name", "Email"]));
        assert_eq!(rows[1], strings(&["Ann", "ann@x.io"]));
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse(" \n\n\t\n", Delimiter::Comma), Err(InputFormatError::EmptyInput));
    }

    #[test]
    fn test_serialize_quotes_when_needed() {
        let text = serialize(
            &[strings(&["Smith, J", "say \"hi\"", "plain"])],
            &strings(&["Full Name", "Note", "Status"]),
            Delimiter::Comma,
        )
        .unwrap();
        assert_eq!(
            text,
            "Full Name,Note,Status\n\"Smith, J\",\"say \"\"hi\"\"\",plain\n"
        );
    }

    #[test]
    fn test_serialize_tab_quotes_commas() {
        let text = serialize(&[strings(&["a,b", "c"])], &strings(&["X", "Y"]), Delimiter::Tab).unwrap();
        assert_eq!(text, "X\tY\n\"a,b\"\t\"c\"\n");
    }

    #[test]
    fn test_read_rejects_unknown_extension() {
        let err = read_import_file(Path::new("people.xlsx"), &ImportOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Input(InputFormatError::UnrecognizedFile { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_utf16() {
        let err = decode(Path::new("a.csv"), vec![0xFF, 0xFE, b'a', 0]).unwrap_err();
        assert!(matches!(
            err,
            InputFormatError::Encoding {
                encoding: "UTF-16 LE",
                ..
            }
        ));
    }
}
