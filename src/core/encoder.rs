use crate::models::ExportRow;

pub const DELIMITER: char = ',';
pub const LINE_END: &str = "\n";

/// Quote a single field, doubling embedded quotes
#[inline]
fn quote(field: &str, out: &mut String) {
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}

fn write_record<'a, I>(fields: I, out: &mut String)
where
    I: IntoIterator<Item = &'a str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        quote(field, out);
    }
    out.push_str(LINE_END);
}

/// Encode rows as UTF-8 CSV with every field quoted.
///
/// An empty row set encodes to an empty byte vector, not a header-only file.
pub fn encode(rows: &[ExportRow]) -> Vec<u8> {
    if rows.is_empty() {
        return Vec::new();
    }

    let mut out = String::with_capacity(64 + rows.len() * 256);
    write_record(ExportRow::HEADER, &mut out);
    for row in rows {
        let fields = row.fields();
        write_record(fields.iter().map(String::as_str), &mut out);
    }
    out.into_bytes()
}
