//! CSV export of conformity requests.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use chrono::NaiveDateTime;

use crate::domain::ConformityRequest;

/// Column headers, in output order.
pub const HEADERS: [&str; 8] = [
    "ID Solicitud",
    "Fecha Creación",
    "Estado",
    "Grupos Red",
    "Cantidad Autorizadores",
    "Ticket Helpdesk",
    "Fecha Cierre",
    "Observaciones",
];

/// Writes a header row and one row per request to `path`.
pub(crate) fn export<'a>(
    path: &Path,
    requests: impl IntoIterator<Item = &'a ConformityRequest>,
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_rows(&mut writer, requests)?;
    writer.flush()
}

fn write_rows<'a, W: Write>(
    writer: &mut W,
    requests: impl IntoIterator<Item = &'a ConformityRequest>,
) -> io::Result<()> {
    write_record(writer, HEADERS)?;
    for request in requests {
        write_record(writer, row(request))?;
    }
    Ok(())
}

fn row(request: &ConformityRequest) -> [String; 8] {
    [
        request.id().to_string(),
        iso(request.created_at()),
        request.status().to_string(),
        request.network_groups().join("; "),
        request.authorizers().len().to_string(),
        request.helpdesk_ticket().unwrap_or_default().to_string(),
        request.closed_at().map(iso).unwrap_or_default(),
        request.notes().unwrap_or_default().to_string(),
    ]
}

fn iso(timestamp: NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

fn write_record<W: Write, S: AsRef<str>>(
    writer: &mut W,
    fields: impl IntoIterator<Item = S>,
) -> io::Result<()> {
    let line = fields
        .into_iter()
        .map(|field| escape(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")
}

/// Quotes a field if it contains a delimiter, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
