use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::InvitadoPor;
use crate::phone::normalize_phone;
use crate::text::fold;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("El archivo no tiene una columna de {0}")]
    MissingColumn(&'static str),

    #[error("No se pudo leer el archivo: {0}")]
    Csv(String),
}

/// One data row of a guest spreadsheet, already interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    /// 1-based row number in the file, counting the header as row 1.
    pub fila: usize,
    pub nombre: String,
    pub telefono_original: String,
    /// Normalized phone, `None` when the raw value is not a valid number.
    pub telefono: Option<String>,
    pub invitado_por: Option<InvitadoPor>,
    pub num_acompanantes: u32,
    /// Why the row cannot be imported, if it cannot.
    pub problema: Option<String>,
}

impl ImportRow {
    pub fn is_valid(&self) -> bool {
        self.problema.is_none()
    }
}

struct Columns {
    nombre: usize,
    telefono: usize,
    invitado_por: Option<usize>,
    acompanantes: Option<usize>,
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| names.contains(&h.as_str()))
}

fn columns(headers: &csv::StringRecord) -> Result<Columns, ImportError> {
    let folded: Vec<String> = headers.iter().map(|h| fold(h.trim())).collect();
    Ok(Columns {
        nombre: find_column(&folded, &["nombre", "name", "invitado"])
            .ok_or(ImportError::MissingColumn("nombre"))?,
        telefono: find_column(&folded, &["telefono", "phone", "movil", "celular"])
            .ok_or(ImportError::MissingColumn("teléfono"))?,
        invitado_por: find_column(&folded, &["invitadopor", "invitado por", "lado"]),
        acompanantes: find_column(&folded, &["acompanantes", "numacompanantes", "acompanante"]),
    })
}

/// Parses a CSV guest sheet (comma or semicolon separated, header row required).
/// Rows are never dropped: invalid ones carry a `problema`.
pub fn parse_guest_rows(data: &[u8], default_cc: &str) -> Result<Vec<ImportRow>, ImportError> {
    let delimiter = detect_delimiter(data);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| ImportError::Csv(e.to_string()))?
        .clone();
    let cols = columns(&headers)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ImportError::Csv(e.to_string()))?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let cell = |i: usize| record.get(i).unwrap_or("").to_string();
        let nombre = cell(cols.nombre);
        let telefono_original = cell(cols.telefono);
        let telefono = normalize_phone(&telefono_original, default_cc);

        let mut problema = None;
        if nombre.is_empty() {
            problema = Some("Falta el nombre".to_string());
        } else if telefono.is_none() {
            problema = Some(format!("Teléfono no válido: '{}'", telefono_original));
        }

        let invitado_por = cols
            .invitado_por
            .map(cell)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<InvitadoPor>().ok());

        let num_acompanantes = cols
            .acompanantes
            .map(cell)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);

        rows.push(ImportRow {
            fila: index + 2,
            nombre,
            telefono_original,
            telefono,
            invitado_por,
            num_acompanantes,
            problema,
        });
    }

    Ok(rows)
}

fn detect_delimiter(data: &[u8]) -> u8 {
    let first_line = data.split(|b| *b == b'\n').next().unwrap_or(&[]);
    let commas = first_line.iter().filter(|b| **b == b',').count();
    let semicolons = first_line.iter().filter(|b| **b == b';').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}
