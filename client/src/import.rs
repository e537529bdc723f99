//! Preview of a guest spreadsheet before it is uploaded. The upload itself
//! always sends the original bytes; the server parses them again.

use boda_shared::import::{parse_guest_rows, ImportRow};
use log::info;
use std::collections::HashSet;

use crate::error::{ClientError, Result};
use crate::services::guests::ImportReport;
use crate::services::GuestsService;

pub struct ImportPreview {
    file_name: String,
    raw: Vec<u8>,
    rows: Vec<ImportRow>,
}

impl ImportPreview {
    pub fn from_csv(file_name: &str, raw: Vec<u8>, default_cc: &str) -> Result<Self> {
        let mut rows = parse_guest_rows(&raw, default_cc)
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        // The server reports these as duplicates; flag them up front
        let mut seen = HashSet::new();
        for row in rows.iter_mut().filter(|r| r.is_valid()) {
            if let Some(telefono) = &row.telefono {
                if !seen.insert(telefono.clone()) {
                    row.problema = Some("Teléfono repetido en el archivo".to_string());
                }
            }
        }

        Ok(Self {
            file_name: file_name.to_string(),
            raw,
            rows,
        })
    }

    pub fn rows(&self) -> &[ImportRow] {
        &self.rows
    }

    pub fn valid_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_valid()).count()
    }

    pub fn issues(&self) -> impl Iterator<Item = &ImportRow> {
        self.rows.iter().filter(|r| !r.is_valid())
    }

    pub async fn confirm(self, guests: &GuestsService, boda_id: &str) -> Result<ImportReport> {
        if self.valid_count() == 0 {
            return Err(ClientError::validation("The file has no importable rows"));
        }
        info!("Uploading {} ({} rows)", self.file_name, self.rows.len());
        guests.import(boda_id, &self.file_name, self.raw).await
    }
}
