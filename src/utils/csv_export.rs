use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;

use crate::error::ExportError;
use crate::models::DetailedTestCase;
use crate::utils::normalize::strip_code_fence;

/// Columnas esperadas en cada fila del CSV
#[derive(Debug, Clone, PartialEq)]
pub struct CsvSchema {
    headers: Vec<String>,
    blank_columns: Vec<usize>,
}

impl CsvSchema {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        CsvSchema {
            headers: headers.into_iter().map(Into::into).collect(),
            blank_columns: Vec::new(),
        }
    }

    /// Esquema de 15 columnas de los casos detallados
    pub fn detailed() -> Self {
        CsvSchema {
            blank_columns: DetailedTestCase::BLANK_COLUMNS.to_vec(),
            ..CsvSchema::new(DetailedTestCase::HEADERS)
        }
    }

    /// Esquema anterior de 14 columnas, sin "Category"
    pub fn legacy() -> Self {
        let headers = DetailedTestCase::HEADERS
            .into_iter()
            .filter(|h| *h != "Category");

        CsvSchema {
            blank_columns: vec![10, 12, 13],
            ..CsvSchema::new(headers)
        }
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn is_detailed(&self) -> bool {
        self.headers.len() == DetailedTestCase::HEADERS.len()
            && self.headers.iter().zip(DetailedTestCase::HEADERS).all(|(a, b)| a == b)
    }

    /// Convierte una fila JSON en un registro, o None si no encaja en el esquema
    fn record(&self, row: &Value) -> Option<Vec<String>> {
        let cells = row.as_array()?;
        if cells.len() != self.width() {
            return None;
        }

        Some(
            cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if self.blank_columns.contains(&i) {
                        String::new()
                    } else {
                        render_cell(cell)
                    }
                })
                .collect(),
        )
    }
}

/// Resultado de la exportación
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub content: String,
    pub records: Vec<Vec<String>>,
    pub dropped: usize,
}

fn render_cell(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Lee el array de filas que devuelve la segunda llamada al modelo
pub fn parse_rows(raw: &str) -> Result<Vec<Value>, ExportError> {
    if raw.trim().is_empty() {
        log::warn!("⚠️ [CSV entrada] La respuesta está vacía, no se puede procesar");
        return Err(ExportError::EmptyInput);
    }

    let cleaned = strip_code_fence(raw);
    if cleaned.is_empty() {
        log::warn!("⚠️ [CSV limpieza] La respuesta quedó vacía al quitar el bloque de código");
        return Err(ExportError::EmptyInput);
    }

    let parsed: Value = serde_json::from_str(cleaned).map_err(|e| {
        log::error!("❌ [CSV JSON] Error al interpretar la respuesta del modelo: {}", e);
        log::debug!("Respuesta original: {}", raw);
        ExportError::MalformedJson(e)
    })?;

    match parsed {
        Value::Array(rows) if !rows.is_empty() => Ok(rows),
        _ => {
            log::warn!("⚠️ [CSV forma] El JSON no es un array con elementos");
            Err(ExportError::NotAnArray)
        }
    }
}

/// Convierte la respuesta del modelo (array de arrays) en un CSV con fin de línea CRLF.
///
/// Las filas que no coinciden con el ancho del esquema se descartan.
pub fn to_csv(raw: &str, schema: &CsvSchema) -> Result<CsvExport, ExportError> {
    let rows = parse_rows(raw)?;

    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0;

    for (index, row) in rows.iter().enumerate() {
        match schema.record(row) {
            Some(record) => records.push(record),
            None => {
                let found = row.as_array().map(|cells| cells.len());
                log::warn!(
                    "⚠️ [CSV fila] Se descarta la fila {}: se esperaban {} columnas, se encontró {:?}: {}",
                    index,
                    schema.width(),
                    found,
                    row
                );
                dropped += 1;
            }
        }
    }

    if records.is_empty() {
        log::warn!("⚠️ [CSV filas] No quedó ninguna fila válida tras el filtrado");
        return Err(ExportError::NoValidRows);
    }

    let content = write_records(schema.headers(), &records)?;

    Ok(CsvExport {
        content,
        records,
        dropped,
    })
}

/// Comillas solo ante `,` `"` `\r` `\n`. Excepción de la crate `csv`: un registro
/// de un único campo vacío se escribe como `""` para no confundirse con una línea vacía.
fn write_records(headers: &[String], records: &[Vec<String>]) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(headers)
        .map_err(|e| ExportError::Write(e.to_string()))?;

    for record in records {
        writer
            .write_record(record)
            .map_err(|e| ExportError::Write(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Write(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| ExportError::Write(e.to_string()))
}
