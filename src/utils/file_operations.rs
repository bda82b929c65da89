use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Nombre del adjunto: `[<clave>]_<fecha ISO-8601 con ':', '.' y '-' cambiados por '_'>.csv`
pub fn attachment_filename(issue_key: &str, timestamp: DateTime<Utc>) -> String {
    let stamp = timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.', '-'], "_");

    format!("[{}]_{}.csv", issue_key, stamp)
}

/// Guarda una copia local del CSV exportado
pub fn save_export(dir: &Path, filename: &str, content: &str) -> io::Result<PathBuf> {
    // Crear el directorio si no existe
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let path = dir.join(filename);
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_attachment_filename_format() {
        let timestamp = Utc.with_ymd_and_hms(2025, 4, 7, 9, 5, 3).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(
            attachment_filename("ABC-1", timestamp),
            "[ABC-1]_2025_04_07T09_05_03_042Z.csv"
        );
    }

    #[test]
    fn test_save_export_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("exports");
        let path = save_export(&dir, "[ABC-1]_x.csv", "a,b\r\n").unwrap();

        assert_eq!(path, dir.join("[ABC-1]_x.csv"));
        assert_eq!(fs::read_to_string(path).unwrap(), "a,b\r\n");
    }
}
