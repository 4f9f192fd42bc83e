//! CSV export of a vote table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use localiza_analytics_models::{SummaryMode, VoteRow};

use crate::AnalyticsError;

/// Byte-order mark so spreadsheet tools detect UTF-8 (accented labels).
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column headers for `mode`.
#[must_use]
pub const fn headers(mode: SummaryMode) -> &'static [&'static str] {
    match mode {
        SummaryMode::PollingPlace => &["Local de Votação", "Município", "Votos"],
        SummaryMode::Municipality => &["Município", "Votos"],
    }
}

/// Default export file name for a votes file stem.
#[must_use]
pub fn export_file_name(stem: &str) -> String {
    format!("localizavotos_{stem}.csv")
}

/// Writes `rows` as CSV, most votes first.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_csv<W: Write>(
    rows: &[VoteRow],
    mode: SummaryMode,
    mut writer: W,
) -> Result<(), AnalyticsError> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(headers(mode))?;

    let mut sorted: Vec<&VoteRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.vote_count.total_cmp(&a.vote_count));

    for row in sorted {
        let votes = row.vote_count.to_string();
        match mode {
            SummaryMode::PollingPlace => csv_writer.write_record([
                row.display_polling_place.as_str(),
                row.display_municipality.as_str(),
                votes.as_str(),
            ])?,
            SummaryMode::Municipality => {
                csv_writer.write_record([row.display_municipality.as_str(), votes.as_str()])?;
            }
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes `rows` as CSV to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_csv(rows: &[VoteRow], mode: SummaryMode, path: &Path) -> Result<(), AnalyticsError> {
    let file = File::create(path)?;
    write_csv(rows, mode, BufWriter::new(file))?;
    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::row;

    fn render(rows: &[VoteRow], mode: SummaryMode) -> String {
        let mut buf = Vec::new();
        write_csv(rows, mode, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        text.strip_prefix('\u{feff}').unwrap().to_string()
    }

    #[test]
    fn polling_place_export_is_sorted_by_votes() {
        let rows = vec![
            row("Escola B", "Caucaia", "", 40.0),
            row("Escola A", "Fortaleza", "", 1250.0),
        ];
        assert_eq!(
            render(&rows, SummaryMode::PollingPlace),
            "Local de Votação,Município,Votos\nEscola A,Fortaleza,1250\nEscola B,Caucaia,40\n"
        );
    }

    #[test]
    fn municipality_export_has_two_columns() {
        let rows = vec![row("", "Sobral", "", 12.5)];
        assert_eq!(
            render(&rows, SummaryMode::Municipality),
            "Município,Votos\nSobral,12.5\n"
        );
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let rows = vec![row("Escola, Anexo", "Fortaleza", "", 1.0)];
        assert!(render(&rows, SummaryMode::PollingPlace).contains("\"Escola, Anexo\""));
    }

    #[test]
    fn export_writes_file() {
        let dir = std::env::temp_dir().join("localiza_export_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(export_file_name("votos_teste"));
        export_csv(&[row("Escola A", "Fortaleza", "", 3.0)], SummaryMode::PollingPlace, &path)
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
