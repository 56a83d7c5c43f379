use crate::error::{PipelineError, Result};
use crate::models::{StationMetadata, StationTable};
use crate::utils::constants::{
    CITY_LABEL, HEADER_ROW_LABELS, LATITUDE_LABEL, LONGITUDE_LABEL, METADATA_SCAN_LIMIT,
    PLACEHOLDER_PREFIX,
};
use encoding_rs::Encoding;
use std::fs;
use std::path::Path;
use tracing::warn;

/// One station file after decoding, metadata extraction and schema repair.
#[derive(Debug, Clone)]
pub struct ParsedStationFile {
    pub table: StationTable,
    pub metadata: StationMetadata,
}

/// Parses one raw station-year file: legacy single-byte decode, a
/// label-driven scan of the leading lines for metadata and the column
/// header, then a tolerant semicolon-delimited parse of the data rows.
pub struct StationFileReader {
    encoding: &'static Encoding,
}

impl StationFileReader {
    /// The agency publishes Latin-1; decoding is windows-1252, its
    /// ecosystem superset. City names corrupt under any UTF-8 assumption.
    pub fn new() -> Self {
        Self {
            encoding: encoding_rs::WINDOWS_1252,
        }
    }

    pub fn with_encoding(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    pub fn read(&self, path: &Path) -> Result<ParsedStationFile> {
        let bytes = fs::read(path)?;
        let (text, _, _) = self.encoding.decode(&bytes);
        self.parse(&text, path)
    }

    fn parse(&self, text: &str, path: &Path) -> Result<ParsedStationFile> {
        let lines: Vec<&str> = text.lines().collect();

        let mut city = None;
        let mut latitude = None;
        let mut longitude = None;
        let mut header: Option<Vec<String>> = None;
        let mut data_start = 0;

        // Scan the leading lines for labelled metadata and the header row
        // rather than trusting fixed positions; legacy layouts reorder and
        // pad this block.
        for (index, line) in lines.iter().take(METADATA_SCAN_LIMIT).enumerate() {
            let mut fields = line.split(';');
            let label = normalize_label(fields.next().unwrap_or(""));

            if is_header_label(&label) {
                let columns: Vec<String> = line
                    .split(';')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect();
                header = Some(columns);
                data_start = index + 1;
                break;
            }

            let value = fields
                .next()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            match label.as_str() {
                l if l == CITY_LABEL => city = value,
                l if l == LATITUDE_LABEL => latitude = value,
                l if l == LONGITUDE_LABEL => longitude = value,
                _ => {}
            }
        }

        let header = header.ok_or_else(|| PipelineError::MissingHeader(path.to_path_buf()))?;
        let rows = parse_data_rows(&lines[data_start..]);
        let columns = reconcile_schema(header, &rows, path)?;

        Ok(ParsedStationFile {
            table: StationTable::new(columns, rows),
            metadata: StationMetadata::new(city, latitude, longitude),
        })
    }
}

impl Default for StationFileReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Uppercase, strip the trailing colon and fold the accented characters
/// the agency uses in its labels.
fn normalize_label(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(':')
        .to_uppercase()
        .replace('Ç', "C")
        .replace('Ã', "A")
        .replace('Õ', "O")
        .replace('É', "E")
}

fn is_header_label(label: &str) -> bool {
    HEADER_ROW_LABELS
        .iter()
        .any(|known| normalize_label(known) == label)
}

/// Tolerant row parse: semicolon-delimited, no quoting assumptions beyond
/// the `csv` crate defaults. The first data row fixes the expected width;
/// rows that cannot be parsed or whose width diverges are dropped without
/// comment. Trailing empty fields (the agency terminates rows with `;`)
/// are not counted.
fn parse_data_rows(lines: &[&str]) -> Vec<Vec<String>> {
    let body = lines.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    let mut width: Option<usize> = None;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(_) => continue,
        };

        let mut fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
        while fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }
        if fields.is_empty() {
            continue;
        }

        let expected = *width.get_or_insert(fields.len());
        if fields.len() != expected {
            continue;
        }
        rows.push(fields);
    }

    rows
}

/// Reconcile the declared header against the data's actual width.
///
/// Wider data gets placeholder names (removed again downstream); narrower
/// data makes the header-to-column mapping ambiguous, so the whole file is
/// rejected rather than guessing which names to drop.
fn reconcile_schema(
    mut header: Vec<String>,
    rows: &[Vec<String>],
    path: &Path,
) -> Result<Vec<String>> {
    let data_width = rows.first().map_or(header.len(), Vec::len);

    if data_width > header.len() {
        let missing = data_width - header.len();
        warn!(
            path = %path.display(),
            declared = header.len(),
            actual = data_width,
            "data wider than header, synthesizing {missing} placeholder column(s)"
        );
        for n in 1..=missing {
            header.push(format!("{}{}", PLACEHOLDER_PREFIX, n));
        }
    } else if data_width < header.len() {
        return Err(PipelineError::SchemaTooNarrow {
            path: path.to_path_buf(),
            header: header.len(),
            data: data_width,
        });
    }

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const WELL_FORMED: &str = "\
REGIAO:;SE;
UF:;SP;
ESTACAO:;MIRANTE;
CODIGO (WMO):;A701;
LATITUDE:;-23,49;
LONGITUDE:;-46,62;
ALTITUDE:;785,64;
DATA DE FUNDACAO:;25/07/06;
Data;Hora UTC;PRECIPITACAO TOTAL. HORARIO (mm);TEMPERATURA DO AR - BULBO SECO. HORARIA (°C);
2005/01/01;0000 UTC;0,2;21,4;
2005/01/01;0100 UTC;0,0;21,0;
";

    fn parse(text: &str) -> Result<ParsedStationFile> {
        StationFileReader::new().parse(text, Path::new("test.csv"))
    }

    #[test]
    fn test_metadata_extracted_by_label() {
        let parsed = parse(WELL_FORMED).unwrap();
        assert_eq!(parsed.metadata.city.as_deref(), Some("MIRANTE"));
        assert_eq!(parsed.metadata.latitude.as_deref(), Some("-23,49"));
        assert_eq!(parsed.metadata.longitude.as_deref(), Some("-46,62"));
    }

    #[test]
    fn test_header_and_rows() {
        let parsed = parse(WELL_FORMED).unwrap();
        assert_eq!(parsed.table.columns().len(), 4);
        assert_eq!(parsed.table.columns()[0], "Data");
        assert_eq!(parsed.table.row_count(), 2);
        assert_eq!(parsed.table.rows()[1][3], "21,0");
    }

    #[test]
    fn test_metadata_tolerates_reordering_and_extra_lines() {
        let reordered = "\
SOME NEW FIELD:;whatever;
LONGITUDE:;-46,62;
ESTACAO:;MIRANTE;
LATITUDE:;-23,49;
Data;Hora UTC;
2005/01/01;0000 UTC;
";
        let parsed = parse(reordered).unwrap();
        assert_eq!(parsed.metadata.city.as_deref(), Some("MIRANTE"));
        assert_eq!(parsed.metadata.latitude.as_deref(), Some("-23,49"));
        assert_eq!(parsed.metadata.longitude.as_deref(), Some("-46,62"));
    }

    #[test]
    fn test_accented_label_variant() {
        let accented = "\
ESTAÇÃO:;ÁGUA BRANCA;
LATITUDE:;-9,28;
LONGITUDE:;-37,93;
Data;Hora UTC;
2005/01/01;0000 UTC;
";
        let parsed = parse(accented).unwrap();
        assert_eq!(parsed.metadata.city.as_deref(), Some("ÁGUA BRANCA"));
    }

    #[test]
    fn test_missing_value_field_yields_none() {
        let missing = "\
ESTACAO:
LATITUDE:;-23,49;
LONGITUDE:;-46,62;
Data;Hora UTC;
2005/01/01;0000 UTC;
";
        let parsed = parse(missing).unwrap();
        assert_eq!(parsed.metadata.city, None);
        assert_eq!(parsed.metadata.latitude.as_deref(), Some("-23,49"));
    }

    #[test]
    fn test_no_header_row_is_an_error() {
        let headerless = "ESTACAO:;MIRANTE;\nLATITUDE:;-23,49;\n";
        let err = parse(headerless).unwrap_err();
        assert!(matches!(err, PipelineError::MissingHeader(_)));
    }

    #[test]
    fn test_wide_data_gains_placeholders() {
        let wide = "\
ESTACAO:;MIRANTE;
Data;Hora UTC;
2005/01/01;0000 UTC;1,0;2,0;
2005/01/01;0100 UTC;1,1;2,1;
";
        let parsed = parse(wide).unwrap();
        assert_eq!(
            parsed.table.columns(),
            &[
                "Data".to_string(),
                "Hora UTC".to_string(),
                "EXTRA_COLUMN_1".to_string(),
                "EXTRA_COLUMN_2".to_string(),
            ]
        );
        assert_eq!(parsed.table.row_count(), 2);
    }

    #[test]
    fn test_narrow_data_rejects_file() {
        let narrow = "\
ESTACAO:;MIRANTE;
Data;Hora UTC;PRECIPITACAO;TEMPERATURA;
2005/01/01;0000 UTC;
";
        let err = parse(narrow).unwrap_err();
        match err {
            PipelineError::SchemaTooNarrow { header, data, .. } => {
                assert_eq!(header, 4);
                assert_eq!(data, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_divergent_rows_are_dropped() {
        let ragged = "\
ESTACAO:;MIRANTE;
Data;Hora UTC;PRECIPITACAO;
2005/01/01;0000 UTC;0,2;
2005/01/01;0100 UTC;
2005/01/01;0200 UTC;0,4;
";
        let parsed = parse(ragged).unwrap();
        assert_eq!(parsed.table.row_count(), 2);
    }

    #[test]
    fn test_latin1_city_name_survives() {
        let mut file = NamedTempFile::new().unwrap();
        // "ESTAÇÃO:;SÃO PAULO;" and the header line, in Latin-1 bytes
        file.write_all(b"ESTA\xC7\xC3O:;S\xC3O PAULO;\n").unwrap();
        file.write_all(b"LATITUDE:;-23,49;\n").unwrap();
        file.write_all(b"LONGITUDE:;-46,62;\n").unwrap();
        file.write_all(b"Data;Hora UTC;\n").unwrap();
        file.write_all(b"2005/01/01;0000 UTC;\n").unwrap();

        let parsed = StationFileReader::new().read(file.path()).unwrap();
        assert_eq!(parsed.metadata.city.as_deref(), Some("SÃO PAULO"));
    }

    #[test]
    fn test_encoding_is_an_explicit_parameter() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all("ESTAÇÃO:;SÃO PAULO;\nData;Hora UTC;\n2005/01/01;0000 UTC;\n".as_bytes())
            .unwrap();

        let reader = StationFileReader::with_encoding(encoding_rs::UTF_8);
        let parsed = reader.read(file.path()).unwrap();
        assert_eq!(parsed.metadata.city.as_deref(), Some("SÃO PAULO"));
    }

    #[test]
    fn test_utf8_misread_would_corrupt() {
        // The same bytes decoded as UTF-8 lose the cedilla; this pins the
        // encoding as a real parameter, not an accident.
        let bytes = b"S\xC3O PAULO";
        let (as_latin1, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
        assert_eq!(as_latin1, "SÃO PAULO");
        assert!(String::from_utf8(bytes.to_vec()).is_err());
    }
}
