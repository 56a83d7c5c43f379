/// Archive file extension published by the agency
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Directory names
pub const STATION_FAMILY_DIR: &str = "inmet";
pub const FIRE_FAMILY_DIR: &str = "queimadas";
pub const EXTRACTION_SUBDIR: &str = "csv";

/// Output artifact naming: `<prefix>_<year>.csv`
pub const OUTPUT_PREFIX: &str = "inmet";

/// Metadata labels in the leading block of a station file
pub const CITY_LABEL: &str = "ESTACAO";
pub const LATITUDE_LABEL: &str = "LATITUDE";
pub const LONGITUDE_LABEL: &str = "LONGITUDE";

/// First-column labels that identify the column-header row. Exact match
/// only: the preamble's "DATA DE FUNDACAO" line must not qualify.
pub const HEADER_ROW_LABELS: &[&str] = &["Data", "DATA (YYYY-MM-DD)"];

/// How many leading lines are scanned for metadata and the header row
pub const METADATA_SCAN_LIMIT: usize = 30;

/// Derived column names appended to every reconciled station table
pub const DERIVED_COLUMNS: [&str; 4] = ["ANO", "CIDADE", "LATITUDE", "LONGITUDE"];

/// Prefix for placeholder names synthesized when data is wider than the header
pub const PLACEHOLDER_PREFIX: &str = "EXTRA_COLUMN_";

/// Previous-hour aggregate columns, derivable from the instantaneous series.
/// Always removed from consolidated output.
pub const DROPPED_COLUMNS: [&str; 8] = [
    "PRESSAO ATMOSFERICA MAX.NA HORA ANT. (AUT)(mB)",
    "PRESSAO ATMOSFERICA MIN. NA HORA ANT. (AUT)(mB)",
    "TEMPERATURA MÁXIMA NA HORA ANT. (AUT)(°C)",
    "TEMPERATURA MÍNIMA NA HORA ANT. (AUT)(°C)",
    "TEMPERATURA ORVALHO MAX. NA HORA ANT. (AUT)(°C)",
    "TEMPERATURA ORVALHO MIN. NA HORA ANT. (AUT)(°C)",
    "UMIDADE REL. MAX. NA HORA ANT. (AUT)(%)",
    "UMIDADE REL. MIN. NA HORA ANT. (AUT)(%)",
];

/// Download streaming
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192 * 16; // 128KB
