//! CSV import file conventions and command output records.
//!
//! An import file is a sequence of sections. Each section starts with a
//! header row whose first cell is `header-<object type>`, followed by data
//! rows whose first cell names the same object type. Columns prefixed with
//! `EA-`, `OPTION-` or `ADMGRP-` carry extension fields.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::{Display, EnumString};
use thiserror::Error;

use crate::{
    fileop::{
        poll::{CsvImportTask, TaskStatus},
        TaskReference,
    },
    format::{to_json, CsvRecordProducer, Formattable, FormattingError, OutputFormat},
};

pub const HEADER_PREFIX: &str = "header-";
pub const IMPORT_ACTION_COLUMN: &str = "import-action";
pub const EXTENSION_PREFIXES: [&str; 3] = ["OPTION-", "EA-", "ADMGRP-"];

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read CSV file: {0}")]
    CsvError(#[from] csv::Error),
    #[error("CSV file {0:?} contains no records")]
    EmptyFile(PathBuf),
    #[error("line {line}: expected a header-<type> row before data, found {found:?}")]
    MissingHeader { line: u64, found: String },
    #[error("line {line}: row type {found:?} does not match section {expected:?}")]
    TypeMismatch {
        line: u64,
        expected: String,
        found: String,
    },
    #[error("line {line}: invalid import-action {value:?}, expected one of I, M, O, D, IM, IO")]
    InvalidImportAction { line: u64, value: String },
    #[error("line {line}: {found} cells but the section header has {expected} columns")]
    TooManyCells {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("invalid extension field {0:?}, expected an OPTION-, EA- or ADMGRP- prefix")]
    InvalidExtensionField(String),
}

/// Per-row override of the job-wide operation.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ImportAction {
    /// Insert
    I,
    /// Merge
    M,
    /// Override
    O,
    /// Delete
    D,
    /// Insert, or merge when the object exists
    IM,
    /// Insert, or override when the object exists
    IO,
}

/// Extension-field columns of one data row, keyed by full column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionFields(BTreeMap<String, String>);

impl ExtensionFields {
    pub fn is_extension_key(key: &str) -> bool {
        EXTENSION_PREFIXES
            .iter()
            .any(|prefix| key.len() > prefix.len() && key.starts_with(prefix))
    }

    pub fn insert(&mut self, key: &str, value: &str) -> Result<(), ModelError> {
        if !Self::is_extension_key(key) {
            return Err(ModelError::InvalidExtensionField(key.to_string()));
        }
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One `header-<type>` section of an import file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvSection {
    pub object_type: String,
    pub columns: Vec<String>,
    pub extension_columns: Vec<String>,
    pub rows: u64,
    /// Non-empty extension cells of each data row, in file order.
    pub extension_fields: Vec<ExtensionFields>,
}

impl CsvSection {
    /// Number of extension cells carrying a value across all rows.
    pub fn extension_values(&self) -> usize {
        self.extension_fields.iter().map(ExtensionFields::len).sum()
    }
}

/// Result of a local sanity check over an import file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvCheckReport {
    pub path: PathBuf,
    pub sections: Vec<CsvSection>,
}

impl CsvCheckReport {
    pub fn total_rows(&self) -> u64 {
        self.sections.iter().map(|s| s.rows).sum()
    }
}

/// Validate section structure, `import-action` values and extension-field
/// cells of an import file without contacting the server.
pub fn check_csv_file(path: &Path) -> Result<CsvCheckReport, ModelError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut sections: Vec<CsvSection> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let first = match record.get(0) {
            Some(cell) if !cell.is_empty() => cell,
            _ => continue,
        };

        if let Some(object_type) = strip_prefix_ignore_case(first, HEADER_PREFIX) {
            let columns: Vec<String> = record.iter().skip(1).map(str::to_string).collect();
            let extension_columns = columns
                .iter()
                .filter(|c| ExtensionFields::is_extension_key(c))
                .cloned()
                .collect();
            sections.push(CsvSection {
                object_type: object_type.to_lowercase(),
                columns,
                extension_columns,
                rows: 0,
                extension_fields: Vec::new(),
            });
            continue;
        }

        let section = sections.last_mut().ok_or_else(|| ModelError::MissingHeader {
            line,
            found: first.to_string(),
        })?;
        if !first.eq_ignore_ascii_case(&section.object_type) {
            return Err(ModelError::TypeMismatch {
                line,
                expected: section.object_type.clone(),
                found: first.to_string(),
            });
        }

        // Trailing empty cells from padded exports are tolerated.
        let cells: Vec<&str> = record.iter().skip(1).collect();
        let cells = cells
            .iter()
            .rposition(|cell| !cell.is_empty())
            .map_or(0, |last| last + 1);
        if cells > section.columns.len() {
            return Err(ModelError::TooManyCells {
                line,
                expected: section.columns.len(),
                found: cells,
            });
        }

        let mut extensions = ExtensionFields::default();
        for (column, value) in section.columns.iter().zip(record.iter().skip(1)) {
            if column.eq_ignore_ascii_case(IMPORT_ACTION_COLUMN) && !value.is_empty() {
                value
                    .parse::<ImportAction>()
                    .map_err(|_| ModelError::InvalidImportAction {
                        line,
                        value: value.to_string(),
                    })?;
            } else if ExtensionFields::is_extension_key(column) && !value.is_empty() {
                extensions.insert(column, value)?;
            }
        }
        section.extension_fields.push(extensions);
        section.rows += 1;
    }

    if sections.is_empty() {
        return Err(ModelError::EmptyFile(path.to_path_buf()));
    }
    Ok(CsvCheckReport {
        path: path.to_path_buf(),
        sections,
    })
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) && value.len() > prefix.len() {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

impl CsvRecordProducer for CsvCheckReport {
    fn csv_header() -> Vec<String> {
        vec![
            "OBJECT_TYPE".to_string(),
            "ROWS".to_string(),
            "COLUMNS".to_string(),
            "EXTENSION_COLUMNS".to_string(),
            "EXTENSION_VALUES".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        self.sections
            .iter()
            .map(|s| {
                vec![
                    s.object_type.clone(),
                    s.rows.to_string(),
                    s.columns.len().to_string(),
                    s.extension_columns.join(";"),
                    s.extension_values().to_string(),
                ]
            })
            .collect()
    }
}

impl Formattable for CsvCheckReport {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => to_json(self, options),
            OutputFormat::Csv(options) => self.to_csv(options.with_headers),
        }
    }
}

/// A server artifact written to local disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedFile {
    pub operation: String,
    pub path: PathBuf,
}

impl SavedFile {
    pub fn new(operation: impl Into<String>, path: PathBuf) -> Self {
        Self {
            operation: operation.into(),
            path,
        }
    }
}

impl CsvRecordProducer for SavedFile {
    fn csv_header() -> Vec<String> {
        vec!["OPERATION".to_string(), "PATH".to_string()]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.operation.clone(),
            self.path.display().to_string(),
        ]]
    }
}

impl Formattable for SavedFile {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => to_json(self, options),
            OutputFormat::Csv(options) => self.to_csv(options.with_headers),
        }
    }
}

impl CsvRecordProducer for TaskReference {
    fn csv_header() -> Vec<String> {
        vec!["REFERENCE".to_string()]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![self.reference().to_string()]]
    }
}

impl Formattable for TaskReference {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => to_json(self, options),
            OutputFormat::Csv(options) => self.to_csv(options.with_headers),
        }
    }
}

fn optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl CsvRecordProducer for CsvImportTask {
    fn csv_header() -> Vec<String> {
        [
            "REFERENCE",
            "STATUS",
            "LINES_PROCESSED",
            "LINES_FAILED",
            "LINES_WARNING",
            "IMPORT_ID",
            "FILE_NAME",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.reference.clone(),
            self.status.to_string(),
            optional(&self.lines_processed),
            optional(&self.lines_failed),
            optional(&self.lines_warning),
            optional(&self.import_id),
            optional(&self.file_name),
        ]]
    }
}

impl Formattable for CsvImportTask {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => to_json(self, options),
            OutputFormat::Csv(options) => self.to_csv(options.with_headers),
        }
    }
}

/// True when a finished task should count as a failure of the command.
pub fn is_failed(status: TaskStatus) -> bool {
    matches!(status, TaskStatus::Failed | TaskStatus::Stopped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormatOptions;
    use std::fs;

    fn write_csv(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.csv");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_check_counts_sections_and_rows() {
        let (_dir, path) = write_csv(
            "header-arecord,fqdn*,address*,EA-Site,import-action\n\
             arecord,a.example.com,10.0.0.1,HQ,IM\n\
             arecord,b.example.com,10.0.0.2,,\n\
             \n\
             HEADER-HostRecord,fqdn*,addresses\n\
             hostrecord,h.example.com,10.0.0.3\n",
        );
        let report = check_csv_file(&path).unwrap();
        assert_eq!(report.sections.len(), 2);
        assert_eq!(report.sections[0].object_type, "arecord");
        assert_eq!(report.sections[0].rows, 2);
        assert_eq!(report.sections[0].extension_columns, vec!["EA-Site"]);
        assert_eq!(report.sections[0].extension_fields.len(), 2);
        assert_eq!(report.sections[0].extension_fields[0].get("EA-Site"), Some("HQ"));
        assert!(report.sections[0].extension_fields[1].is_empty());
        assert_eq!(report.sections[0].extension_values(), 1);
        assert_eq!(report.sections[1].object_type, "hostrecord");
        assert_eq!(report.total_rows(), 3);
    }

    #[test]
    fn test_check_rejects_bad_import_action() {
        let (_dir, path) = write_csv(
            "header-arecord,fqdn*,import-action\n\
             arecord,a.example.com,X\n",
        );
        assert!(matches!(
            check_csv_file(&path),
            Err(ModelError::InvalidImportAction { line: 2, value }) if value == "X"
        ));
    }

    #[test]
    fn test_check_rejects_rows_wider_than_header() {
        let (_dir, path) = write_csv(
            "header-arecord,fqdn*,address*\n\
             arecord,a.example.com,10.0.0.1,,\n\
             arecord,b.example.com,10.0.0.2,extra\n",
        );
        assert!(matches!(
            check_csv_file(&path),
            Err(ModelError::TooManyCells {
                line: 3,
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_check_requires_header_first() {
        let (_dir, path) = write_csv("arecord,a.example.com\n");
        assert!(matches!(
            check_csv_file(&path),
            Err(ModelError::MissingHeader { line: 1, .. })
        ));
    }

    #[test]
    fn test_check_rejects_type_mismatch() {
        let (_dir, path) = write_csv("header-arecord,fqdn*\nhostrecord,h.example.com\n");
        assert!(matches!(
            check_csv_file(&path),
            Err(ModelError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_check_empty_file() {
        let (_dir, path) = write_csv("");
        assert!(matches!(check_csv_file(&path), Err(ModelError::EmptyFile(_))));
    }

    #[test]
    fn test_import_action_values() {
        for value in ["I", "M", "O", "D", "IM", "IO", "im"] {
            assert!(value.parse::<ImportAction>().is_ok(), "{}", value);
        }
        assert!("MI".parse::<ImportAction>().is_err());
    }

    #[test]
    fn test_extension_fields_validate_prefix() {
        let mut fields = ExtensionFields::default();
        fields.insert("EA-Site", "HQ").unwrap();
        fields.insert("OPTION-66", "tftp.example.com").unwrap();
        fields.insert("ADMGRP-Ops", "rw").unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("EA-Site"), Some("HQ"));

        assert!(matches!(
            fields.insert("Site", "HQ"),
            Err(ModelError::InvalidExtensionField(k)) if k == "Site"
        ));
        assert!(fields.insert("EA-", "x").is_err());
    }

    #[test]
    fn test_task_csv_output() {
        let task = CsvImportTask {
            reference: "csvimporttask/abc:1".to_string(),
            status: TaskStatus::Completed,
            lines_processed: Some(10),
            lines_failed: Some(0),
            lines_warning: None,
            import_id: Some(4),
            file_name: Some("import.csv".to_string()),
            start_time: None,
            end_time: None,
        };
        let output = task
            .format(&OutputFormat::Csv(OutputFormatOptions::default()))
            .unwrap();
        assert_eq!(output, "csvimporttask/abc:1,COMPLETED,10,0,,4,import.csv\n");
        assert!(is_failed(TaskStatus::Stopped));
        assert!(!is_failed(task.status));
    }

    #[test]
    fn test_task_reference_json_keeps_wire_shape() {
        let reference = TaskReference::new("csvimporttask/abc:1");
        let output = reference.format(&OutputFormat::default()).unwrap();
        assert_eq!(output, r#"{"csv_import_task":{"_ref":"csvimporttask/abc:1"}}"#);
    }
}
