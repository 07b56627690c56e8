// std imports
use std::fmt::Display;
use std::io::Write;

// 3rd party imports
use anyhow::Result;
use serde::Serialize;

// internal imports
use crate::entities::peptide_row::PeptideRow;
use crate::tools::serde::serialize_mass_to_float;

/// Line width of FASTA sequences
pub const FASTA_SEQUENCE_LINE_LENGTH: usize = 60;

/// Encodings for streamed search results
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// `{"peptides":[...]}` with optional count
    Json,
    /// One JSON object per line
    NdJson,
    /// FASTA records
    Fasta,
}

impl OutputFormat {
    /// Selects the output format by the first media type of an `Accept` header.
    /// Unknown or missing media types fall back to JSON.
    ///
    /// # Arguments
    /// * `accept` - Value of the `Accept` header
    ///
    pub fn from_accept_header(accept: Option<&str>) -> Self {
        let media_type = accept
            .and_then(|accept| accept.split(',').next())
            .and_then(|media_type| media_type.split(';').next())
            .map(|media_type| media_type.trim().to_lowercase())
            .unwrap_or_default();

        match media_type.as_str() {
            "application/x-ndjson" | "application/octet-stream" => OutputFormat::NdJson,
            "text/plain" => OutputFormat::Fasta,
            _ => OutputFormat::Json,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json; charset=utf-8",
            OutputFormat::NdJson => "application/x-ndjson; charset=utf-8",
            OutputFormat::Fasta => "text/plain; charset=utf-8",
        }
    }

    /// FASTA output is not ordered
    ///
    pub fn supports_ordering(&self) -> bool {
        !matches!(self, OutputFormat::Fasta)
    }

    /// Only the JSON document has a place for the total count
    ///
    pub fn supports_count(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::NdJson => write!(f, "NDJSON"),
            OutputFormat::Fasta => write!(f, "FASTA"),
        }
    }
}

/// JSON representation of a peptide row
///
#[derive(Serialize)]
struct SerializablePeptide<'a> {
    #[serde(serialize_with = "serialize_mass_to_float")]
    mass: i64,
    sequence: &'a str,
    is_swiss_prot: bool,
    is_trembl: bool,
    taxonomy_ids: &'a [i64],
    unique_taxonomy_ids: &'a [i64],
    proteome_ids: &'a [String],
}

impl<'a> From<&'a PeptideRow> for SerializablePeptide<'a> {
    fn from(row: &'a PeptideRow) -> Self {
        Self {
            mass: row.get_mass(),
            sequence: row.get_sequence(),
            is_swiss_prot: row.get_is_swiss_prot(),
            is_trembl: row.get_is_trembl(),
            taxonomy_ids: row.get_taxonomy_ids(),
            unique_taxonomy_ids: row.get_unique_taxonomy_ids(),
            proteome_ids: row.get_proteome_ids(),
        }
    }
}

/// Writes peptide rows in the given format into a buffer.
/// Call order: `begin`, `write_row` for each row, `end`.
///
pub struct OutputWriter {
    format: OutputFormat,
    has_rows: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            has_rows: false,
        }
    }

    pub fn get_format(&self) -> OutputFormat {
        self.format
    }

    /// Writes the document prefix
    ///
    pub fn begin(&mut self, buffer: &mut Vec<u8>) {
        if self.format == OutputFormat::Json {
            buffer.extend_from_slice(b"{\"peptides\":[");
        }
    }

    /// Writes a single row
    ///
    pub fn write_row(&mut self, row: &PeptideRow, buffer: &mut Vec<u8>) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.has_rows {
                    buffer.push(b',');
                }
                serde_json::to_writer(&mut *buffer, &SerializablePeptide::from(row))?;
            }
            OutputFormat::NdJson => {
                serde_json::to_writer(&mut *buffer, &SerializablePeptide::from(row))?;
                buffer.push(b'\n');
            }
            OutputFormat::Fasta => {
                writeln!(buffer, ">lcl|{}_{}", row.get_mass(), row.get_sequence())?;
                for line in row
                    .get_sequence()
                    .as_bytes()
                    .chunks(FASTA_SEQUENCE_LINE_LENGTH)
                {
                    buffer.extend_from_slice(line);
                    buffer.push(b'\n');
                }
            }
        }
        self.has_rows = true;
        Ok(())
    }

    /// Writes the document suffix
    ///
    /// # Arguments
    /// * `count` - Total number of matching peptides, only written for JSON
    /// * `buffer` - Output buffer
    ///
    pub fn end(&mut self, count: Option<u64>, buffer: &mut Vec<u8>) {
        if self.format != OutputFormat::Json {
            return;
        }
        match count {
            Some(count) => {
                buffer.extend_from_slice(format!("],\"count\":{}}}", count).as_bytes());
            }
            None => buffer.extend_from_slice(b"]}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(sequence: &str) -> PeptideRow {
        PeptideRow::new(
            859495068024,
            sequence.to_string(),
            0,
            sequence.len() as i16,
            true,
            false,
            vec![9606, 10090],
            vec![9606],
            vec!["UP000005640".to_string()],
        )
    }

    fn write(format: OutputFormat, rows: &[PeptideRow], count: Option<u64>) -> String {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(format);
        writer.begin(&mut buffer);
        for row in rows {
            writer.write_row(row, &mut buffer).unwrap();
        }
        writer.end(count, &mut buffer);
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_from_accept_header() {
        assert_eq!(OutputFormat::from_accept_header(None), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_accept_header(Some("text/plain, application/json")),
            OutputFormat::Fasta
        );
        assert_eq!(
            OutputFormat::from_accept_header(Some("application/x-ndjson")),
            OutputFormat::NdJson
        );
        assert_eq!(
            OutputFormat::from_accept_header(Some("application/octet-stream;q=0.9")),
            OutputFormat::NdJson
        );
        assert_eq!(
            OutputFormat::from_accept_header(Some("application/json, text/plain")),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::from_accept_header(Some("*/*")),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_json() {
        let expected_row = r#"{"mass":859.495068024,"sequence":"MFCQLAK","is_swiss_prot":true,"is_trembl":false,"taxonomy_ids":[9606,10090],"unique_taxonomy_ids":[9606],"proteome_ids":["UP000005640"]}"#;
        assert_eq!(
            write(OutputFormat::Json, &[row("MFCQLAK"), row("MFCQLAK")], None),
            format!("{{\"peptides\":[{expected_row},{expected_row}]}}")
        );
        assert_eq!(
            write(OutputFormat::Json, &[], Some(0)),
            r#"{"peptides":[],"count":0}"#
        );

        let document: serde_json::Value =
            serde_json::from_str(&write(OutputFormat::Json, &[row("MFCQLAK")], Some(10)))
                .unwrap();
        assert_eq!(document["count"], 10);
        assert_eq!(document["peptides"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_ndjson() {
        let output = write(
            OutputFormat::NdJson,
            &[row("MFCQLAK"), row("PEPTIDER")],
            Some(2),
        );
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(output.ends_with('\n'));
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["sequence"], "PEPTIDER");
        assert!(!output.contains("count"));
    }

    #[test]
    fn test_fasta() {
        let sequence = "A".repeat(130);
        let output = write(OutputFormat::Fasta, &[row(&sequence)], None);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!(">lcl|859495068024_{}", sequence));
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 60);
        assert_eq!(lines[3].len(), 10);

        let output = write(OutputFormat::Fasta, &[row("MFCQLAK"), row("PEPTIDER")], None);
        assert_eq!(
            output,
            ">lcl|859495068024_MFCQLAK\nMFCQLAK\n>lcl|859495068024_PEPTIDER\nPEPTIDER\n"
        );
    }
}
