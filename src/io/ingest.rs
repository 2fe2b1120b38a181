//! Input parsing.
//!
//! This module turns textual input into `ConcentrationPoint`s:
//!
//! - form-style slots (a concentration field and a comma-separated responses
//!   field per concentration, plus a declared replicate count)
//! - plate CSV files: one row per concentration, `concentration,r1,r2,...`
//!
//! Design goals:
//! - **Reject, never coerce**: non-numeric text, non-positive concentrations and
//!   replicate-count mismatches are errors, reported before any fitting
//! - **Line-accurate messages** for CSV rows
//! - **Separation of concerns**: no statistics or fitting here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::domain::ConcentrationPoint;
use crate::error::{AppError, Ic50Error};

/// One form slot as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct FormSlot {
    pub concentration: String,
    pub responses: String,
}

impl FormSlot {
    pub fn new(concentration: impl Into<String>, responses: impl Into<String>) -> Self {
        Self {
            concentration: concentration.into(),
            responses: responses.into(),
        }
    }
}

/// Parse a replicate-count field (positive integer).
pub fn parse_replicate_count(text: &str) -> Result<usize, Ic50Error> {
    let n: usize = text
        .trim()
        .parse()
        .map_err(|_| Ic50Error::invalid(format!("Replicate count '{}' is not a whole number.", text.trim())))?;
    if n == 0 {
        return Err(Ic50Error::invalid("Replicate count must be > 0."));
    }
    Ok(n)
}

/// Parse a single slot: a positive concentration and exactly `num_replicates` responses.
pub fn parse_slot(concentration: &str, responses: &str, num_replicates: usize) -> Result<ConcentrationPoint, Ic50Error> {
    let conc = parse_concentration(concentration)?;
    let values = responses
        .split(',')
        .map(parse_response)
        .collect::<Result<Vec<f64>, Ic50Error>>()?;
    check_replicates(conc, values.len(), num_replicates)?;
    Ok(ConcentrationPoint::new(conc, values))
}

/// Parse every slot of a form.
pub fn parse_form(num_replicates: usize, slots: &[FormSlot]) -> Result<Vec<ConcentrationPoint>, Ic50Error> {
    if num_replicates == 0 {
        return Err(Ic50Error::invalid("Replicate count must be > 0."));
    }
    if slots.is_empty() {
        return Err(Ic50Error::invalid("No concentrations supplied."));
    }
    slots
        .iter()
        .map(|s| parse_slot(&s.concentration, &s.responses, num_replicates))
        .collect()
}

/// Load a plate CSV file.
pub fn load_plate_csv(path: &Path, num_replicates: usize) -> Result<Vec<ConcentrationPoint>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open plate CSV '{}': {e}", path.display())))?;
    read_plate(file, num_replicates)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))
}

/// Read plate rows from any reader.
///
/// Lines starting with `#` are comments. A first row whose leading field is
/// not numeric is treated as a header and skipped.
pub fn read_plate<R: Read>(reader: R, num_replicates: usize) -> Result<Vec<ConcentrationPoint>, Ic50Error> {
    if num_replicates == 0 {
        return Err(Ic50Error::invalid("Replicate count must be > 0."));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| Ic50Error::invalid(format!("Malformed CSV: {e}")))?;
        let line = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);

        if is_blank(&record) {
            continue;
        }
        if idx == 0 && is_header(&record) {
            continue;
        }

        let point = parse_record(&record, num_replicates)
            .map_err(|e| Ic50Error::invalid(format!("line {line}: {}", strip_prefix(&e))))?;
        points.push(point);
    }

    if points.is_empty() {
        return Err(Ic50Error::invalid("Plate contains no concentration rows."));
    }
    Ok(points)
}

fn parse_record(record: &StringRecord, num_replicates: usize) -> Result<ConcentrationPoint, Ic50Error> {
    let mut fields = record.iter();
    let conc = parse_concentration(fields.next().unwrap_or(""))?;
    let values = fields.map(parse_response).collect::<Result<Vec<f64>, Ic50Error>>()?;
    check_replicates(conc, values.len(), num_replicates)?;
    Ok(ConcentrationPoint::new(conc, values))
}

fn parse_concentration(text: &str) -> Result<f64, Ic50Error> {
    let t = text.trim();
    let v: f64 = t
        .parse()
        .map_err(|_| Ic50Error::invalid(format!("Concentration '{t}' is not a number.")))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(Ic50Error::invalid(format!("Concentration must be > 0, got {t}.")));
    }
    Ok(v)
}

fn parse_response(text: &str) -> Result<f64, Ic50Error> {
    let t = text.trim();
    let v: f64 = t
        .parse()
        .map_err(|_| Ic50Error::invalid(format!("Response '{t}' is not a number.")))?;
    if !v.is_finite() {
        return Err(Ic50Error::invalid(format!("Response '{t}' is not finite.")));
    }
    Ok(v)
}

fn check_replicates(conc: f64, got: usize, expected: usize) -> Result<(), Ic50Error> {
    if got != expected {
        return Err(Ic50Error::invalid(format!(
            "Concentration {conc} has {got} response(s), expected {expected}."
        )));
    }
    Ok(())
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.is_empty())
}

fn is_header(record: &StringRecord) -> bool {
    record.get(0).is_some_and(|f| f.parse::<f64>().is_err())
}

fn strip_prefix(err: &Ic50Error) -> String {
    match err {
        Ic50Error::InvalidInput(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_slot_accepts_spaced_lists() {
        let p = parse_slot(" 0.01 ", "95, 98 ,97", 3).unwrap();
        assert_eq!(p, ConcentrationPoint::new(0.01, vec![95.0, 98.0, 97.0]));
    }

    #[test]
    fn parse_slot_rejects_wrong_count_and_bad_text() {
        assert!(matches!(parse_slot("0.1", "95,98", 3), Err(Ic50Error::InvalidInput(_))));
        assert!(matches!(parse_slot("abc", "95,98,97", 3), Err(Ic50Error::InvalidInput(_))));
        assert!(matches!(parse_slot("0.1", "95,x,97", 3), Err(Ic50Error::InvalidInput(_))));
        assert!(matches!(parse_slot("0", "95,96,97", 3), Err(Ic50Error::InvalidInput(_))));
        assert!(matches!(parse_slot("-2", "95,96,97", 3), Err(Ic50Error::InvalidInput(_))));
    }

    #[test]
    fn parse_form_requires_slots_and_replicates() {
        assert!(parse_form(3, &[]).is_err());
        assert!(parse_form(0, &[FormSlot::new("1", "1")]).is_err());

        let slots = [FormSlot::new("0.1", "90,91"), FormSlot::new("1", "50,52")];
        let points = parse_form(2, &slots).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].responses, vec![50.0, 52.0]);
    }

    #[test]
    fn replicate_count_must_be_positive_integer() {
        assert_eq!(parse_replicate_count(" 3 ").unwrap(), 3);
        assert!(parse_replicate_count("0").is_err());
        assert!(parse_replicate_count("2.5").is_err());
        assert!(parse_replicate_count("three").is_err());
    }

    #[test]
    fn read_plate_skips_header_and_comments() {
        let text = "concentration,r1,r2\n# vehicle control omitted\n0.01,95,97\n0.1, 90 , 88\n";
        let points = read_plate(text.as_bytes(), 2).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], ConcentrationPoint::new(0.1, vec![90.0, 88.0]));
    }

    #[test]
    fn read_plate_reports_line_of_mismatched_row() {
        let text = "0.01,95,97\n0.1,90\n";
        let err = read_plate(text.as_bytes(), 2).unwrap_err();
        match err {
            Ic50Error::InvalidInput(msg) => assert!(msg.starts_with("line 2:"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_plate_rejects_empty_input() {
        assert!(read_plate("# nothing\n".as_bytes(), 3).is_err());
    }
}
