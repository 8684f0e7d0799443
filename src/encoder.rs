//! Dataset encoding
//!
//! Serializes the averages table as CSV, JSON or NDJSON and the sequence
//! dataset as JSON or NDJSON. Missing averages (NaN) are written as an empty
//! CSV cell and as `null` in JSON.

use crate::error::DaylineError;
use crate::types::{AveragesRow, DaySequence};
use serde::Serialize;
use std::io::Write;

/// Column header of the averages table
pub const AVERAGES_HEADER: [&str; 9] = [
    "user_id",
    "avg_step",
    "avg_sleep",
    "avg_drink",
    "avg_eat",
    "avg_care",
    "depression_class",
    "depression_score",
    "window_start",
];

/// Write the averages table as CSV with a header row
pub fn averages_to_csv<W: Write>(rows: &[AveragesRow], writer: W) -> Result<(), DaylineError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(AVERAGES_HEADER)?;

    for row in rows {
        wtr.write_record([
            row.user_id.clone(),
            format_float(row.avg_step),
            format_float(row.avg_sleep),
            format_float(row.avg_drink),
            format_float(row.avg_eat),
            format_float(row.avg_care),
            row.depression_class.clone(),
            format_float(row.depression_score),
            row.window_start.format("%Y-%m-%d").to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Encode the averages table as a JSON array of objects
pub fn averages_to_json(rows: &[AveragesRow], pretty: bool) -> Result<String, DaylineError> {
    to_json(rows, pretty)
}

/// Encode the sequence dataset as a JSON array of flat arrays
pub fn sequences_to_json(sequences: &[DaySequence], pretty: bool) -> Result<String, DaylineError> {
    to_json(sequences, pretty)
}

/// Encode items one JSON document per line
pub fn to_ndjson<T: Serialize>(items: &[T]) -> Result<String, DaylineError> {
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    Ok(out)
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, DaylineError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

// Shortest round-trip form, always with a decimal point; NaN is an empty cell.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:?}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn row(avg_drink: f64) -> AveragesRow {
        AveragesRow {
            user_id: "7".to_string(),
            avg_step: 5000.0,
            avg_sleep: 7.25,
            avg_drink,
            avg_eat: 1.0,
            avg_care: 2.0,
            depression_class: "1".to_string(),
            depression_score: 12.0,
            window_start: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
        }
    }

    #[test]
    fn test_averages_csv_layout() {
        let mut buf = Vec::new();
        averages_to_csv(&[row(3.0), row(f64::NAN)], &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "user_id,avg_step,avg_sleep,avg_drink,avg_eat,avg_care,depression_class,depression_score,window_start",
                "7,5000.0,7.25,3.0,1.0,2.0,1,12.0,2023-03-01",
                "7,5000.0,7.25,,1.0,2.0,1,12.0,2023-03-01",
            ]
        );
    }

    #[test]
    fn test_nan_becomes_null_in_json() {
        let json = averages_to_json(&[row(f64::NAN)], false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(parsed[0]["avg_drink"].is_null());
        assert_eq!(parsed[0]["avg_step"], 5000.0);
        assert_eq!(parsed[0]["window_start"], "2023-03-01");
    }

    #[test]
    fn test_sequences_json_is_flat_arrays() {
        let sequences = vec![
            DaySequence {
                sleep_hours: 8.0,
                activities: vec!["Drink".to_string(), "Eat".to_string()],
            },
            DaySequence {
                sleep_hours: 6.5,
                activities: Vec::new(),
            },
        ];

        let json = sequences_to_json(&sequences, false).unwrap();
        assert_eq!(json, r#"[[8.0,"Drink","Eat"],[6.5]]"#);
    }

    #[test]
    fn test_ndjson_one_document_per_line() {
        let out = to_ndjson(&[row(1.0), row(2.0)]).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["user_id"], "7");
        }
        assert!(to_ndjson::<AveragesRow>(&[]).unwrap().is_empty());
    }
}
