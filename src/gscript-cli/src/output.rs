//! Rendering of records and values
//!
//! Every record is written as one JSON document per line, or as indented
//! JSON when pretty output is requested.

use std::io::Write;

use serde::Serialize;

use gscript_core::{Records, StatusRecord};
use gscript_shared::Value;

use crate::error::Result;

/// JSON writer for command output
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pretty: bool,
}

impl Output {
    /// Create a writer; `pretty` selects indented JSON
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Write one serializable item followed by a newline
    pub fn write_json<W: Write, T: Serialize>(&self, out: &mut W, item: &T) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, item)?;
        } else {
            serde_json::to_writer(&mut *out, item)?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Write a status record
    pub fn write_status<W: Write>(&self, out: &mut W, status: &StatusRecord) -> Result<()> {
        self.write_json(out, status)
    }

    /// Drain `records`, writing each as it is pulled
    ///
    /// Stops at the first failed record and returns its error; records
    /// already written stay written.
    pub fn write_records<W: Write>(&self, out: &mut W, records: Records) -> Result<usize> {
        let mut count = 0;
        for record in records {
            self.write_json(out, &record?)?;
            count += 1;
        }
        log::debug!("Wrote {} records", count);
        Ok(count)
    }

    /// Write a raw script value
    pub fn write_value<W: Write>(&self, out: &mut W, value: &Value) -> Result<()> {
        self.write_json(out, &value.to_json_lossy())
    }
}

/// Convert a command-line argument into a script value
///
/// Valid JSON is decoded; anything else is passed as a plain string.
pub fn parse_param(raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(json) => Value::from_json(json),
        Err(_) => Value::string(raw),
    }
}

/// Convert command-line arguments into a parameter list
///
/// No arguments means no parameter list at all.
pub fn parse_params(raw: &[String]) -> Option<Vec<Value>> {
    (!raw.is_empty()).then(|| raw.iter().map(|p| parse_param(p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("42"), Value::Int(42));
        assert_eq!(parse_param("\"bob\""), Value::string("bob"));
        assert_eq!(parse_param("bob"), Value::string("bob"));
        assert_eq!(parse_param("true"), Value::Bool(true));
        assert_eq!(
            parse_param("[1, 2]"),
            Value::array(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_parse_params_empty_is_none() {
        assert!(parse_params(&[]).is_none());
        assert_eq!(
            parse_params(&["1".to_string(), "x".to_string()]),
            Some(vec![Value::Int(1), Value::string("x")])
        );
    }

    #[test]
    fn test_write_status_compact() {
        let mut buf = Vec::new();
        Output::new(false)
            .write_status(&mut buf, &StatusRecord::new("Added Function f"))
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{\"message\":\"Added Function f\"}\n");
    }

    #[test]
    fn test_write_value_pretty() {
        let mut buf = Vec::new();
        Output::new(true)
            .write_value(&mut buf, &Value::array(vec![Value::Int(1)]))
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "[\n  1\n]\n");
    }
}
