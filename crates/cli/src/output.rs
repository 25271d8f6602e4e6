//! CLI output formatting module

use crate::config::OutputFormat;
use feedcache_core::Result;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};

/// Output formatter for CLI results
pub struct OutputFormatter {
    format: OutputFormat,
    use_colors: bool,
    writer: Box<dyn Write + Send>,
}

impl OutputFormatter {
    /// Create a formatter writing to stdout
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            use_colors: crate::config::supports_color(),
            writer: Box::new(io::stdout()),
        }
    }

    /// Create a formatter with custom writer and no colors
    pub fn with_writer<W: Write + Send + 'static>(format: OutputFormat, writer: W) -> Self {
        Self {
            format,
            use_colors: false,
            writer: Box::new(writer),
        }
    }

    /// Format and output a serializable value
    pub fn output<T: Serialize>(&mut self, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(value)?;
                writeln!(self.writer, "{}", json)?;
            }
            OutputFormat::Yaml => {
                let yaml = serde_yaml::to_string(value)?;
                write!(self.writer, "{}", yaml)?;
            }
            OutputFormat::Compact => {
                let json = serde_json::to_string(value)?;
                writeln!(self.writer, "{}", json)?;
            }
            OutputFormat::Pretty => {
                let value = serde_json::to_value(value)?;
                self.write_pretty(&value, 0)?;
            }
        }
        Ok(())
    }

    /// Human-readable rendering; multi-line strings keep their line breaks
    fn write_pretty(&mut self, value: &Value, indent: usize) -> Result<()> {
        let pad = "  ".repeat(indent);

        match value {
            Value::Object(map) => {
                for (key, val) in map {
                    let key = self.paint(key, "34");
                    match val {
                        Value::Object(_) | Value::Array(_) => {
                            writeln!(self.writer, "{}{}:", pad, key)?;
                            self.write_pretty(val, indent + 1)?;
                        }
                        Value::String(s) if s.contains('\n') => {
                            writeln!(self.writer, "{}{}:", pad, key)?;
                            for line in s.lines() {
                                writeln!(self.writer, "{}  {}", pad, line)?;
                            }
                        }
                        _ => writeln!(self.writer, "{}{}: {}", pad, key, self.scalar(val))?,
                    }
                }
            }
            Value::Array(items) if items.is_empty() => {
                writeln!(self.writer, "{}(none)", pad)?;
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    writeln!(self.writer, "{}[{}]", pad, i)?;
                    self.write_pretty(item, indent + 1)?;
                }
            }
            _ => writeln!(self.writer, "{}{}", pad, self.scalar(value))?,
        }
        Ok(())
    }

    fn scalar(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => self.paint(&n.to_string(), "36"),
            Value::Bool(b) => self.paint(&b.to_string(), "35"),
            Value::Null => self.paint("null", "90"),
            Value::Array(items) => format!("[{} items]", items.len()),
            Value::Object(map) => format!("{{{} keys}}", map.len()),
        }
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// Output a success message
    pub fn success(&mut self, msg: &str) -> Result<()> {
        let mark = self.paint("✓", "32");
        writeln!(self.writer, "{} {}", mark, msg)?;
        Ok(())
    }

    /// Output a warning message
    pub fn warning(&mut self, msg: &str) -> Result<()> {
        let mark = self.paint("⚠", "33");
        writeln!(self.writer, "{} {}", mark, msg)?;
        Ok(())
    }
}
