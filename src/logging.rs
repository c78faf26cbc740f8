use chrono::Local;
use env_logger::{Builder, Target};
use log::{LevelFilter, Record};
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::str::FromStr;

use crate::config::LoggingConfig;

/// Writes every line to stdout and, when present, appends it to a log file.
struct TeeWriter {
    file: Option<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level).unwrap_or(LevelFilter::Info)
}

/// One JSON object per record. Every field goes through the serializer.
fn log_line(record: &Record, timestamp: &str) -> Value {
    json!({
        "timestamp": timestamp,
        "level": record.level().as_str().to_ascii_lowercase(),
        "message": record.args().to_string(),
        "target": record.target(),
    })
}

pub fn init_logger(config: &LoggingConfig) {
    let (file, file_error) = if config.file.is_empty() {
        (None, None)
    } else {
        match OpenOptions::new().create(true).append(true).open(&config.file) {
            Ok(f) => (Some(f), None),
            Err(e) => (None, Some(e)),
        }
    };

    Builder::new()
        .filter_level(parse_level(&config.level))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string();
            writeln!(buf, "{}", log_line(record, &ts))
        })
        .target(Target::Pipe(Box::new(TeeWriter { file })))
        .init();

    if let Some(e) = file_error {
        log::warn!(
            "failed to open log file {}: {e}; logging to stdout only",
            config.file
        );
    }
}
