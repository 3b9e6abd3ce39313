use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone)]
enum LogLevel {
    Info(Color),
    Warn,
    Error,
}

impl LogLevel {
    fn label(&self) -> &'static str {
        match self {
            LogLevel::Info(_) => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn ansi_code(&self) -> &'static str {
        match self {
            LogLevel::Info(color) => color.to_ansi_code(),
            LogLevel::Warn => "\x1b[93m",
            LogLevel::Error => "\x1b[91m",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    White,
}

impl Color {
    fn to_ansi_code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Blue => "\x1b[34m",
            Color::Yellow => "\x1b[33m",
            Color::Cyan => "\x1b[36m",
            Color::Magenta => "\x1b[35m",
            Color::White => "\x1b[37m",
        }
    }
}

/// Appends timestamped lines to `routes_<tag>.log` inside a log directory.
#[derive(Debug, Clone)]
pub struct Logger {
    log_file: PathBuf,
}

impl Logger {
    /// Creates a new `Logger` instance.
    ///
    /// # Parameters
    /// - `log_dir`: Directory for the log file. Created if it does not exist.
    /// - `tag`: Session tag included in the file name, typically the store
    ///   address. Characters that are awkward in file names are replaced.
    ///
    /// The log file is truncated, so every session starts with an empty log.
    pub fn new(log_dir: &Path, tag: &str) -> Result<Self, LoggerError> {
        if log_dir.exists() && !log_dir.is_dir() {
            return Err(LoggerError::InvalidPath(format!(
                "{} is not a directory",
                log_dir.display()
            )));
        }
        std::fs::create_dir_all(log_dir)?;

        let sanitized_tag = tag.replace([':', '/', '\\', ' '], "_");
        let log_file = log_dir.join(format!("routes_{}.log", sanitized_tag));

        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&log_file)?;

        Ok(Logger { log_file })
    }

    pub fn path(&self) -> &Path {
        &self.log_file
    }

    fn log(&self, level: LogLevel, message: &str, to_console: bool) -> Result<(), LoggerError> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let log_message = format!("[{}] [{}]: {}\n", level.label(), timestamp, message);

        if to_console {
            print!("{}{}\x1b[0m", level.ansi_code(), log_message);
            io::stdout().flush()?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        file.write_all(log_message.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Logs an informational message.
    ///
    /// # Parameters
    /// - `message`: The informational message to log.
    /// - `color`: The color to use for the console output.
    /// - `to_console`: Whether to log the message to the console as well.
    pub fn info(&self, message: &str, color: Color, to_console: bool) -> Result<(), LoggerError> {
        self.log(LogLevel::Info(color), message, to_console)
    }

    /// Logs a warning message.
    pub fn warn(&self, message: &str, to_console: bool) -> Result<(), LoggerError> {
        self.log(LogLevel::Warn, message, to_console)
    }

    /// Logs an error message.
    pub fn error(&self, message: &str, to_console: bool) -> Result<(), LoggerError> {
        self.log(LogLevel::Error, message, to_console)
    }
}

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("I/O Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid Path: {0}")]
    InvalidPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("routes_logger_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_logger_creation_and_logging() {
        let log_dir = scratch_dir("levels");
        let logger = Logger::new(&log_dir, "127.0.0.1:6379").expect("Failed to create logger");

        logger
            .info("distance FV777", Color::Green, false)
            .expect("Failed to log message");
        logger.warn("slow store", false).expect("Failed to log");
        logger.error("flight X not found", false).expect("Failed to log");

        let log_file_path = log_dir.join("routes_127.0.0.1_6379.log");
        assert_eq!(logger.path(), log_file_path.as_path());

        let log_contents = fs::read_to_string(&log_file_path).expect("Failed to read log file");
        let lines: Vec<&str> = log_contents.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[INFO]") && lines[0].ends_with("distance FV777"));
        assert!(lines[1].starts_with("[WARN]"));
        assert!(lines[2].starts_with("[ERROR]"));

        fs::remove_dir_all(&log_dir).expect("Failed to remove test directory");
    }

    #[test]
    fn test_missing_directory_is_created() {
        let log_dir = scratch_dir("nested").join("a").join("b");

        let logger = Logger::new(&log_dir, "session");

        assert!(logger.is_ok());
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_new_session_truncates_previous_log() {
        let log_dir = scratch_dir("truncate");
        let first = Logger::new(&log_dir, "s").unwrap();
        first.info("old line", Color::White, false).unwrap();

        let second = Logger::new(&log_dir, "s").unwrap();

        assert_eq!(fs::read_to_string(second.path()).unwrap(), "");
    }

    #[test]
    fn test_file_as_directory_is_invalid() {
        let log_dir = scratch_dir("file");
        fs::create_dir_all(&log_dir).unwrap();
        let file_path = log_dir.join("not_a_dir");
        fs::write(&file_path, "x").unwrap();

        let result = Logger::new(&file_path, "s");

        assert!(matches!(result, Err(LoggerError::InvalidPath(_))));
    }
}
