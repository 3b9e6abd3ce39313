use std::io::{self, BufRead, Write};

use logger::{Color, Logger};

use crate::{
    commands::{CommandError, Reply, ShellCommand},
    types::{emulation::TrafficEmulation, store::FlightStore},
};

pub const PROMPT: &str = "ri-cli>>> ";

/// Interactive session over one emulation. Every command and every error is
/// written to the session log when there is one.
pub struct Shell<S: FlightStore> {
    emulation: TrafficEmulation<S>,
    logger: Option<Logger>,
}

impl<S: FlightStore> Shell<S> {
    pub fn new(emulation: TrafficEmulation<S>, logger: Option<Logger>) -> Self {
        Shell { emulation, logger }
    }

    /// Reads commands until `quit` or end of input. Failed commands are
    /// reported and the session goes on.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        writeln!(output, "Start interactive session...")?;

        let mut lines = input.lines();
        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => {
                    writeln!(output)?;
                    break;
                }
            };

            match self.handle_line(&line) {
                Ok(None) => {}
                Ok(Some(reply)) => {
                    for warning in reply.warnings() {
                        self.log_warn(&warning);
                        writeln!(output, "{}", warning)?;
                    }
                    match reply.render(true) {
                        Ok(text) => writeln!(output, "{}", text)?,
                        Err(e) => self.report(&mut output, &e)?,
                    }
                    if matches!(reply, Reply::Quit) {
                        break;
                    }
                }
                Err(e) => self.report(&mut output, &e)?,
            }
        }

        self.log_info("session closed", Color::Blue);
        Ok(())
    }

    /// Parses and runs one line. A blank line yields `Ok(None)`.
    pub fn handle_line(&mut self, line: &str) -> Result<Option<Reply>, CommandError> {
        let command = match ShellCommand::parse(line)? {
            Some(command) => command,
            None => return Ok(None),
        };
        self.log_info(&command.describe(), Color::Cyan);

        command.execute(&mut self.emulation).map(Some)
    }

    fn report(&self, output: &mut impl Write, error: &CommandError) -> io::Result<()> {
        if let Some(logger) = &self.logger {
            let kind = match error {
                CommandError::Flight { source, .. } | CommandError::Route(source) => source.kind(),
                _ => "command",
            };
            let _ = logger.error(&format!("{} ({})", error, kind), false);
        }
        writeln!(output, "Error: {}", error)
    }

    fn log_info(&self, message: &str, color: Color) {
        if let Some(logger) = &self.logger {
            let _ = logger.info(message, color, false);
        }
    }

    fn log_warn(&self, message: &str) {
        if let Some(logger) = &self.logger {
            let _ = logger.warn(message, false);
        }
    }
}
