//! Interactive prompts for CLI user input.

use std::io::{BufRead, Write};

use loom_core::{Decide, Decision, Prompt, PromptError};

const CHOICES: &str = "[Y]es/[N]o/[S]kip [Yes]";
const INVALID_INPUT: &str =
    "Invalid input. Please enter 'yes', 'no', 'skip', or press Enter for 'yes'.";

/// Asks ownership questions on a terminal.
///
/// Empty input means yes. Unrecognized input repeats the question; end of
/// input fails the prompt.
pub struct StdinDecider<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StdinDecider<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &Prompt) -> Result<Decision, PromptError> {
        writeln!(self.output, "{}", prompt.context())?;
        loop {
            write!(self.output, "{} {CHOICES}: ", prompt.question())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Err(PromptError::Eof);
            }

            match Decision::parse(&line) {
                Some(decision) => return Ok(decision),
                None => writeln!(self.output, "{INVALID_INPUT}")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Decide for StdinDecider<R, W> {
    fn decide(&mut self, prompt: &Prompt) -> Result<Decision, PromptError> {
        let decision = self.ask(prompt)?;
        tracing::debug!(path = %prompt.path, ?decision, "ownership answer");
        Ok(decision)
    }
}
