//! Interactive overwrite confirmation.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::conf::C_TOKEN_AFFIRMATIVE;

/// Decide whether an existing destination may be destroyed.
pub trait ConfirmOverwrite {
    /// `Ok(true)` only on an explicit "yes" for `path_dir_dst`.
    fn confirm_overwrite(&mut self, path_dir_dst: &Path) -> io::Result<bool>;
}

/// Fixed answer, for non-interactive callers.
impl ConfirmOverwrite for bool {
    fn confirm_overwrite(&mut self, _path_dir_dst: &Path) -> io::Result<bool> {
        Ok(*self)
    }
}

/// Line-based yes/no prompt over any reader/writer pair.
#[derive(Debug)]
pub struct ConsolePrompt<R, W> {
    reader: R,
    writer: W,
    token_affirmative: String,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            token_affirmative: C_TOKEN_AFFIRMATIVE.to_string(),
        }
    }

    /// Replace the accepted "yes" token (compared case-insensitively).
    pub fn with_token_affirmative(mut self, token: &str) -> Self {
        self.token_affirmative = token.to_string();
        self
    }
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt bound to the process stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConfirmOverwrite for ConsolePrompt<R, W> {
    fn confirm_overwrite(&mut self, path_dir_dst: &Path) -> io::Result<bool> {
        write!(
            self.writer,
            "The folder '{}' already exists. Overwrite it? ({}/N): ",
            path_dir_dst.display(),
            self.token_affirmative
        )?;
        self.writer.flush()?;

        let mut c_answer = String::new();
        let n_read = self.reader.read_line(&mut c_answer)?;
        if n_read == 0 {
            return Ok(false);
        }
        Ok(is_affirmative(&c_answer, &self.token_affirmative))
    }
}

/// Case-insensitive comparison of a trimmed answer against `token`.
pub fn is_affirmative(answer: &str, token: &str) -> bool {
    answer.trim().to_lowercase() == token.to_lowercase()
}
