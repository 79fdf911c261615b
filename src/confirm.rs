use std::cell::{OnceCell, RefCell};
use std::io::{self, BufRead, Write};

use tracing::debug;

pub const OVERWRITE_CAUTION: &str = "This will recreate keys used for JWT token creation which will invalidate all issued JWT tokens.";
pub const OVERWRITE_QUESTION: &str = "Are you sure you want to do this?";

/// Strategy deciding whether existing keys can be replaced.
pub trait Confirm {
    /// Returns `true` only on an explicit agreement.
    fn confirm(&self) -> bool;
}

// Accept closures as Confirm implementations
impl<F> Confirm for F
where
    F: Fn() -> bool,
{
    fn confirm(&self) -> bool {
        self()
    }
}

/// Always agrees, for non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self) -> bool {
        true
    }
}

/// Always declines, for non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self) -> bool {
        false
    }
}

/// Asks the wrapped strategy the first time only and repeats that answer afterwards, so a run
/// that needs the decision in several places asks the operator once.
pub struct AskOnce<C: Confirm> {
    inner: C,
    answer: OnceCell<bool>,
}

impl<C: Confirm> AskOnce<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            answer: OnceCell::new(),
        }
    }
}

impl<C: Confirm> Confirm for AskOnce<C> {
    fn confirm(&self) -> bool {
        *self.answer.get_or_init(|| self.inner.confirm())
    }
}

/// Whether an operator answer is an agreement: `y` or `yes`, case-insensitive, surrounding
/// whitespace ignored. Every other answer declines.
pub fn is_affirmative(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks the operator through a line-based console.
pub struct ConsolePrompt<R: BufRead, W: Write> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt reading from the process standard input and writing to standard error, so that
    /// standard output only carries the command report.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input.into_inner(), self.output.into_inner())
    }

    fn ask(&self) -> io::Result<String> {
        let mut output = self.output.borrow_mut();
        writeln!(output)?;
        writeln!(output, " [CAUTION] {OVERWRITE_CAUTION}")?;
        writeln!(output)?;
        write!(output, " {OVERWRITE_QUESTION}: ")?;
        output.flush()?;

        let mut response = String::new();
        self.input.borrow_mut().read_line(&mut response)?;
        Ok(response)
    }
}

impl<R: BufRead, W: Write> Confirm for ConsolePrompt<R, W> {
    fn confirm(&self) -> bool {
        match self.ask() {
            Ok(response) => is_affirmative(&response),
            Err(e) => {
                debug!("unable to read the confirmation answer: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("y")]
    #[case("Y")]
    #[case("yes")]
    #[case("YES")]
    #[case("Yes")]
    #[case(" yes \n")]
    fn affirmative_answers(#[case] response: &str) {
        assert!(is_affirmative(response));
    }

    #[rstest]
    #[case("")]
    #[case("\n")]
    #[case("no")]
    #[case("n")]
    #[case("maybe")]
    #[case("yes please")]
    #[case("ye")]
    #[case("sí")]
    #[case("ja")]
    #[case("oui")]
    fn declining_answers(#[case] response: &str) {
        assert!(!is_affirmative(response));
    }

    #[test]
    fn console_prompt_shows_caution_and_reads_answer() {
        let prompt = ConsolePrompt::new(Cursor::new("yes\n"), Vec::new());

        assert!(prompt.confirm());

        let (_, output) = prompt.into_inner();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains(OVERWRITE_CAUTION));
        assert!(output.ends_with(&format!(" {OVERWRITE_QUESTION}: ")));
    }

    #[test]
    fn console_prompt_declines_on_eof() {
        let prompt = ConsolePrompt::new(Cursor::new(""), Vec::new());
        assert!(!prompt.confirm());
    }

    #[test]
    fn console_prompt_reads_one_line_per_question() {
        let prompt = ConsolePrompt::new(Cursor::new("n\ny\n"), Vec::new());
        assert!(!prompt.confirm());
        assert!(prompt.confirm());
    }

    #[test]
    fn console_prompt_declines_when_output_fails() {
        struct BrokenPipe;
        impl Write for BrokenPipe {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let prompt = ConsolePrompt::new(Cursor::new("yes\n"), BrokenPipe);
        assert!(!prompt.confirm());
    }

    #[test]
    fn ask_once_repeats_the_first_answer() {
        let prompt = AskOnce::new(ConsolePrompt::new(Cursor::new("y\nn\n"), Vec::new()));

        assert!(prompt.confirm());
        assert!(prompt.confirm());

        let (input, output) = prompt.inner.into_inner();
        assert_eq!(input.position(), 2);
        assert_eq!(
            String::from_utf8(output).unwrap().matches(OVERWRITE_QUESTION).count(),
            1
        );
    }

    #[test]
    fn fixed_strategies() {
        assert!(AssumeYes.confirm());
        assert!(!AssumeNo.confirm());
        assert!((|| true).confirm());
    }
}
