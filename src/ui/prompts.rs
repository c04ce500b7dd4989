//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message.
//!
//! Prompts read from stdin and write to stderr, keeping stdout free for
//! results. The `*_with` variants take explicit streams.

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::core::types::MergeItem;
use crate::engine::{FailurePolicy, OnFailure};
use crate::git::GitError;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err.to_string())
    }
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String, PromptError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(PromptError::Cancelled);
    }
    Ok(line.trim().to_string())
}

/// Prompt for a yes/no answer.
///
/// An empty answer takes `default`; anything else must be yes or no, and
/// the question is repeated until it is.
pub fn confirm_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
    default: bool,
) -> Result<bool, PromptError> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        write!(output, "{} {} ", message, hint)?;
        output.flush()?;

        match read_answer(input)?.to_ascii_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer y or n.")?,
        }
    }
}

/// Prompt to select any number of options by number.
///
/// Returns zero-based indices in the order the user typed them.
pub fn select_many<T: AsRef<str>>(
    message: &str,
    options: &[T],
    interactive: bool,
) -> Result<Vec<usize>, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    select_many_with(
        &mut std::io::stdin().lock(),
        &mut std::io::stderr(),
        message,
        options,
    )
}

/// [`select_many`] over explicit streams.
///
/// Options are listed 1-based; the answer is a space or comma separated
/// list of numbers. An empty answer cancels.
pub fn select_many_with<R: BufRead, W: Write, T: AsRef<str>>(
    input: &mut R,
    output: &mut W,
    message: &str,
    options: &[T],
) -> Result<Vec<usize>, PromptError> {
    writeln!(output, "{}", message)?;
    for (i, option) in options.iter().enumerate() {
        writeln!(output, "  {:>2}) {}", i + 1, option.as_ref())?;
    }
    write!(output, "Select (e.g. 1 3 4): ")?;
    output.flush()?;

    let answer = read_answer(input)?;
    if answer.is_empty() {
        return Err(PromptError::Cancelled);
    }
    parse_selection(&answer, options.len())
}

fn parse_selection(answer: &str, len: usize) -> Result<Vec<usize>, PromptError> {
    answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
            _ => Err(PromptError::InvalidSelection(token.to_string())),
        })
        .collect()
}

/// Asks the operator whether to continue after each failed merge item.
///
/// With `ask_once`, the first answer applies to every later failure.
/// Non-interactive sessions, and prompts that cannot be answered, stop
/// the plan.
pub struct PromptPolicy {
    interactive: bool,
    ask_once: bool,
    remembered: Option<OnFailure>,
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl PromptPolicy {
    /// Prompt on the terminal.
    pub fn terminal(interactive: bool, ask_once: bool) -> Self {
        Self::with_io(
            Box::new(std::io::stdin().lock()),
            Box::new(std::io::stderr()),
            interactive,
            ask_once,
        )
    }

    pub fn with_io(
        input: Box<dyn BufRead>,
        output: Box<dyn Write>,
        interactive: bool,
        ask_once: bool,
    ) -> Self {
        Self {
            interactive,
            ask_once,
            remembered: None,
            input,
            output,
        }
    }
}

impl FailurePolicy for PromptPolicy {
    fn decide(&mut self, item: &MergeItem, error: &GitError) -> OnFailure {
        if !self.interactive {
            return OnFailure::StopOnFailure;
        }
        if let Some(decision) = self.remembered {
            return decision;
        }

        let message = format!(
            "Merging {} failed ({}). Continue with the remaining items?",
            item, error
        );
        let decision = match confirm_with(&mut self.input, &mut self.output, &message, false) {
            Ok(true) => OnFailure::ContinueOnFailure,
            Ok(false) => OnFailure::StopOnFailure,
            Err(err) => {
                tracing::warn!(error = %err, "failure prompt unanswered, stopping");
                OnFailure::StopOnFailure
            }
        };

        if self.ask_once {
            self.remembered = Some(decision);
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RefName;
    use std::io::Cursor;

    fn conflict() -> GitError {
        GitError::MergeConflict {
            refname: "a".into(),
            message: "CONFLICT".into(),
        }
    }

    fn item() -> MergeItem {
        MergeItem::branch(RefName::new("a").unwrap())
    }

    mod confirm {
        use super::*;

        #[test]
        fn answers() {
            let cases = [("y\n", true), ("YES\n", true), ("n\n", false), ("\n", true)];
            for (answer, expected) in cases {
                let mut out = Vec::new();
                let result =
                    confirm_with(&mut Cursor::new(answer), &mut out, "Go?", true).unwrap();
                assert_eq!(result, expected, "answer {:?}", answer);
            }
        }

        #[test]
        fn reprompts_on_garbage() {
            let mut out = Vec::new();
            let result =
                confirm_with(&mut Cursor::new("maybe\nn\n"), &mut out, "Go?", true).unwrap();
            assert!(!result);
            assert!(String::from_utf8(out).unwrap().contains("Please answer y or n."));
        }

        #[test]
        fn eof_cancels() {
            let mut out = Vec::new();
            let result = confirm_with(&mut Cursor::new(""), &mut out, "Go?", false);
            assert!(matches!(result, Err(PromptError::Cancelled)));
        }
    }

    mod select {
        use super::*;

        #[test]
        fn parses_mixed_separators() {
            let mut out = Vec::new();
            let picked = select_many_with(
                &mut Cursor::new("3, 1 2\n"),
                &mut out,
                "Pick",
                &["a", "b", "c"],
            )
            .unwrap();
            assert_eq!(picked, vec![2, 0, 1]);

            let listing = String::from_utf8(out).unwrap();
            assert!(listing.contains("   1) a"));
            assert!(listing.contains("   3) c"));
        }

        #[test]
        fn out_of_range_rejected() {
            assert!(matches!(
                parse_selection("0", 2),
                Err(PromptError::InvalidSelection(ref t)) if t == "0"
            ));
            assert!(parse_selection("3", 2).is_err());
            assert!(parse_selection("x", 2).is_err());
        }

        #[test]
        fn empty_answer_cancels() {
            let mut out = Vec::new();
            let result = select_many_with(&mut Cursor::new("\n"), &mut out, "Pick", &["a"]);
            assert!(matches!(result, Err(PromptError::Cancelled)));
        }
    }

    mod policy {
        use super::*;

        fn policy(answers: &'static str, interactive: bool, ask_once: bool) -> PromptPolicy {
            PromptPolicy::with_io(
                Box::new(Cursor::new(answers)),
                Box::new(std::io::sink()),
                interactive,
                ask_once,
            )
        }

        #[test]
        fn non_interactive_stops() {
            let mut policy = policy("y\n", false, false);
            assert_eq!(policy.decide(&item(), &conflict()), OnFailure::StopOnFailure);
        }

        #[test]
        fn asks_each_failure() {
            let mut policy = policy("y\nn\n", true, false);
            assert_eq!(
                policy.decide(&item(), &conflict()),
                OnFailure::ContinueOnFailure
            );
            assert_eq!(policy.decide(&item(), &conflict()), OnFailure::StopOnFailure);
        }

        #[test]
        fn ask_once_remembers() {
            let mut policy = policy("y\n", true, true);
            for _ in 0..3 {
                assert_eq!(
                    policy.decide(&item(), &conflict()),
                    OnFailure::ContinueOnFailure
                );
            }
        }

        #[test]
        fn default_is_stop() {
            let mut policy = policy("\n", true, false);
            assert_eq!(policy.decide(&item(), &conflict()), OnFailure::StopOnFailure);
        }

        #[test]
        fn unanswerable_prompt_stops() {
            let mut policy = policy("", true, false);
            assert_eq!(policy.decide(&item(), &conflict()), OnFailure::StopOnFailure);
        }
    }
}
