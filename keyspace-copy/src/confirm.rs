//! Interactive gate in front of the copy. The operator has to explicitly answer `y` before any
//! connection is opened.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::Result;

pub const PROMPT: &str = "Continue? [yn]";

/// Interpretation of a single answer line.
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Answer {
    Proceed,
    Abort,
    Reprompt,
}

/// Final outcome of the confirmation loop.
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Confirmation {
    Proceed,
    Abort,
}

pub fn classify(line: &str) -> Answer {
    match line.trim() {
        "y" => Answer::Proceed,
        "n" => Answer::Abort,
        _ => Answer::Reprompt,
    }
}

/// Prints `summary` followed by the prompt and reads answers until one of them is `y` or `n`.
/// Running out of input counts as an abort.
pub fn confirm<R, W>(summary: &str, input: &mut R, output: &mut W) -> Result<Confirmation>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{summary}\n\n{PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("Confirmation input closed.");
            return Ok(Confirmation::Abort);
        }

        match classify(&line) {
            Answer::Proceed => return Ok(Confirmation::Proceed),
            Answer::Abort => return Ok(Confirmation::Abort),
            Answer::Reprompt => debug!(answer = line.trim(), "Ignoring answer."),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn run(input: &str) -> (Confirmation, String) {
        let mut output = vec![];
        let confirmation = confirm("summary", &mut Cursor::new(input), &mut output).unwrap();
        (confirmation, String::from_utf8(output).unwrap())
    }

    #[test]
    fn should_classify_answers() {
        assert_eq!(classify("y\n"), Answer::Proceed);
        assert_eq!(classify(" n \r\n"), Answer::Abort);
        assert_eq!(classify("Y\n"), Answer::Reprompt);
        assert_eq!(classify("yes\n"), Answer::Reprompt);
        assert_eq!(classify("\n"), Answer::Reprompt);
    }

    #[test]
    fn should_abort_after_unknown_answer() {
        let (confirmation, output) = run("x\nn\n");

        assert_eq!(confirmation, Confirmation::Abort);
        assert_eq!(output, "summary\n\nContinue? [yn]\n");
    }

    #[test]
    fn should_proceed_on_yes() {
        assert_eq!(run("y\n").0, Confirmation::Proceed);
        assert_eq!(run("maybe\n\ny").0, Confirmation::Proceed);
    }

    #[test]
    fn should_abort_when_input_ends() {
        assert_eq!(run("").0, Confirmation::Abort);
        assert_eq!(run("x\nz\n").0, Confirmation::Abort);
    }

    #[test]
    fn should_stop_reading_at_first_decision() {
        let mut input = Cursor::new("n\ny\n");
        let confirmation = confirm("summary", &mut input, &mut Vec::<u8>::new()).unwrap();

        assert_eq!(confirmation, Confirmation::Abort);
        assert_eq!(input.position(), 2);
    }
}
