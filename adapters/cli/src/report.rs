use std::process::ExitCode;

use snake_tester_core::TestOutcome;

/// Console summary of a suite run.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RunReport {
    lines: Vec<String>,
    passed: usize,
    total: usize,
}

impl RunReport {
    /// Builds one line per `(test id, outcome)` pair, in order.
    pub(crate) fn new<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a TestOutcome)>,
    {
        let mut report = Self {
            lines: Vec::new(),
            passed: 0,
            total: 0,
        };
        for (id, outcome) in results {
            report.total += 1;
            let line = match outcome {
                TestOutcome::Passed { direction } => {
                    report.passed += 1;
                    format!("PASS {id} ({})", direction.as_move_str())
                }
                TestOutcome::Failed {
                    direction: Some(direction),
                    message,
                } => format!("FAIL {id}: {message} ({})", direction.as_move_str()),
                TestOutcome::Failed {
                    direction: None,
                    message,
                } => format!("FAIL {id}: {message}"),
            };
            report.lines.push(line);
        }
        report
    }

    pub(crate) fn lines(&self) -> &[String] {
        &self.lines
    }

    pub(crate) fn summary(&self) -> String {
        format!("{}/{} passed", self.passed, self.total)
    }

    pub(crate) fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        if self.all_passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
