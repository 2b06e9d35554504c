//! Process exit codes.
//!
//! - 0: every verdict passed
//! - 1: at least one verdict failed (not numeric or out of range)
//! - 2: the run could not complete (bad input, server unreachable, config)

use std::process::ExitCode;

use turnangle_core::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CliExitCode {
    Pass = 0,
    Fail = 1,
    Error = 2,
}

impl From<CliExitCode> for ExitCode {
    fn from(code: CliExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&Verdict> for CliExitCode {
    fn from(verdict: &Verdict) -> Self {
        if verdict.is_pass() {
            CliExitCode::Pass
        } else {
            CliExitCode::Fail
        }
    }
}

impl CliExitCode {
    /// Combine two codes, keeping the most severe.
    pub fn worst(self, other: CliExitCode) -> CliExitCode {
        if (other as u8) > (self as u8) {
            other
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_mapping() {
        assert_eq!(CliExitCode::from(&Verdict::Pass { angle: 0.0 }), CliExitCode::Pass);
        assert_eq!(CliExitCode::from(&Verdict::FailNotNumeric), CliExitCode::Fail);
        assert_eq!(
            CliExitCode::from(&Verdict::FailOutOfRange { angle: 181.0 }),
            CliExitCode::Fail
        );
    }

    #[test]
    fn test_worst() {
        assert_eq!(CliExitCode::Pass.worst(CliExitCode::Fail), CliExitCode::Fail);
        assert_eq!(CliExitCode::Error.worst(CliExitCode::Fail), CliExitCode::Error);
        assert_eq!(CliExitCode::Pass.worst(CliExitCode::Pass), CliExitCode::Pass);
    }
}
