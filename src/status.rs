//! Status codes for integration requests

/// Outcome of a single integration request.
///
/// Only [`Status::Success`] and [`Status::RootReturn`] mean the requested work was
/// done; every other value is surfaced verbatim for the host to interpret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// The target time was reached.
    #[default]
    Success,
    /// A root function crossed zero before the target time.
    RootReturn,
    /// The integrator used up the step budget of one call. Handled inside the
    /// session by budget escalation and never returned by `advance`.
    TooMuchWork,
    /// Budget escalation hit its cap without reaching the target time.
    WorkLimitExceeded,
    /// The local error test failed repeatedly or with `|h| = hmin`.
    ErrorTestFailure,
    /// The Newton iteration failed repeatedly or with `|h| = hmin`.
    ConvergenceFailure,
    /// The request itself was unusable, e.g. a target behind the last step.
    IllegalInput,
    /// The right-hand side kept producing non-finite values.
    RhsFailure,
}

impl Status {
    /// `true` for statuses that leave the session ready for the next request.
    pub fn is_ok(self) -> bool {
        matches!(self, Status::Success | Status::RootReturn)
    }

    /// CVODE-compatible numeric flag, for hosts that log or compare integer codes.
    pub fn code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::RootReturn => 2,
            Status::TooMuchWork | Status::WorkLimitExceeded => -1,
            Status::ErrorTestFailure => -3,
            Status::ConvergenceFailure => -4,
            Status::RhsFailure => -8,
            Status::IllegalInput => -22,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Status::Success => "target time reached",
            Status::RootReturn => "root function crossed zero",
            Status::TooMuchWork => "step budget used up",
            Status::WorkLimitExceeded => "step budget escalation reached its cap",
            Status::ErrorTestFailure => "error test failed repeatedly",
            Status::ConvergenceFailure => "nonlinear solver failed to converge",
            Status::IllegalInput => "illegal input",
            Status::RhsFailure => "right-hand side returned non-finite values",
        };
        write!(f, "{msg} (flag {})", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn only_success_and_roots_are_ok() {
        assert!(Status::Success.is_ok());
        assert!(Status::RootReturn.is_ok());
        assert!(!Status::WorkLimitExceeded.is_ok());
        assert!(!Status::IllegalInput.is_ok());
        assert_eq!(Status::default(), Status::Success);
    }

    #[test]
    fn display_carries_flag() {
        assert_eq!(
            Status::ConvergenceFailure.to_string(),
            "nonlinear solver failed to converge (flag -4)"
        );
        assert_eq!(Status::RootReturn.code(), 2);
    }
}
