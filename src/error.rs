//! Error types
//!
//! Two families live here. `Fault` names states that cannot happen while
//! the director is driven correctly; they are logged and turned into a
//! panic by [`fault`]. The `*Error` enums are ordinary recoverable failures
//! coming from collaborators (config files, the leaderboard).

use std::fmt;

/// Broken internal invariant. Never recovered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    UnknownUpgrade { id: String },
    MissingScalar { minute: u32 },
    MissingArsenalWeapon { minute: u32 },
    MissingLedgerXp { minute: u32 },
    MissingExpectedXp { minute: u32 },
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUpgrade { id } => write!(f, "unknown upgrade id: {id:?}"),
            Self::MissingScalar { minute } => {
                write!(f, "no acquisition scalar stored for minute {minute} weapon")
            }
            Self::MissingArsenalWeapon { minute } => {
                write!(f, "arsenal has no weapon for minute {minute}")
            }
            Self::MissingLedgerXp { minute } => {
                write!(f, "no bagged xp for minute {minute}")
            }
            Self::MissingExpectedXp { minute } => {
                write!(f, "no expected xp target for minute {minute}")
            }
        }
    }
}

impl std::error::Error for Fault {}

/// Log a broken invariant and abort the run.
#[cold]
#[track_caller]
pub fn fault(fault: Fault) -> ! {
    log::error!("director fault: {fault}");
    panic!("director fault: {fault}");
}

/// Failure loading or validating a [`crate::Tuning`].
#[derive(Debug)]
pub enum TuningError {
    Parse(serde_json::Error),
    EmptyEraOrder,
    NonPositive { field: &'static str },
    ExpectedXpLength { found: usize },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "tuning json: {err}"),
            Self::EmptyEraOrder => write!(f, "era order must name at least one era"),
            Self::NonPositive { field } => write!(f, "{field} must be positive"),
            Self::ExpectedXpLength { found } => {
                write!(f, "expected xp table needs 12 entries, found {found}")
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Failure submitting a score.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeaderboardError {
    /// Score did not make the table
    NotRanked { score: u64 },
    /// Backing store rejected the write
    Storage(String),
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRanked { score } => write!(f, "score {score} did not place"),
            Self::Storage(msg) => write!(f, "leaderboard storage: {msg}"),
        }
    }
}

impl std::error::Error for LeaderboardError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_messages() {
        let msg = Fault::UnknownUpgrade { id: "DOUBLE_JUMP".into() }.to_string();
        assert!(msg.contains("DOUBLE_JUMP"));
        assert_eq!(
            Fault::MissingLedgerXp { minute: 5 }.to_string(),
            "no bagged xp for minute 5"
        );
    }

    #[test]
    #[should_panic(expected = "arsenal has no weapon for minute 3")]
    fn test_fault_panics() {
        fault(Fault::MissingArsenalWeapon { minute: 3 });
    }

    #[test]
    fn test_tuning_error_source() {
        let err: TuningError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("tuning json"));
    }
}
