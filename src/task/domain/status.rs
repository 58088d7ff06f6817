//! Task status, problem severity, and rating value types.

use super::TaskDomainError;
use super::error::{ParseSeverityError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task instance lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is waiting for the caregiver to start.
    Pending,
    /// Task is being worked on.
    InProgress,
    /// Task finished successfully.
    Done,
    /// Caregiver reported a problem.
    Problem,
    /// Task was called off.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Problem => "problem",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the status admits no further caregiver transition.
    ///
    /// Terminal only with respect to status-update commands; a reschedule
    /// reopens the task from any status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Returns whether a caregiver status update from `self` to `to` is
    /// permitted.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        match (self, to) {
            (Self::Pending, Self::InProgress | Self::Cancelled)
            | (Self::InProgress, Self::Done | Self::Problem | Self::Cancelled)
            | (Self::Problem, Self::InProgress | Self::Cancelled) => true,
            _ => false,
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "problem" => Ok(Self::Problem),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to a problem report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemSeverity {
    /// Minor issue, no urgency.
    Mild,
    /// Needs attention soon.
    Moderate,
    /// Needs immediate attention.
    Critical,
}

impl ProblemSeverity {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Critical => "critical",
        }
    }
}

impl TryFrom<&str> for ProblemSeverity {
    type Error = ParseSeverityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "mild" => Ok(Self::Mild),
            "moderate" => Ok(Self::Moderate),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseSeverityError(value.to_owned())),
        }
    }
}

impl fmt::Display for ProblemSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated rating a coordinator gives a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Creates a validated rating.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidRating`] when the value falls
    /// outside 1–5.
    pub const fn new(value: u8) -> Result<Self, TaskDomainError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(TaskDomainError::InvalidRating(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
