use std::fmt;

use crate::scheduler::SchedulerError;

/// Ways the embedding page can drive the launcher incorrectly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    Scheduler(SchedulerError),
    NotReady,
    AlreadyLaunched,
    PackAfterLaunch(String),
    DuplicatePack(String),
    UnsupportedLanguage(String),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduler(e) => write!(f, "{e}"),
            Self::NotReady => write!(f, "launch called before the launcher was ready"),
            Self::AlreadyLaunched => write!(f, "launch called twice"),
            Self::PackAfterLaunch(name) => write!(f, "cannot add pack '{name}' after launch"),
            Self::DuplicatePack(name) => write!(f, "pack '{name}' was already added"),
            Self::UnsupportedLanguage(code) => write!(f, "unsupported language code '{code}'"),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Scheduler(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchedulerError> for LaunchError {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}
