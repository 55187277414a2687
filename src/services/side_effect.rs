use std::fmt::Display;
use tracing::warn;

/// Outcome of a best-effort action (notification, email).
///
/// Workflows record it for logging and reporting only; it never changes the
/// result of the operation that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Completed,
    Skipped,
    Failed(String),
}

impl SideEffect {
    pub fn from_result<T, E: Display>(label: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(_) => SideEffect::Completed,
            Err(e) => {
                warn!("{} failed: {}", label, e);
                SideEffect::Failed(e.to_string())
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SideEffect::Failed(_))
    }
}
