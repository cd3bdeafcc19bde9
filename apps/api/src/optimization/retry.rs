//! Bounded, immediate retries for generative agents.
//!
//! A retry is a fresh sample from the model, not a replay: every attempt
//! calls the gateway again. There is no backoff.

use std::future::Future;

use tracing::warn;

use crate::errors::AppError;

/// Errors that retrying cannot fix.
pub fn default_retryable(error: &AppError) -> bool {
    !matches!(
        error,
        AppError::RuleViolation { .. } | AppError::BadRequest(_) | AppError::Internal(_)
    )
}

#[derive(Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never less than 1.
    pub max_attempts: u32,
    pub is_retryable: fn(&AppError) -> bool,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_extra_attempts(2)
    }
}

#[derive(Debug)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    /// Every attempt failed; carries the error from the last one.
    Exhausted { last_error: AppError, attempts: u32 },
    /// A non-retryable error stopped the loop early.
    Aborted { error: AppError, attempts: u32 },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Aborted { attempts, .. } => *attempts,
        }
    }

    /// Success value, or the last error re-raised unchanged.
    pub fn into_result(self) -> Result<T, AppError> {
        match self {
            RetryOutcome::Succeeded { value, .. } => Ok(value),
            RetryOutcome::Exhausted { last_error, .. } => Err(last_error),
            RetryOutcome::Aborted { error, .. } => Err(error),
        }
    }
}

impl RetryPolicy {
    /// `extra` attempts after the first one (`N` extra means `N + 1` total).
    pub fn with_extra_attempts(extra: u32) -> Self {
        Self {
            max_attempts: extra.saturating_add(1),
            is_retryable: default_retryable,
        }
    }

    /// Runs `attempt` (given the 1-based attempt number) until it succeeds,
    /// hits a non-retryable error, or the budget is spent.
    pub async fn run<T, F, Fut>(&self, agent: &str, mut attempt: F) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut n = 0;

        loop {
            n += 1;
            match attempt(n).await {
                Ok(value) => {
                    return RetryOutcome::Succeeded { value, attempts: n };
                }
                Err(error) if !(self.is_retryable)(&error) => {
                    return RetryOutcome::Aborted { error, attempts: n };
                }
                Err(error) => {
                    warn!(
                        "{} attempt {}/{} failed: {}",
                        agent, n, max_attempts, error
                    );
                    if n >= max_attempts {
                        return RetryOutcome::Exhausted {
                            last_error: error,
                            attempts: n,
                        };
                    }
                }
            }
        }
    }
}
