//! Optimistic-update command: apply a local mutation immediately, commit it
//! remotely, and restore the captured snapshot if the commit fails.
//!
//! This is the one pattern every engine that reconciles a locally-held view
//! with the remote store shares; keeping it here makes the rollback rule
//! testable without any UI or store involved.

/// Snapshot of a piece of local state taken before an optimistic mutation.
pub struct OptimisticUpdate<T: Clone> {
    snapshot: T,
}

impl<T: Clone> OptimisticUpdate<T> {
    pub fn capture(state: &T) -> Self {
        Self {
            snapshot: state.clone(),
        }
    }

    /// Resolve the command against the remote outcome. On failure the state
    /// is restored to the captured snapshot; the error is passed through
    /// untouched so the caller can surface it. Never retries.
    pub fn resolve<V, E>(self, state: &mut T, outcome: Result<V, E>) -> Result<V, E> {
        if outcome.is_err() {
            *state = self.snapshot;
        }
        outcome
    }
}

/// Run `apply` on `state` optimistically, then `commit` against the remote
/// store; roll `state` back to its prior snapshot when the commit fails.
pub fn with_rollback<T: Clone, V, E>(
    state: &mut T,
    apply: impl FnOnce(&mut T),
    commit: impl FnOnce() -> Result<V, E>,
) -> Result<V, E> {
    let guard = OptimisticUpdate::capture(state);
    apply(state);
    guard.resolve(state, commit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_commit_keeps_the_applied_state() {
        let mut items = vec![1, 2, 3];
        let result: Result<(), &str> =
            with_rollback(&mut items, |v| v.push(4), || Ok(()));
        assert!(result.is_ok());
        assert_eq!(items, vec![1, 2, 3, 4]);
    }

    #[test]
    fn failed_commit_restores_the_snapshot() {
        let mut items = vec![1, 2, 3];
        let result: Result<(), &str> =
            with_rollback(&mut items, |v| v.clear(), || Err("network down"));
        assert_eq!(result.unwrap_err(), "network down");
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn commit_value_is_passed_through() {
        let mut count = 0_i64;
        let result: Result<&str, ()> =
            with_rollback(&mut count, |c| *c += 1, || Ok("done"));
        assert_eq!(result, Ok("done"));
        assert_eq!(count, 1);
    }
}
