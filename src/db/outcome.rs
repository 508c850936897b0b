use crate::error::KaptanError;

/// Result of a write whose caller decides whether store outages matter.
#[derive(Debug)]
pub enum WriteOutcome<T> {
    Applied(T),
    /// The store was unreachable; the write did not happen.
    Skipped(KaptanError),
    /// The write was rejected or failed for a reason other than availability.
    Failed(KaptanError),
}

impl<T> From<Result<T, KaptanError>> for WriteOutcome<T> {
    fn from(res: Result<T, KaptanError>) -> Self {
        match res {
            Ok(v) => WriteOutcome::Applied(v),
            Err(e) if e.is_store_unavailable() => WriteOutcome::Skipped(e),
            Err(e) => WriteOutcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_store_outage_as_skipped() {
        let res: Result<(), KaptanError> = Err(sqlx::Error::PoolTimedOut.into());
        assert!(matches!(WriteOutcome::from(res), WriteOutcome::Skipped(_)));
    }

    #[test]
    fn classifies_other_errors_as_failed() {
        let res: Result<(), KaptanError> = Err(KaptanError::validation("slug is required"));
        assert!(matches!(WriteOutcome::from(res), WriteOutcome::Failed(_)));
    }

    #[test]
    fn success_is_applied() {
        let res: Result<i64, KaptanError> = Ok(7);
        assert!(matches!(WriteOutcome::from(res), WriteOutcome::Applied(7)));
        let closed: Result<i64, KaptanError> = Err(sqlx::Error::PoolClosed.into());
        assert!(matches!(WriteOutcome::from(closed), WriteOutcome::Skipped(_)));
    }
}
