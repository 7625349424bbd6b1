/// Outcome indicator handed to [`crate::SqlClient::end_transaction`].
///
/// The idiom mirrors the usual transaction pattern: run the transactional
/// work, then hand its `Result` to `end_transaction` by reference. A
/// successful result commits, any error rolls back; the error value itself is
/// never inspected.
///
/// ```rust
/// use sql_client::TxOutcome;
///
/// let work: Result<(), std::io::Error> = Ok(());
/// assert_eq!(TxOutcome::from(&work), TxOutcome::Commit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    /// The transactional work succeeded; commit.
    Commit,
    /// The transactional work failed; roll back.
    Rollback,
}

impl<T, E> From<&Result<T, E>> for TxOutcome {
    fn from(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            Self::Commit
        } else {
            Self::Rollback
        }
    }
}
