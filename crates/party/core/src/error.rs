/// Errors raised while building an [`EventMeta`](crate::EventMeta).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MetaError {
    #[error("event meta is limited to {max} entries")]
    TooManyEntries { max: usize },

    #[error("event meta keys must not be empty")]
    EmptyKey,
}
