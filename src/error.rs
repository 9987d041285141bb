use thiserror::Error;

/// Failures the renderer can report.
///
/// Malformed markup is not one of them; see [`ParseTree::is_valid`][crate::ParseTree::is_valid].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A tag node survived tokenization but the registry used for rendering has no descriptor for it.
    #[error("no tag descriptor registered for `{name}`")]
    UnknownTag { name: String },
}
