use thiserror::Error;

/// Outcome of a failed compile. Cloneable so one shared compile can hand the
/// same failure to every waiter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error("Diagram compile failed: {0}")]
    Compile(String),

    #[error("Diagram compiler returned an empty graphic")]
    EmptyGraphic,
}

pub type Result<T> = std::result::Result<T, DiagramError>;
