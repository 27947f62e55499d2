/// Errors from the causal model engine.
// Display/Error are implemented by hand: the `CyclicEdge` variant's `source`
// field is an edge endpoint, not an error cause, and thiserror's derive
// unconditionally treats any field named `source` as the `Error::source()`.
#[derive(Debug)]
pub enum GcmError {
    DuplicateNode(String),
    UnknownNode(String),
    CyclicEdge { source: String, target: String },
    EmptyDataset,
    DuplicateColumn(String),
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
    MissingColumn(String),
    NonFiniteColumn(String),
    InsufficientRows {
        node: String,
        rows: usize,
        params: usize,
    },
    SingularDesign(String),
    AttributionSetTooLarge { count: usize, max: usize },
    InvalidSampleCount(String),
    Render { path: String, reason: String },
}

impl std::fmt::Display for GcmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNode(name) => {
                write!(f, "duplicate node '{name}' in causal graph")
            }
            Self::UnknownNode(name) => write!(f, "unknown node '{name}'"),
            Self::CyclicEdge { source, target } => {
                write!(f, "edge {source} -> {target} would create a cycle")
            }
            Self::EmptyDataset => write!(f, "dataset has no rows"),
            Self::DuplicateColumn(name) => {
                write!(f, "duplicate column '{name}' in dataset")
            }
            Self::RaggedColumn {
                column,
                expected,
                actual,
            } => {
                write!(f, "column '{column}' has {actual} rows, expected {expected}")
            }
            Self::MissingColumn(name) => {
                write!(f, "column '{name}' not present in dataset")
            }
            Self::NonFiniteColumn(name) => {
                write!(f, "column '{name}' contains non-finite values")
            }
            Self::InsufficientRows { node, rows, params } => {
                write!(f, "cannot fit '{node}': {rows} rows for {params} parameters")
            }
            Self::SingularDesign(name) => {
                write!(f, "design matrix for node '{name}' is singular")
            }
            Self::AttributionSetTooLarge { count, max } => {
                write!(
                    f,
                    "attribution over {count} noise terms exceeds the exact limit of {max}"
                )
            }
            Self::InvalidSampleCount(msg) => write!(f, "invalid sample count: {msg}"),
            Self::Render { path, reason } => {
                write!(f, "failed to render plot '{path}': {reason}")
            }
        }
    }
}

impl std::error::Error for GcmError {}
