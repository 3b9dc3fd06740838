use thiserror::Error;

/// Errors raised while assembling or slicing a [`Dataset`](crate::data::dataset::Dataset).
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset contains no rows")]
    Empty,

    #[error("no label column: the header must name at least the label")]
    MissingLabelColumn,

    #[error("row {row}: expected {expected} values, found {found}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("expected {expected} feature names, found {found}")]
    NameCount { expected: usize, found: usize },

    #[error("column {column} is out of bounds for a dataset with {width} feature columns")]
    ColumnOutOfBounds { column: usize, width: usize },

    #[error("train size should be between 0.0 and 1.0, got {0}")]
    InvalidSplit(f64),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised while inducing or querying a decision tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("entropy of an empty set of rows is undefined")]
    EmptyDataset,

    #[error("attribute selection needs at least one attribute")]
    NoAttributes,

    #[error("tree wasn't built yet")]
    NotFitted,

    #[error("attribute `{attribute}` has no branch for unseen value `{value}`")]
    UnseenValue { attribute: String, value: String },

    #[error("prediction rows need at least {expected} columns, found {found}")]
    WidthMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Errors raised while scoring predictions against true labels.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("{predictions} predictions were given for {labels} labels")]
    LengthMismatch { labels: usize, predictions: usize },

    #[error("class `{0}` is missing from the class list")]
    MissingClass(String),

    #[error("accuracy of an empty prediction set is undefined")]
    NoPredictions,
}
