//! Error values for loading and refining.
//!
//! Every fallible operation in this crate reports one of these variants;
//! nothing below `main` terminates the process.

use thiserror::Error;

/// Everything that can go wrong while reading the input files
/// or performing a refinement step.
#[derive(Debug, Error)]
pub enum Error {
    /// Opening or reading a file failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset header line does not consist of exactly
    /// two integers `<rows> <columns>`.
    #[error("dataset header must be `<rows> <columns>`, got {0:?}")]
    MalformedHeader(String),

    /// A dataset body line carries the wrong number of values.
    #[error("dataset line {line}: expected {expected} values, got {got}")]
    TokenCount {
        /// 1-based line number within the file.
        line: usize,
        /// Number of values the header declares per row.
        expected: usize,
        /// Number of values found on the line.
        got: usize,
    },

    /// A token could not be parsed as a non-negative integer.
    #[error("line {line}: {token:?} is not a non-negative integer")]
    InvalidToken {
        /// 1-based line number within the file.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// The number of dataset body lines disagrees with the header.
    #[error("dataset has {got} data lines but the header declares {expected}")]
    RowCount {
        /// Row count declared by the header.
        expected: usize,
        /// Body lines actually present.
        got: usize,
    },

    /// A target label lies outside the label domain.
    #[error("row {row}: label {value} is outside 0..{arity}")]
    LabelDomain {
        /// 1-based row index.
        row: usize,
        /// The out-of-domain label.
        value: u8,
        /// Number of allowed label values.
        arity: u8,
    },

    /// A feature cell lies outside the feature domain.
    #[error("row {row}, feature column {column}: value {value} is outside 0..{arity}")]
    FeatureDomain {
        /// 1-based row index.
        row: usize,
        /// 1-based feature column number.
        column: usize,
        /// The out-of-domain value.
        value: u8,
        /// Number of allowed feature values.
        arity: u8,
    },

    /// A partition references a row the dataset does not have.
    #[error("row index {index} is outside 1..={n_rows}")]
    IndexOutOfRange {
        /// The offending row index.
        index: usize,
        /// Number of rows in the dataset.
        n_rows: usize,
    },

    /// Two partitions in the input carry the same identifier.
    #[error("partition id {0} appears more than once")]
    DuplicateId(u64),

    /// A partition line carries an identifier but no row indices.
    #[error("partition {0} has no elements")]
    EmptyPartition(u64),

    /// A row is claimed by two partitions.
    #[error("row {0} belongs to more than one partition")]
    Overlap(usize),

    /// A row is claimed by no partition.
    #[error("row {0} belongs to no partition")]
    Uncovered(usize),

    /// A derived child identifier is already taken by an active partition.
    #[error("child id {0} collides with an existing partition")]
    ChildIdCollision(u64),

    /// Encoding the refinement report as JSON failed.
    #[error("failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}
