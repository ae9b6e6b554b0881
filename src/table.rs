//! The row table and its whitespace text format.
//!
//! A dataset file starts with a header line `<rows> <columns>` followed by
//! `rows` lines of `columns` whitespace-separated category codes.
//! The last column is the target label.

use std::io::BufRead;

use crate::error::Error;

/// Category arities for the two kinds of columns in a table.
///
/// The engine never hard-codes how many values a feature or a label may
/// take; it reads both counts from the table's schema. The default schema
/// is ternary features (`{0,1,2}`) with a binary label (`{0,1}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    feature_arity: u8,
    label_arity: u8,
}

impl Schema {
    /// Construct a schema with the given arities.
    /// Both arities must be positive.
    #[inline]
    pub fn new(feature_arity: u8, label_arity: u8) -> Self {
        assert!(feature_arity > 0, "feature arity must be positive");
        assert!(label_arity > 0, "label arity must be positive");
        Self { feature_arity, label_arity }
    }

    /// Number of values a feature cell may take.
    /// Feature values range over `0..feature_arity`.
    #[inline]
    pub fn feature_arity(&self) -> u8 {
        self.feature_arity
    }

    /// Number of values the target label may take.
    /// Labels range over `0..label_arity`.
    #[inline]
    pub fn label_arity(&self) -> u8 {
        self.label_arity
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self { feature_arity: 3, label_arity: 2 }
    }
}

/// An immutable `rows × columns` grid of category codes, stored row-major.
///
/// The last column is the target label; every other column is a feature.
/// Rows are addressed with the 1-based indices the partition format uses.
/// The table never changes after construction.
#[derive(Debug, Clone)]
pub struct DataTable {
    cells: Vec<u8>,
    n_rows: usize,
    n_columns: usize,
    schema: Schema,
}

impl DataTable {
    /// Read a dataset in the whitespace text format.
    ///
    /// Shape errors (bad header, wrong token counts, a body line count
    /// that disagrees with the header, non-integer tokens) are reported
    /// here; cell *domains* are checked later, by the computations that
    /// visit the cells.
    pub fn from_reader<R: BufRead>(reader: R, schema: Schema) -> Result<Self, Error> {
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(Error::MalformedHeader(String::new())),
        };
        let mut words = header.split_whitespace();
        let (n_rows, n_columns) = match (words.next(), words.next(), words.next()) {
            (Some(r), Some(c), None) => {
                let r = parse_count(r, 1)?;
                let c = parse_count(c, 1)?;
                (r, c)
            }
            _ => return Err(Error::MalformedHeader(header.trim().to_string())),
        };

        let mut cells = Vec::with_capacity(n_rows * n_columns);
        let mut got = 0_usize;
        for (i, line) in lines.enumerate() {
            let line = line?;
            // line 1 is the header
            let lineno = i + 2;
            let words = line.split_whitespace().collect::<Vec<_>>();
            if words.len() != n_columns {
                return Err(Error::TokenCount {
                    line: lineno,
                    expected: n_columns,
                    got: words.len(),
                });
            }
            for word in words {
                let value = word.parse::<u8>()
                    .map_err(|_| Error::InvalidToken {
                        line: lineno,
                        token: word.to_string(),
                    })?;
                cells.push(value);
            }
            got += 1;
        }

        if got != n_rows {
            return Err(Error::RowCount { expected: n_rows, got });
        }

        Ok(Self { cells, n_rows, n_columns, schema })
    }

    /// Build a table from in-memory rows.
    /// Every row must have the same number of columns.
    pub fn from_rows(rows: Vec<Vec<u8>>, schema: Schema) -> Result<Self, Error> {
        let n_rows = rows.len();
        let n_columns = rows.first().map_or(0, Vec::len);

        let mut cells = Vec::with_capacity(n_rows * n_columns);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_columns {
                return Err(Error::TokenCount {
                    line: i + 1,
                    expected: n_columns,
                    got: row.len(),
                });
            }
            cells.extend(row);
        }

        Ok(Self { cells, n_rows, n_columns, schema })
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns, target column included.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Number of feature columns (everything but the target).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_columns.saturating_sub(1)
    }

    /// The column arities this table was loaded with.
    #[inline]
    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Cell value at 1-based `row` and 0-based feature `column`.
    ///
    /// `row` must be in `1..=n_rows` and `column` in `0..n_features`.
    #[inline]
    pub fn cell(&self, row: usize, column: usize) -> u8 {
        self.cells[(row - 1) * self.n_columns + column]
    }

    /// Target label of the 1-based `row`.
    #[inline]
    pub fn label(&self, row: usize) -> u8 {
        self.cells[(row - 1) * self.n_columns + self.n_columns - 1]
    }
}

fn parse_count(word: &str, line: usize) -> Result<usize, Error> {
    word.parse::<usize>()
        .map_err(|_| Error::InvalidToken { line, token: word.to_string() })
}
