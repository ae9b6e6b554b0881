#![warn(missing_docs)]

//!
//! One greedy step of ID3-style partition refinement
//! over a fixed categorical dataset.
//!
//! Given a row table whose last column is a binary label and a list of
//! row partitions, the crate scores every (partition, feature) pair by
//! its size-weighted information gain (the F-value), splits the winning
//! partition by the winning feature's value, and replaces it in the list
//! with the non-empty children. One call, one split; driving the loop to
//! a full tree is the caller's business.
//!
//! The three layers:
//!
//! - [`analysis`] — pure entropy and information-gain functions.
//! - [`refine`] — the [`Refiner`] that picks and performs the split.
//! - [`table`] / [`partition`] — the data structures and their
//!   whitespace text formats.
//!
//! # Example
//! ```
//! use gainsplit::{DataTable, Partition, PartitionList, Refiner, Schema};
//!
//! // four rows, two features, the first feature predicts the label
//! let table = DataTable::from_rows(vec![
//!     vec![0, 0, 0],
//!     vec![0, 1, 0],
//!     vec![1, 0, 1],
//!     vec![1, 1, 1],
//! ], Schema::default()).unwrap();
//!
//! let mut root = Partition::new(1);
//! (1..=4).for_each(|index| root.push(index));
//! let mut partitions = PartitionList::new(vec![root]).unwrap();
//!
//! let report = Refiner::new(&table)
//!     .refine(&mut partitions)
//!     .unwrap()
//!     .expect("the first feature is informative");
//! assert_eq!(report.children, vec![11, 12]);
//! ```

pub mod analysis;
pub mod error;
pub mod partition;
pub mod refine;
pub mod table;

pub use error::Error;
pub use partition::{Partition, PartitionList};
pub use refine::{Candidate, Refiner, SplitReport};
pub use table::{DataTable, Schema};
