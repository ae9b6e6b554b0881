//! Partitions of the row set and their text format.
//!
//! A partition file holds one partition per line: the identifier first,
//! then the 1-based row indices belonging to it.

use std::collections::HashSet;
use std::io::{self, BufRead, Write};

use fixedbitset::FixedBitSet;

use crate::error::Error;

/// A set of row indices that share a decision-tree path so far,
/// tagged with its identifier.
///
/// Elements accumulate during construction and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    id: u64,
    elements: Vec<usize>,
}

impl Partition {
    /// An empty partition with the given identifier.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self { id, elements: Vec::new() }
    }

    /// The identifier.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Append a 1-based row index.
    #[inline]
    pub fn push(&mut self, index: usize) {
        self.elements.push(index);
    }

    /// The row indices, in accumulation order.
    #[inline]
    pub fn elements(&self) -> &[usize] {
        &self.elements
    }

    /// Number of rows in this partition.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether this partition holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// The ordered list of currently active partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionList {
    partitions: Vec<Partition>,
}

impl PartitionList {
    /// Build a list from the given partitions.
    ///
    /// Identifiers must be unique and every partition non-empty.
    pub fn new(partitions: Vec<Partition>) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        for partition in &partitions {
            if !seen.insert(partition.id()) {
                return Err(Error::DuplicateId(partition.id()));
            }
            if partition.is_empty() {
                return Err(Error::EmptyPartition(partition.id()));
            }
        }
        Ok(Self { partitions })
    }

    /// Read a partition file.
    ///
    /// Row indices must be in `1..=n_rows`; identifiers must be unique;
    /// a line with an identifier but no indices is malformed.
    /// Blank lines are ignored.
    pub fn from_reader<R: BufRead>(reader: R, n_rows: usize) -> Result<Self, Error> {
        let mut partitions = Vec::new();
        let mut seen = HashSet::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let lineno = i + 1;
            let mut words = line.split_whitespace();

            let Some(word) = words.next() else { continue };
            let id = word.parse::<u64>()
                .map_err(|_| Error::InvalidToken {
                    line: lineno,
                    token: word.to_string(),
                })?;
            if !seen.insert(id) {
                return Err(Error::DuplicateId(id));
            }

            let mut partition = Partition::new(id);
            for word in words {
                let index = word.parse::<usize>()
                    .map_err(|_| Error::InvalidToken {
                        line: lineno,
                        token: word.to_string(),
                    })?;
                if index < 1 || index > n_rows {
                    return Err(Error::IndexOutOfRange { index, n_rows });
                }
                partition.push(index);
            }
            if partition.is_empty() {
                return Err(Error::EmptyPartition(id));
            }
            partitions.push(partition);
        }

        Ok(Self { partitions })
    }

    /// Write the list in the same one-line-per-partition shape it is
    /// read from.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for partition in &self.partitions {
            write!(writer, "{}", partition.id())?;
            for index in partition.elements() {
                write!(writer, " {index}")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// The active partitions, in order.
    #[inline]
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Number of active partitions.
    #[inline]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether the list holds no partitions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Whether some active partition carries `id`.
    #[inline]
    pub fn contains_id(&self, id: u64) -> bool {
        self.partitions.iter().any(|p| p.id() == id)
    }

    /// Check that the partitions form a true set partition of the rows:
    /// pairwise disjoint element sets whose union is exactly `1..=n_rows`.
    pub fn check_cover(&self, n_rows: usize) -> Result<(), Error> {
        let mut covered = FixedBitSet::with_capacity(n_rows);
        for partition in &self.partitions {
            for &index in partition.elements() {
                if index < 1 || index > n_rows {
                    return Err(Error::IndexOutOfRange { index, n_rows });
                }
                if covered.put(index - 1) {
                    return Err(Error::Overlap(index));
                }
            }
        }
        if covered.count_ones(..) != n_rows {
            let missing = (0..n_rows)
                .find(|&i| !covered.contains(i))
                .map(|i| i + 1)
                .unwrap_or(0);
            return Err(Error::Uncovered(missing));
        }
        Ok(())
    }

    /// Replace the partition at `at` with `children`, keeping every other
    /// partition in place.
    pub(crate) fn splice(&mut self, at: usize, children: Vec<Partition>) {
        self.partitions.splice(at..=at, children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn partition(id: u64, elements: &[usize]) -> Partition {
        let mut p = Partition::new(id);
        for &e in elements {
            p.push(e);
        }
        p
    }

    #[test]
    fn reads_the_partition_format() {
        let data: &[u8] = b"1 1 2 3\n2 4\n";
        let list = PartitionList::from_reader(BufReader::new(data), 4).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.partitions()[0].id(), 1);
        assert_eq!(list.partitions()[0].elements(), &[1, 2, 3]);
        assert_eq!(list.partitions()[1].id(), 2);
        assert_eq!(list.partitions()[1].elements(), &[4]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let data: &[u8] = b"1 1 2\n1 3 4\n";
        let err = PartitionList::from_reader(BufReader::new(data), 4).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(1)), "got {err:?}");
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let data: &[u8] = b"1 1 2 5\n";
        let err = PartitionList::from_reader(BufReader::new(data), 4).unwrap_err();
        assert!(
            matches!(err, Error::IndexOutOfRange { index: 5, n_rows: 4 }),
            "got {err:?}",
        );
    }

    #[test]
    fn rejects_elementless_lines() {
        let data: &[u8] = b"7\n";
        let err = PartitionList::from_reader(BufReader::new(data), 4).unwrap_err();
        assert!(matches!(err, Error::EmptyPartition(7)), "got {err:?}");
    }

    #[test]
    fn writes_the_partition_format() {
        let list = PartitionList::new(vec![
            partition(11, &[1, 3]),
            partition(12, &[2, 4]),
        ]).unwrap();

        let mut out = Vec::new();
        list.write_to(&mut out).unwrap();
        assert_eq!(out, b"11 1 3\n12 2 4\n");
    }

    #[test]
    fn accepts_a_true_partition() {
        let list = PartitionList::new(vec![
            partition(1, &[2, 4]),
            partition(2, &[1, 3]),
        ]).unwrap();
        list.check_cover(4).unwrap();
    }

    #[test]
    fn rejects_overlapping_partitions() {
        let list = PartitionList::new(vec![
            partition(1, &[1, 2]),
            partition(2, &[2, 3, 4]),
        ]).unwrap();
        let err = list.check_cover(4).unwrap_err();
        assert!(matches!(err, Error::Overlap(2)), "got {err:?}");
    }

    #[test]
    fn rejects_an_incomplete_cover() {
        let list = PartitionList::new(vec![
            partition(1, &[1, 2]),
            partition(2, &[4]),
        ]).unwrap();
        let err = list.check_cover(4).unwrap_err();
        assert!(matches!(err, Error::Uncovered(3)), "got {err:?}");
    }
}
