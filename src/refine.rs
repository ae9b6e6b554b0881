//! One greedy refinement step over the partition list.
//!
//! The refiner scores every (partition, feature) pair with the F-value
//! rule, splits the winner by its best feature, and replaces it in the
//! list with the non-empty children.

use rayon::prelude::*;
use serde::Serialize;

use std::fmt;

use crate::analysis;
use crate::error::Error;
use crate::partition::{Partition, PartitionList};
use crate::table::DataTable;

/// The (partition, feature) pair chosen by the F-value rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Identifier of the partition to split.
    pub partition: u64,
    /// 0-based column index of the winning feature.
    pub feature: usize,
    /// Size-weighted information gain of the winner. Strictly positive.
    pub f_value: f64,
    position: usize,
}

/// What a performed split did: which partition was replaced, by which
/// children, using which feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    /// Identifier of the replaced partition.
    pub parent: u64,
    /// Identifiers of the non-empty children, in feature-value order.
    pub children: Vec<u64>,
    /// 1-based column number of the feature used, as reported in the
    /// partition file's companion diagnostic line.
    pub feature: usize,
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition {} was replaced by", self.parent)?;
        for id in &self.children {
            write!(f, " {id}")?;
        }
        write!(f, " using feature {}", self.feature)
    }
}

/// Performs one greedy split per call against a fixed row table.
pub struct Refiner<'a> {
    table: &'a DataTable,
}

impl<'a> Refiner<'a> {
    /// A refiner over the given table.
    #[inline]
    pub fn new(table: &'a DataTable) -> Self {
        Self { table }
    }

    /// Score every active partition and pick the one to split.
    ///
    /// Returns `None` when no (partition, feature) pair has a strictly
    /// positive F-value; the refinement step is then a no-op. Repeated
    /// calls on an unchanged list return the same candidate.
    pub fn best_split(&self, list: &PartitionList) -> Result<Option<Candidate>, Error> {
        let scores = list.partitions()
            .par_iter()
            .map(|partition| self.score(partition))
            .collect::<Result<Vec<_>, Error>>()?;

        // The fold over collected scores runs strictly left to right, so
        // ties keep the first-encountered pair even though the scoring
        // above is parallel.
        let total = self.table.n_rows() as f64;
        let mut best: Option<Candidate> = None;
        for (position, score) in scores.into_iter().enumerate() {
            let Some((feature, gain)) = score else { continue };
            let partition = &list.partitions()[position];
            let f_value = (partition.len() as f64 / total) * gain;
            if f_value > best.map_or(0.0, |b| b.f_value) {
                best = Some(Candidate {
                    partition: partition.id(),
                    feature,
                    f_value,
                    position,
                });
            }
        }
        Ok(best)
    }

    /// Perform one refinement step.
    ///
    /// The selected partition is replaced, in place, by its non-empty
    /// children; every other partition keeps its position. `Ok(None)`
    /// means no informative split exists and the list is untouched.
    pub fn refine(&self, list: &mut PartitionList) -> Result<Option<SplitReport>, Error> {
        let Some(candidate) = self.best_split(list)? else {
            return Ok(None);
        };

        let parent = &list.partitions()[candidate.position];
        let parent_id = parent.id();
        let arity = self.table.schema().feature_arity() as u64;
        let mut children = (1..=arity)
            .map(|k| Partition::new(parent_id * 10 + k))
            .collect::<Vec<_>>();
        // best_split already validated every cell it scored, so the
        // winning feature's values are all inside the domain here.
        for &index in parent.elements() {
            let value = self.table.cell(index, candidate.feature) as usize;
            children[value].push(index);
        }

        let children = children.into_iter()
            .filter(|child| !child.is_empty())
            .collect::<Vec<_>>();
        for child in &children {
            if list.contains_id(child.id()) {
                return Err(Error::ChildIdCollision(child.id()));
            }
        }

        let report = SplitReport {
            parent: parent_id,
            children: children.iter().map(|child| child.id()).collect(),
            feature: candidate.feature + 1,
        };
        list.splice(candidate.position, children);
        Ok(Some(report))
    }

    // Best feature for one partition: maximum information gain, ties
    // broken by the lowest column index (strict comparison).
    fn score(&self, partition: &Partition) -> Result<Option<(usize, f64)>, Error> {
        let elements = partition.elements();
        let e_s = analysis::entropy_over_partition(self.table, elements)?;

        let mut best: Option<(usize, f64)> = None;
        for feature in 0..self.table.n_features() {
            let e_f = analysis::entropy_over_feature(self.table, elements, feature)?;
            let gain = e_s - e_f;
            if best.map_or(true, |(_, g)| gain > g) {
                best = Some((feature, gain));
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Schema;

    const TEST_TOLERANCE: f64 = 1e-9;

    fn table(rows: Vec<Vec<u8>>) -> DataTable {
        DataTable::from_rows(rows, Schema::default()).unwrap()
    }

    fn partition(id: u64, elements: &[usize]) -> Partition {
        let mut p = Partition::new(id);
        for &e in elements {
            p.push(e);
        }
        p
    }

    fn list(partitions: Vec<Partition>) -> PartitionList {
        PartitionList::new(partitions).unwrap()
    }

    #[test]
    fn splits_on_the_informative_feature() {
        // feature 0 predicts the label exactly; feature 1 carries nothing
        let t = table(vec![
            vec![0, 0, 0],
            vec![0, 1, 0],
            vec![1, 0, 1],
            vec![1, 1, 1],
        ]);
        let mut l = list(vec![partition(1, &[1, 2, 3, 4])]);

        let report = Refiner::new(&t).refine(&mut l).unwrap().unwrap();
        assert_eq!(report.parent, 1);
        assert_eq!(report.children, vec![11, 12]);
        assert_eq!(report.feature, 1);

        assert_eq!(l.partitions()[0].elements(), &[1, 2]);
        assert_eq!(l.partitions()[1].elements(), &[3, 4]);
        l.check_cover(4).unwrap();
    }

    #[test]
    fn ternary_feature_yields_three_children() {
        let t = table(vec![
            vec![0, 0, 0],
            vec![1, 0, 1],
            vec![2, 0, 0],
            vec![2, 0, 1],
        ]);
        let mut l = list(vec![partition(1, &[1, 2, 3, 4])]);

        let report = Refiner::new(&t).refine(&mut l).unwrap().unwrap();
        assert_eq!(report.children, vec![11, 12, 13]);
        assert_eq!(report.feature, 1);
        l.check_cover(4).unwrap();
    }

    #[test]
    fn children_cover_the_parent_exactly() {
        let t = table(vec![
            vec![0, 1, 0],
            vec![1, 2, 1],
            vec![2, 0, 0],
            vec![0, 1, 1],
            vec![1, 0, 0],
        ]);
        let parent_elements = vec![5, 1, 3, 2, 4];
        let mut l = list(vec![partition(9, &parent_elements)]);

        Refiner::new(&t).refine(&mut l).unwrap().unwrap();

        let mut covered = l.partitions()
            .iter()
            .flat_map(|p| p.elements().iter().copied())
            .collect::<Vec<_>>();
        covered.sort_unstable();
        assert_eq!(covered, vec![1, 2, 3, 4, 5]);
        assert!(l.partitions().iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn xor_table_is_degenerate() {
        // neither feature alone reduces entropy, so the step is a no-op
        let t = table(vec![
            vec![0, 0, 0],
            vec![0, 1, 1],
            vec![1, 0, 1],
            vec![1, 1, 0],
        ]);
        let mut l = list(vec![partition(1, &[1, 2, 3, 4])]);
        let before = l.clone();

        let report = Refiner::new(&t).refine(&mut l).unwrap();
        assert_eq!(report, None);
        assert_eq!(l, before);
    }

    #[test]
    fn uniform_labels_are_a_noop() {
        let t = table(vec![
            vec![0, 1, 0],
            vec![1, 0, 0],
            vec![2, 2, 0],
        ]);
        let mut l = list(vec![partition(1, &[1, 2, 3])]);
        let before = l.clone();

        assert_eq!(Refiner::new(&t).refine(&mut l).unwrap(), None);
        assert_eq!(l, before);
    }

    #[test]
    fn uniform_partition_is_never_selected() {
        // partition 1 is label-pure (F = 0); partition 2 has a perfect
        // feature and must win despite being smaller
        let t = table(vec![
            vec![0, 1, 0],
            vec![1, 0, 0],
            vec![0, 2, 0],
            vec![1, 1, 0],
            vec![0, 0, 0],
            vec![1, 0, 1],
        ]);
        let l = list(vec![
            partition(1, &[1, 2, 3, 4]),
            partition(2, &[5, 6]),
        ]);

        let candidate = Refiner::new(&t).best_split(&l).unwrap().unwrap();
        assert_eq!(candidate.partition, 2);
        assert_eq!(candidate.feature, 0);
        let expected = 2.0 / 6.0;
        assert!(
            (candidate.f_value - expected).abs() < TEST_TOLERANCE,
            "expected {expected}, got {}", candidate.f_value,
        );
    }

    #[test]
    fn tie_breaks_on_the_first_feature() {
        // both feature columns are identical copies of the label
        let t = table(vec![
            vec![0, 0, 0],
            vec![1, 1, 1],
        ]);
        let l = list(vec![partition(1, &[1, 2])]);

        let candidate = Refiner::new(&t).best_split(&l).unwrap().unwrap();
        assert_eq!(candidate.feature, 0);
    }

    #[test]
    fn tie_breaks_on_the_first_partition() {
        // two symmetric partitions with equal F-value
        let t = table(vec![
            vec![0, 0, 0],
            vec![1, 0, 1],
            vec![0, 0, 0],
            vec![1, 0, 1],
        ]);
        let l = list(vec![
            partition(4, &[1, 2]),
            partition(8, &[3, 4]),
        ]);

        let candidate = Refiner::new(&t).best_split(&l).unwrap().unwrap();
        assert_eq!(candidate.partition, 4);
    }

    #[test]
    fn selection_is_idempotent() {
        let t = table(vec![
            vec![0, 1, 0],
            vec![1, 2, 1],
            vec![2, 0, 0],
            vec![0, 1, 1],
        ]);
        let l = list(vec![
            partition(3, &[1, 2]),
            partition(5, &[3, 4]),
        ]);

        let refiner = Refiner::new(&t);
        let first = refiner.best_split(&l).unwrap();
        let second = refiner.best_split(&l).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn derived_child_id_collision_is_reported() {
        let t = table(vec![
            vec![0, 0, 0],
            vec![0, 1, 0],
            vec![1, 0, 1],
            vec![1, 1, 1],
            vec![0, 0, 0],
        ]);
        // partition 1 will split into 11/12, but 11 is already taken
        let mut l = list(vec![
            partition(1, &[1, 2, 3, 4]),
            partition(11, &[5]),
        ]);

        let err = Refiner::new(&t).refine(&mut l).unwrap_err();
        assert!(matches!(err, Error::ChildIdCollision(11)), "got {err:?}");
    }

    #[test]
    fn domain_violations_abort_the_step() {
        let t = table(vec![
            vec![0, 0, 0],
            vec![0, 1, 5],
        ]);
        let mut l = list(vec![partition(1, &[1, 2])]);

        let err = Refiner::new(&t).refine(&mut l).unwrap_err();
        assert!(
            matches!(err, Error::LabelDomain { row: 2, value: 5, .. }),
            "got {err:?}",
        );
    }

    #[test]
    fn report_line_matches_the_expected_shape() {
        let report = SplitReport {
            parent: 1,
            children: vec![11, 13],
            feature: 2,
        };
        assert_eq!(
            report.to_string(),
            "partition 1 was replaced by 11 13 using feature 2",
        );
    }
}
