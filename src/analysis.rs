//! Entropy and information-gain computations over row subsets.
//!
//! Everything here is a pure function of the table and an index subset;
//! no state is kept between calls. Probabilities of an empty subset are
//! defined as all zero, so an empty subset always has zero entropy and
//! never raises.

use crate::error::Error;
use crate::table::DataTable;

/// Binary Shannon entropy `-p0*log2(p0) - p1*log2(p1)`.
///
/// A zero probability contributes exactly zero, so no NaN or infinity
/// leaks out of the `p*log2(p)` terms. The inputs are expected, but not
/// enforced, to sum to one.
#[inline]
pub fn entropy(p0: f64, p1: f64) -> f64 {
    plogp(p0) + plogp(p1)
}

#[inline(always)]
fn plogp(p: f64) -> f64 {
    if p <= 0.0 { 0.0 } else { -p * p.log2() }
}

/// Class probabilities of the target label over `indices`.
///
/// The returned vector has one entry per allowed label value. An empty
/// subset yields all zeros. A label outside the schema's domain is a
/// data-integrity violation and reported as an error.
pub fn label_distribution(table: &DataTable, indices: &[usize])
    -> Result<Vec<f64>, Error>
{
    let arity = table.schema().label_arity();
    let mut counts = vec![0_usize; arity as usize];
    for &index in indices {
        let label = table.label(index);
        if label >= arity {
            return Err(Error::LabelDomain { row: index, value: label, arity });
        }
        counts[label as usize] += 1;
    }

    let size = indices.len();
    if size == 0 {
        return Ok(vec![0.0; arity as usize]);
    }
    Ok(counts.into_iter().map(|c| c as f64 / size as f64).collect())
}

/// Entropy of the target label over `indices`.
///
/// Zero for an empty subset and for a subset whose labels are uniform.
pub fn entropy_over_partition(table: &DataTable, indices: &[usize])
    -> Result<f64, Error>
{
    let distribution = label_distribution(table, indices)?;
    Ok(distribution.into_iter().map(plogp).sum())
}

/// Fraction of rows in `indices` taking each allowed value of `feature`.
///
/// The returned vector has one entry per allowed feature value. An empty
/// subset yields all zeros. A cell outside the schema's domain is a
/// data-integrity violation and reported as an error.
pub fn probability_distribution(table: &DataTable, indices: &[usize], feature: usize)
    -> Result<Vec<f64>, Error>
{
    let arity = table.schema().feature_arity();
    let mut counts = vec![0_usize; arity as usize];
    for &index in indices {
        let value = table.cell(index, feature);
        if value >= arity {
            return Err(Error::FeatureDomain {
                row: index,
                column: feature + 1,
                value,
                arity,
            });
        }
        counts[value as usize] += 1;
    }

    let size = indices.len();
    if size == 0 {
        return Ok(vec![0.0; arity as usize]);
    }
    Ok(counts.into_iter().map(|c| c as f64 / size as f64).collect())
}

/// Conditional entropy of the label given `feature`, over `indices`:
/// the per-feature-value label entropies weighted by the feature-value
/// probabilities.
///
/// A feature value that never occurs in the subset contributes zero
/// weight and zero entropy, so entropy is never computed over an empty
/// group.
pub fn entropy_over_feature(table: &DataTable, indices: &[usize], feature: usize)
    -> Result<f64, Error>
{
    let probabilities = probability_distribution(table, indices, feature)?;

    let mut acc = 0.0;
    for (value, p) in probabilities.into_iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        let group = indices.iter()
            .copied()
            .filter(|&index| table.cell(index, feature) as usize == value)
            .collect::<Vec<_>>();
        acc += p * entropy_over_partition(table, &group)?;
    }
    Ok(acc)
}

/// Information gain of splitting `indices` by `feature`:
/// `entropy_over_partition - entropy_over_feature`.
///
/// Non-negative up to floating-point rounding.
pub fn information_gain(table: &DataTable, indices: &[usize], feature: usize)
    -> Result<f64, Error>
{
    let e_s = entropy_over_partition(table, indices)?;
    let e_f = entropy_over_feature(table, indices, feature)?;
    Ok(e_s - e_f)
}
