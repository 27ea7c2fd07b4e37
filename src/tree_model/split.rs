use thiserror_no_std::Error;

use super::node::{Comparator, SplitInfo, SplitKind};
use crate::{Attribute, AttributeKind, TrainingSet, Value};

/// Two candidate errors closer than this are considered equal.
pub(crate) const EPSILON: f64 = 1e-5;

/// No split of the range exists for some attribute: every example holds the
/// same value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no best explanatory value found")]
pub struct NoViableSplit;

/// Best split found for one attribute over one range.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SplitCandidate {
    pub attribute: Attribute,
    pub kind: SplitKind,
    pub branches: Vec<SplitInfo>,
    /// Sum of the branches' squared errors.
    pub error: f64,
}

impl SplitCandidate {
    fn new(
        training_set: &TrainingSet,
        attribute: &Attribute,
        kind: SplitKind,
        branches: Vec<SplitInfo>,
    ) -> Self {
        let error = branches
            .iter()
            .map(|branch| training_set.sum_of_squared_errors(branch.begin(), branch.end()))
            .sum();
        Self {
            attribute: attribute.clone(),
            kind,
            branches,
            error,
        }
    }
}

/// Sorts `[begin, end]` by `attribute` and searches its best split.
pub(crate) fn split_candidate(
    training_set: &mut TrainingSet,
    begin: usize,
    end: usize,
    attribute: &Attribute,
) -> Result<SplitCandidate, NoViableSplit> {
    training_set.sort(attribute, begin, end);
    match attribute.kind() {
        AttributeKind::Discrete { .. } => Ok(discrete_split(training_set, begin, end, attribute)),
        AttributeKind::Continuous => continuous_split(training_set, begin, end, attribute),
    }
}

/// One branch per run of equal values of a range sorted by `attribute`.
fn discrete_split(
    training_set: &TrainingSet,
    begin: usize,
    end: usize,
    attribute: &Attribute,
) -> SplitCandidate {
    let column = attribute.index();
    let mut branches = Vec::new();
    let mut run_start = begin;
    for i in begin..end {
        let value = training_set.explanatory_value(i, column);
        if value != training_set.explanatory_value(i + 1, column) {
            branches.push(SplitInfo::new(
                value.clone(),
                run_start,
                i,
                branches.len(),
                Comparator::Equal,
            ));
            run_start = i + 1;
        }
    }
    branches.push(SplitInfo::new(
        training_set.explanatory_value(end, column).clone(),
        run_start,
        end,
        branches.len(),
        Comparator::Equal,
    ));
    SplitCandidate::new(training_set, attribute, SplitKind::Discrete, branches)
}

/// Best `<=` / `>` threshold of a range sorted by `attribute`.
///
/// Every change of value is a candidate threshold; the first candidate with
/// the lowest total error wins. A right branch holding a single example is
/// dropped, which leaves a one-branch split.
fn continuous_split(
    training_set: &TrainingSet,
    begin: usize,
    end: usize,
    attribute: &Attribute,
) -> Result<SplitCandidate, NoViableSplit> {
    let column = attribute.index();
    let mut previous = training_set.explanatory_value(begin, column);
    // (error, first index of the right range, threshold)
    let mut best: Option<(f64, usize, &Value)> = None;
    for i in begin + 1..=end {
        let value = training_set.explanatory_value(i, column);
        if value != previous {
            let error = training_set.sum_of_squared_errors(begin, i - 1)
                + training_set.sum_of_squared_errors(i, end);
            if best.map_or(true, |(best_error, _, _)| error < best_error) {
                best = Some((error, i, previous));
            }
            previous = value;
        }
    }
    let (_, split, threshold) = best.ok_or(NoViableSplit)?;
    let mut branches = vec![
        SplitInfo::new(threshold.clone(), begin, split - 1, 0, Comparator::LessOrEqual),
        SplitInfo::new(threshold.clone(), split, end, 1, Comparator::Greater),
    ];
    if split == end {
        branches.pop();
    }
    Ok(SplitCandidate::new(
        training_set,
        attribute,
        SplitKind::Continuous,
        branches,
    ))
}

/// Evaluates every explanatory attribute over `[begin, end]` and returns the
/// candidate of lowest error, leaving the range sorted by its attribute.
///
/// Candidates are scanned in attribute order and a later one only replaces
/// the current best when it is lower by at least [`EPSILON`]. Any attribute
/// without a viable split fails the whole search.
pub(crate) fn best_split(
    training_set: &mut TrainingSet,
    begin: usize,
    end: usize,
) -> Result<SplitCandidate, NoViableSplit> {
    let attributes = training_set.explanatory_attributes().to_vec();
    let mut best: Option<SplitCandidate> = None;
    for attribute in &attributes {
        let candidate = split_candidate(training_set, begin, end, attribute)?;
        let replace = best
            .as_ref()
            .map_or(true, |current| current.error - candidate.error >= EPSILON);
        if replace {
            best = Some(candidate);
        }
    }
    let best = best.ok_or(NoViableSplit)?;
    // the range is still ordered by the last attribute evaluated
    training_set.sort(&best.attribute, begin, end);
    Ok(best)
}
