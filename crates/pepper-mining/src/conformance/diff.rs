//! Ordered-sequence diff between a model and a case.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One difference between a model sequence and a case sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffOp {
    /// Expected by the model but absent from the case.
    Deleted {
        /// Activity label.
        activity: String,
        /// Position in the model sequence.
        model_position: usize,
    },
    /// Present in the case but not expected at this point.
    Inserted {
        /// Activity label.
        activity: String,
        /// Position in the case sequence.
        case_position: usize,
    },
    /// Expected by the model but executed out of order.
    Moved {
        /// Activity label.
        activity: String,
        /// Position in the model sequence.
        model_position: usize,
        /// Position in the case sequence.
        case_position: usize,
    },
}

impl DiffOp {
    /// Activity the difference is about.
    pub fn activity(&self) -> &str {
        match self {
            DiffOp::Deleted { activity, .. }
            | DiffOp::Inserted { activity, .. }
            | DiffOp::Moved { activity, .. } => activity,
        }
    }

    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            DiffOp::Deleted { .. } => "Deleted",
            DiffOp::Inserted { .. } => "Inserted",
            DiffOp::Moved { .. } => "Moved",
        }
    }
}

impl fmt::Display for DiffOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffOp::Deleted {
                activity,
                model_position,
            } => write!(f, "deleted \"{}\" (model position {})", activity, model_position),
            DiffOp::Inserted {
                activity,
                case_position,
            } => write!(f, "inserted \"{}\" (case position {})", activity, case_position),
            DiffOp::Moved {
                activity,
                model_position,
                case_position,
            } => write!(
                f,
                "moved \"{}\" (model position {}, case position {})",
                activity, model_position, case_position
            ),
        }
    }
}

/// Edit script turning a model sequence into a case sequence.
///
/// Built from a longest common subsequence: activities outside the LCS are
/// deletions (model side) or insertions (case side). A deletion and an
/// insertion of the same activity are reported as one [`DiffOp::Moved`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDiff {
    ops: Vec<DiffOp>,
}

impl SequenceDiff {
    /// Diff `case` against `model`.
    pub fn compute<M, C>(model: &[M], case: &[C]) -> Self
    where
        M: AsRef<str>,
        C: AsRef<str>,
    {
        let (n, m) = (model.len(), case.len());

        // lcs[i][j] = LCS length of model[i..] and case[j..]
        let mut lcs = vec![vec![0usize; m + 1]; n + 1];
        for i in (0..n).rev() {
            for j in (0..m).rev() {
                lcs[i][j] = if model[i].as_ref() == case[j].as_ref() {
                    lcs[i + 1][j + 1] + 1
                } else {
                    lcs[i + 1][j].max(lcs[i][j + 1])
                };
            }
        }

        let mut deleted = Vec::new();
        let mut inserted = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < n && j < m {
            if model[i].as_ref() == case[j].as_ref() {
                i += 1;
                j += 1;
            } else if lcs[i + 1][j] >= lcs[i][j + 1] {
                deleted.push(i);
                i += 1;
            } else {
                inserted.push(j);
                j += 1;
            }
        }
        deleted.extend(i..n);
        inserted.extend(j..m);

        let mut ops = Vec::with_capacity(deleted.len() + inserted.len());
        let mut paired = vec![false; inserted.len()];
        for model_position in deleted {
            let activity = model[model_position].as_ref();
            let partner = inserted
                .iter()
                .enumerate()
                .find(|&(k, &j)| !paired[k] && case[j].as_ref() == activity);
            match partner {
                Some((k, &case_position)) => {
                    paired[k] = true;
                    ops.push(DiffOp::Moved {
                        activity: activity.to_string(),
                        model_position,
                        case_position,
                    });
                }
                None => ops.push(DiffOp::Deleted {
                    activity: activity.to_string(),
                    model_position,
                }),
            }
        }
        ops.extend(
            inserted
                .iter()
                .zip(&paired)
                .filter(|(_, paired)| !**paired)
                .map(|(&case_position, _)| DiffOp::Inserted {
                    activity: case[case_position].as_ref().to_string(),
                    case_position,
                }),
        );

        Self { ops }
    }

    /// Differences, deletions and moves first.
    pub fn ops(&self) -> &[DiffOp] {
        &self.ops
    }

    /// Number of differences.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the sequences match exactly.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Activities expected by the model but missing from the case.
    pub fn deleted(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DiffOp::Deleted { activity, .. } => Some(activity.as_str()),
            _ => None,
        })
    }

    /// Activities executed but not expected.
    pub fn inserted(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DiffOp::Inserted { activity, .. } => Some(activity.as_str()),
            _ => None,
        })
    }

    /// Activities executed out of order.
    pub fn moved(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DiffOp::Moved { activity, .. } => Some(activity.as_str()),
            _ => None,
        })
    }
}
