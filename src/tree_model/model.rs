use ndarray::{Array1, Array2, Axis};

use super::RegressionTree;
use crate::{PredictError, RegressionModel, TrainingDataError, TrainingSet, TreeSettings, Value};

/// Regression tree over numerical matrices.
///
/// Every column of `x` is a continuous attribute, named `x0`, `x1`, ...
/// ```
/// use ndarray::array;
/// use regtree::{RegressionModel, RegressionTreeModel, TreeSettings};
/// let x = array![[1.], [1.], [2.], [2.]];
/// let y = array![10., 12., 100., 102.];
/// let mut model = RegressionTreeModel::new(TreeSettings { leaf_percent: 25 });
/// model.fit(&x, &y).unwrap();
/// assert_eq!(model.predict(&array![[2.], [1.]]).unwrap(), array![101., 11.]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegressionTreeModel {
    pub settings: TreeSettings,
    tree: Option<RegressionTree>,
}

impl RegressionTreeModel {
    pub fn new(settings: TreeSettings) -> Self {
        Self {
            settings,
            tree: None,
        }
    }

    /// Fitted tree, if any.
    pub fn tree(&self) -> Option<&RegressionTree> {
        self.tree.as_ref()
    }
}

impl RegressionModel for RegressionTreeModel {
    type X = Array2<f64>;
    type Y = Array1<f64>;
    type FitResult = Result<(), TrainingDataError>;
    type PredictResult = Result<Array1<f64>, PredictError>;

    fn fit(&mut self, x: &Self::X, y: &Self::Y) -> Self::FitResult {
        let mut training_set = TrainingSet::from_arrays(x.view(), y.view())?;
        self.tree = Some(RegressionTree::learn_with(
            &mut training_set,
            &self.settings,
        ));
        Ok(())
    }

    fn predict(&self, x: &Self::X) -> Self::PredictResult {
        let tree = self.tree.as_ref().ok_or(PredictError::NotFitted)?;
        x.axis_iter(Axis(0))
            .map(|row| {
                let values = row.iter().map(|v| Value::Number(*v)).collect::<Vec<_>>();
                tree.predict(&values)
            })
            .collect()
    }
}
