use std::collections::BTreeSet;

use nalgebra::{DMatrix, DVector};

use crate::data::dataset::Category;
use crate::errors::MetricsError;

type ConfusionMatrix = DMatrix<usize>;

pub trait ClassificationMetrics<T: Category> {
    /// Every label occurring in either vector, in sorted order.
    ///
    /// This is the row and column order of [`confusion_matrix`](Self::confusion_matrix).
    fn classes(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Vec<T> {
        y_true
            .iter()
            .chain(y_pred.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Computes the confusion matrix based on the true labels and predicted labels.
    ///
    /// Rows are true labels and columns predicted labels, both ordered as
    /// returned by [`classes`](Self::classes).
    ///
    /// # Arguments
    ///
    /// * `y_true` - The true labels.
    /// * `y_pred` - The predicted labels.
    ///
    /// # Returns
    ///
    /// The confusion matrix, or [`MetricsError::LengthMismatch`] when the
    /// vectors differ in length.
    fn confusion_matrix(
        &self,
        y_true: &DVector<T>,
        y_pred: &DVector<T>,
    ) -> Result<ConfusionMatrix, MetricsError> {
        if y_true.len() != y_pred.len() {
            return Err(MetricsError::LengthMismatch {
                labels: y_true.len(),
                predictions: y_pred.len(),
            });
        }

        let classes = self.classes(y_true, y_pred);
        let mut matrix = DMatrix::zeros(classes.len(), classes.len());

        for (y_t, y_p) in y_true.iter().zip(y_pred.iter()) {
            let matrix_row = classes
                .binary_search(y_t)
                .map_err(|_| MetricsError::MissingClass(y_t.to_string()))?;
            let matrix_col = classes
                .binary_search(y_p)
                .map_err(|_| MetricsError::MissingClass(y_p.to_string()))?;
            matrix[(matrix_row, matrix_col)] += 1;
        }

        Ok(matrix)
    }

    /// Computes the accuracy based on the true labels and predicted labels.
    ///
    /// # Arguments
    ///
    /// * `y_true` - The true labels.
    /// * `y_pred` - The predicted labels.
    ///
    /// # Returns
    ///
    /// The fraction of matching labels, or [`MetricsError::NoPredictions`]
    /// for empty input.
    fn accuracy(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<f64, MetricsError> {
        if y_true.is_empty() {
            return Err(MetricsError::NoPredictions);
        }
        let matrix = self.confusion_matrix(y_true, y_pred)?;

        let correct = matrix.diagonal().iter().sum::<usize>();

        Ok(correct as f64 / y_true.len() as f64)
    }
}
