//! Decision Tree Classifier
use super::entropy::{class_counts, majority_label, select_best_attribute};
use super::node::{GainRecord, TreeNode};
use crate::data::dataset::{Attribute, Category, Dataset};
use crate::errors::{MetricsError, TreeError};
use crate::metrics::confusion::ClassificationMetrics;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

/// Per-row outcome of scoring a fitted tree on labelled rows.
#[derive(Debug)]
pub struct Evaluation<YT: Category> {
    /// True labels of the rows that reached a leaf.
    pub labels: DVector<YT>,
    /// Predictions for those rows, in the same order.
    pub predictions: DVector<YT>,
    /// Rows that stopped at a value no branch was grown for.
    pub unclassified: Vec<(usize, TreeError)>,
}

impl<YT: Category> Evaluation<YT> {
    pub fn n_classified(&self) -> usize {
        self.predictions.len()
    }
}

/// ID3 decision tree classifier over categorical features.
///
/// The tree splits on the attribute with the highest information gain and
/// recurses until every node is label-pure or no attributes remain.
#[derive(Clone, Debug)]
pub struct DecisionTreeClassifier<XT: Category, YT: Category> {
    root: Option<TreeNode<XT, YT>>,
    parallel: bool,
}

impl<XT: Category, YT: Category> Default for DecisionTreeClassifier<XT, YT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<XT: Category, YT: Category> ClassificationMetrics<YT> for DecisionTreeClassifier<XT, YT> {}

impl<XT: Category, YT: Category> DecisionTreeClassifier<XT, YT> {
    /// Creates an unfitted classifier that evaluates attribute gains in
    /// parallel.
    pub fn new() -> Self {
        Self {
            root: None,
            parallel: true,
        }
    }

    /// Sets whether attribute gains are computed on the rayon thread pool.
    /// The learned tree is the same either way.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// The learned tree, once [`fit`](Self::fit) has succeeded.
    pub fn root(&self) -> Option<&TreeNode<XT, YT>> {
        self.root.as_ref()
    }

    /// Builds the decision tree from a dataset, using every feature column.
    ///
    /// # Arguments
    ///
    /// * `dataset` - The dataset containing features and labels.
    ///
    /// # Returns
    ///
    /// A string indicating that the tree was built successfully.
    ///
    /// # Errors
    ///
    /// This method will return an error if the dataset has no rows.
    pub fn fit(&mut self, dataset: &Dataset<XT, YT>) -> Result<String, TreeError> {
        let root = self.build_tree(dataset, &dataset.attributes(), None)?;
        info!(
            "Finished building the tree: depth {}, {} leaves",
            root.depth(),
            root.n_leaves()
        );
        self.root = Some(root);
        Ok("Finished building the tree.".into())
    }

    /// Grows a subtree for `dataset` using only `attributes`.
    ///
    /// `parent` holds the rows of the calling level and is `None` at the
    /// root. The rules are applied in order:
    ///
    /// 1. If every row has the same label, return a leaf with that label.
    /// 2. If no attributes remain, return a leaf with the majority label of
    ///    `parent` (of `dataset` itself at the root).
    /// 3. Otherwise split on the attribute with the highest information gain
    ///    and recurse into one branch per value observed in `dataset`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyDataset`] if `dataset` has no rows and a
    /// dataset error if an attribute column is outside the feature matrix.
    pub fn build_tree(
        &self,
        dataset: &Dataset<XT, YT>,
        attributes: &[Attribute],
        parent: Option<&Dataset<XT, YT>>,
    ) -> Result<TreeNode<XT, YT>, TreeError> {
        let mut counts = class_counts(&dataset.y);
        if counts.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        if counts.len() == 1 {
            let (value, _) = counts.swap_remove(0);
            return Ok(TreeNode::leaf(value));
        }

        if attributes.is_empty() {
            let fallback = parent.unwrap_or(dataset);
            let value = majority_label(&fallback.y)?;
            debug!(
                "No attributes left for {} mixed rows, falling back to majority label {}",
                dataset.nrows(),
                value
            );
            return Ok(TreeNode::leaf(value));
        }

        let (index, gain) = select_best_attribute(dataset, attributes, self.parallel)?;
        let chosen = &attributes[index];
        info!("Parent node: {}, Information Gain: {:.4}", chosen.name, gain);

        let remaining = attributes
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .map(|(_, attribute)| attribute.clone())
            .collect::<Vec<_>>();

        let branches = dataset
            .partition(chosen.column)?
            .into_iter()
            .map(|(value, bucket)| {
                let child = self.build_tree(&bucket, &remaining, Some(dataset))?;
                Ok((value, child))
            })
            .collect::<Result<Vec<_>, TreeError>>()?;

        Ok(TreeNode::Decision {
            attribute: chosen.name.clone(),
            column: chosen.column,
            gain,
            branches,
        })
    }

    /// Gains of every decision node in the learned tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotFitted`] if the tree wasn't built yet.
    pub fn gain_record(&self) -> Result<GainRecord, TreeError> {
        self.root
            .as_ref()
            .map(TreeNode::gain_record)
            .ok_or(TreeError::NotFitted)
    }

    /// Predicts a label for every row of `features`.
    ///
    /// Columns are matched by position with the training features.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotFitted`] before [`fit`](Self::fit), and
    /// [`TreeError::UnseenValue`] when a row carries a value that no branch
    /// was grown for.
    pub fn predict(&self, features: &DMatrix<XT>) -> Result<DVector<YT>, TreeError> {
        let root = self.root.as_ref().ok_or(TreeError::NotFitted)?;
        let predictions = (0..features.nrows())
            .map(|row| root.classify(features, row).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DVector::from_vec(predictions))
    }

    /// Classifies every row of `dataset` on its own, so a single unseen
    /// value only sets its own row aside instead of failing the batch.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotFitted`] before [`fit`](Self::fit) and
    /// [`TreeError::WidthMismatch`] when the rows are narrower than the tree
    /// expects.
    pub fn evaluate(&self, dataset: &Dataset<XT, YT>) -> Result<Evaluation<YT>, TreeError> {
        let root = self.root.as_ref().ok_or(TreeError::NotFitted)?;
        let mut labels = Vec::new();
        let mut predictions = Vec::new();
        let mut unclassified = Vec::new();

        for row in 0..dataset.nrows() {
            match root.classify(&dataset.x, row) {
                Ok(prediction) => {
                    labels.push(dataset.y[row].clone());
                    predictions.push(prediction.clone());
                }
                Err(err @ TreeError::UnseenValue { .. }) => unclassified.push((row, err)),
                Err(err) => return Err(err),
            }
        }

        Ok(Evaluation {
            labels: DVector::from_vec(labels),
            predictions: DVector::from_vec(predictions),
            unclassified,
        })
    }

    /// Accuracy over the rows of an [`Evaluation`] that reached a leaf.
    pub fn evaluation_accuracy(&self, evaluation: &Evaluation<YT>) -> Result<f64, MetricsError> {
        self.accuracy(&evaluation.labels, &evaluation.predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dataset(headers: &[&str], rows: &[Vec<&str>]) -> Dataset<String, String> {
        Dataset::from_records(headers, rows).unwrap()
    }

    fn fitted(data: &Dataset<String, String>) -> DecisionTreeClassifier<String, String> {
        let mut classifier = DecisionTreeClassifier::new();
        classifier.fit(data).unwrap();
        classifier
    }

    fn leaf_value(node: &TreeNode<String, String>) -> &str {
        match node {
            TreeNode::Leaf { value } => value,
            other => panic!("expected a leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_new() {
        let classifier = DecisionTreeClassifier::<String, String>::new();
        assert!(classifier.root().is_none());
        assert!(classifier.parallel());
    }

    #[test]
    fn test_pure_dataset_is_a_leaf() {
        let data = dataset(
            &["A", "B", "Play"],
            &[vec!["x", "p", "Yes"], vec!["y", "q", "Yes"], vec!["x", "q", "Yes"]],
        );
        let classifier = fitted(&data);
        let root = classifier.root().unwrap();
        assert_eq!(leaf_value(root), "Yes");
        assert!(classifier.gain_record().unwrap().is_empty());
    }

    #[test]
    fn test_perfect_split_has_depth_one() {
        let data = dataset(
            &["Weather", "Temp", "Play"],
            &[
                vec!["Sunny", "Hot", "No"],
                vec!["Sunny", "Cool", "No"],
                vec!["Rain", "Cool", "Yes"],
                vec!["Rain", "Hot", "Yes"],
            ],
        );
        let classifier = fitted(&data);
        let root = classifier.root().unwrap();

        assert_eq!(root.depth(), 1);
        match root {
            TreeNode::Decision {
                attribute,
                gain,
                branches,
                ..
            } => {
                assert_eq!(attribute, "Weather");
                assert_relative_eq!(*gain, 1.0);
                assert_eq!(branches.len(), 2);
                assert_eq!(branches[0].0, "Sunny");
                assert_eq!(leaf_value(&branches[0].1), "No");
                assert_eq!(branches[1].0, "Rain");
                assert_eq!(leaf_value(&branches[1].1), "Yes");
            }
            other => panic!("expected a decision node, got {other:?}"),
        }
    }

    #[test]
    fn test_weather_temp_example_splits_on_temp() {
        let data = dataset(
            &["Weather", "Temp", "Play"],
            &[
                vec!["Sunny", "Hot", "No"],
                vec!["Sunny", "Cool", "Yes"],
                vec!["Rain", "Cool", "Yes"],
                vec!["Rain", "Hot", "No"],
            ],
        );
        let classifier = fitted(&data);
        let root = classifier.root().unwrap();

        assert_eq!(root.depth(), 1);
        assert_eq!(leaf_value(root.branch(&"Hot".to_string()).unwrap()), "No");
        assert_eq!(leaf_value(root.branch(&"Cool".to_string()).unwrap()), "Yes");
        assert_relative_eq!(classifier.gain_record().unwrap().get(0).unwrap(), 1.0);
    }

    #[test]
    fn test_exhausted_attributes_use_parent_majority() {
        let classifier = DecisionTreeClassifier::<String, String>::new();
        let parent = dataset(
            &["A", "Play"],
            &[vec!["x", "Yes"], vec!["x", "No"], vec!["y", "No"]],
        );
        let rows = parent.select(&[0, 1]);

        // The rows alone tie and would pick "Yes"; the parent says "No".
        let leaf = classifier.build_tree(&rows, &[], Some(&parent)).unwrap();
        assert_eq!(leaf_value(&leaf), "No");
    }

    #[test]
    fn test_exhausted_attributes_at_root_use_own_majority() {
        let classifier = DecisionTreeClassifier::<String, String>::new();
        let data = dataset(&["Play"], &[vec!["No"], vec!["Yes"], vec!["Yes"]]);

        let leaf = classifier.build_tree(&data, &[], None).unwrap();
        assert_eq!(leaf_value(&leaf), "Yes");
    }

    #[test]
    fn test_inconsistent_rows_fall_back_to_parent() {
        let data = dataset(
            &["A", "Play"],
            &[vec!["a", "Yes"], vec!["a", "No"], vec!["b", "No"]],
        );
        let classifier = fitted(&data);
        let root = classifier.root().unwrap();

        assert_eq!(leaf_value(root.branch(&"a".to_string()).unwrap()), "No");
        assert_eq!(leaf_value(root.branch(&"b".to_string()).unwrap()), "No");
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let classifier = DecisionTreeClassifier::<String, String>::new();
        let data = dataset(&["A", "Play"], &[vec!["a", "Yes"]]).select(&[]);

        let result = classifier.build_tree(&data, &data.attributes(), None);
        assert!(matches!(result, Err(TreeError::EmptyDataset)));
    }

    #[test]
    fn test_no_branch_for_unobserved_values() {
        let data = dataset(
            &["Outlook", "Wind", "Play"],
            &[
                vec!["Sunny", "Weak", "No"],
                vec!["Sunny", "Strong", "No"],
                vec!["Rain", "Weak", "Yes"],
                vec!["Rain", "Strong", "No"],
                vec!["Overcast", "Weak", "Yes"],
            ],
        );
        let classifier = fitted(&data);
        let root = classifier.root().unwrap();

        let rain = root.branch(&"Rain".to_string()).unwrap();
        assert!(rain.branch(&"Weak".to_string()).is_some());
        assert!(rain.branch(&"Strong".to_string()).is_some());

        // "Overcast" only ever occurs with "Weak", so its subtree is a leaf
        // and never branches on "Strong".
        let overcast = root.branch(&"Overcast".to_string()).unwrap();
        assert!(overcast.is_leaf());
    }

    #[test]
    fn test_gain_record_matches_every_decision_node() {
        let data = dataset(
            &["Outlook", "Humidity", "Wind", "Play"],
            &[
                vec!["Sunny", "High", "Weak", "No"],
                vec!["Sunny", "High", "Strong", "No"],
                vec!["Overcast", "High", "Weak", "Yes"],
                vec!["Rain", "High", "Weak", "Yes"],
                vec!["Rain", "Normal", "Weak", "Yes"],
                vec!["Rain", "Normal", "Strong", "No"],
                vec!["Overcast", "Normal", "Strong", "Yes"],
                vec!["Sunny", "High", "Weak", "No"],
                vec!["Sunny", "Normal", "Weak", "Yes"],
                vec!["Rain", "Normal", "Weak", "Yes"],
                vec!["Sunny", "Normal", "Strong", "Yes"],
                vec!["Overcast", "High", "Strong", "Yes"],
                vec!["Overcast", "Normal", "Weak", "Yes"],
                vec!["Rain", "High", "Strong", "No"],
            ],
        );
        let classifier = fitted(&data);
        let root = classifier.root().unwrap();
        let record = classifier.gain_record().unwrap();

        let mut decisions = 0;
        root.walk(|visit| {
            if let TreeNode::Decision { gain, .. } = visit.node {
                decisions += 1;
                assert_eq!(record.get(visit.id), Some(*gain));
            }
        });
        assert_eq!(decisions, record.len());
        assert!(decisions >= 2);

        match root {
            TreeNode::Decision { attribute, .. } => assert_eq!(attribute, "Outlook"),
            other => panic!("expected a decision node, got {other:?}"),
        }
    }

    #[test]
    fn test_gain_record_keeps_nodes_with_the_same_name_apart() {
        // Both feature columns are called "X"; the root splits on the first
        // and the "a" branch splits on the second.
        let data = dataset(
            &["X", "X", "Label"],
            &[
                vec!["a", "p", "Yes"],
                vec!["a", "q", "No"],
                vec!["b", "p", "No"],
                vec!["b", "q", "No"],
                vec!["b", "p", "No"],
            ],
        );
        let classifier = fitted(&data);
        let record = classifier.gain_record().unwrap();

        let gains = record.by_attribute("X");
        assert_eq!(gains.len(), 2);
        let expected = 0.2f64.log2() * -0.2 - 0.8 * 0.8f64.log2() - 0.4;
        assert_relative_eq!(gains[0], expected, epsilon = 1e-12);
        assert_relative_eq!(gains[1], 1.0);
    }

    #[test]
    fn test_fit_is_deterministic_across_parallelism() {
        let data = dataset(
            &["A", "B", "C", "Label"],
            &[
                vec!["x", "p", "m", "yes"],
                vec!["x", "q", "m", "no"],
                vec!["y", "p", "n", "no"],
                vec!["y", "q", "n", "yes"],
                vec!["z", "p", "m", "yes"],
                vec!["z", "q", "n", "no"],
            ],
        );
        let parallel = fitted(&data);
        let mut sequential = DecisionTreeClassifier::new();
        sequential.set_parallel(false);
        sequential.fit(&data).unwrap();

        assert_eq!(parallel.root(), sequential.root());
    }

    #[test]
    fn test_predict() {
        let data = dataset(
            &["Weather", "Temp", "Play"],
            &[
                vec!["Sunny", "Hot", "No"],
                vec!["Sunny", "Cool", "No"],
                vec!["Rain", "Cool", "Yes"],
                vec!["Rain", "Hot", "Yes"],
            ],
        );
        let classifier = fitted(&data);
        let predictions = classifier.predict(&data.x).unwrap();

        assert_eq!(predictions, data.y);
        assert_relative_eq!(classifier.accuracy(&data.y, &predictions).unwrap(), 1.0);
    }

    #[test]
    fn test_predict_before_fit() {
        let classifier = DecisionTreeClassifier::<String, String>::new();
        let x = DMatrix::from_row_slice(1, 1, &["a".to_string()]);
        assert!(matches!(classifier.predict(&x), Err(TreeError::NotFitted)));
        assert!(matches!(classifier.gain_record(), Err(TreeError::NotFitted)));
    }

    #[test]
    fn test_predict_unseen_value() {
        let data = dataset(
            &["Weather", "Play"],
            &[vec!["Sunny", "No"], vec!["Rain", "Yes"]],
        );
        let classifier = fitted(&data);
        let x = DMatrix::from_row_slice(1, 1, &["Snow".to_string()]);

        assert!(matches!(
            classifier.predict(&x),
            Err(TreeError::UnseenValue { .. })
        ));
    }

    #[test]
    fn test_evaluate_sets_aside_unseen_rows() {
        let train = dataset(
            &["Weather", "Play"],
            &[vec!["Sunny", "No"], vec!["Rain", "Yes"]],
        );
        let classifier = fitted(&train);
        let holdout = dataset(
            &["Weather", "Play"],
            &[
                vec!["Rain", "Yes"],
                vec!["Snow", "No"],
                vec!["Sunny", "Yes"],
            ],
        );

        let evaluation = classifier.evaluate(&holdout).unwrap();

        assert_eq!(evaluation.n_classified(), 2);
        assert_eq!(evaluation.predictions.as_slice(), &["Yes", "No"]);
        assert_eq!(evaluation.unclassified.len(), 1);
        assert!(matches!(
            &evaluation.unclassified[0],
            (1, TreeError::UnseenValue { value, .. }) if value == "Snow"
        ));
        assert_relative_eq!(classifier.evaluation_accuracy(&evaluation).unwrap(), 0.5);
    }

    #[test]
    fn test_evaluate_before_fit() {
        let classifier = DecisionTreeClassifier::<String, String>::new();
        let holdout = dataset(&["Weather", "Play"], &[vec!["Rain", "Yes"]]);
        assert!(matches!(classifier.evaluate(&holdout), Err(TreeError::NotFitted)));
    }
}
