use crate::errors::DatasetError;
use nalgebra::{DMatrix, DVector};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::fmt::{Debug, Formatter};
use std::hash::Hash;

/// A categorical value: anything that can be compared for equality,
/// hashed into a bucket and printed on a tree edge.
pub trait Category: Debug + Clone + Eq + Hash + Ord + Display + Send + Sync + 'static {}

impl<T> Category for T where T: Debug + Clone + Eq + Hash + Ord + Display + Send + Sync + 'static
{}

/// A named feature column.
///
/// The column index always refers to the full feature matrix, so removing an
/// attribute from a list never shifts the position of the others.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub column: usize,
}

impl Attribute {
    pub fn new(name: impl Into<String>, column: usize) -> Self {
        Self {
            name: name.into(),
            column,
        }
    }
}

#[derive(Clone)]
pub struct Dataset<XT: Category, YT: Category> {
    pub x: DMatrix<XT>,
    pub y: DVector<YT>,
    feature_names: Vec<String>,
}

impl<XT: Category, YT: Category> Debug for Dataset<XT, YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset {{")?;
        writeln!(f, "    features: [{}],", self.feature_names.join(", "))?;
        writeln!(f, "    x: [")?;

        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{}, ", self.x[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ],\n    y: [")?;
        for i in 0..self.y.len() {
            write!(f, "{}, ", self.y[i])?;
        }
        write!(f, "]\n}}")
    }
}

impl<XT: Category, YT: Category> Dataset<XT, YT> {
    /// Creates a dataset with generated feature names `feature_0`, `feature_1`, ...
    ///
    /// # Errors
    ///
    /// Returns an error if the number of labels differs from the number of rows.
    pub fn new(x: DMatrix<XT>, y: DVector<YT>) -> Result<Self, DatasetError> {
        if x.nrows() != y.len() {
            return Err(DatasetError::LengthMismatch {
                rows: x.nrows(),
                labels: y.len(),
            });
        }
        let feature_names = (0..x.ncols()).map(|i| format!("feature_{i}")).collect();
        Ok(Self {
            x,
            y,
            feature_names,
        })
    }

    /// Replaces the feature names, one per column.
    pub fn with_feature_names<S: Into<String>>(
        mut self,
        names: Vec<S>,
    ) -> Result<Self, DatasetError> {
        if names.len() != self.x.ncols() {
            return Err(DatasetError::NameCount {
                expected: self.x.ncols(),
                found: names.len(),
            });
        }
        self.feature_names = names.into_iter().map(Into::into).collect();
        Ok(self)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Every feature column as an [`Attribute`], in column order.
    pub fn attributes(&self) -> Vec<Attribute> {
        self.feature_names
            .iter()
            .enumerate()
            .map(|(column, name)| Attribute::new(name.clone(), column))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    /// Copies the given rows, in the given order, into a new dataset.
    pub fn select(&self, rows: &[usize]) -> Self {
        let x = DMatrix::from_fn(rows.len(), self.x.ncols(), |i, j| {
            self.x[(rows[i], j)].clone()
        });
        let y = DVector::from_fn(rows.len(), |i, _| self.y[rows[i]].clone());

        Self {
            x,
            y,
            feature_names: self.feature_names.clone(),
        }
    }

    /// Splits the rows into one bucket per distinct value of `column`.
    ///
    /// Buckets are returned in the order their value first appears, and only
    /// values present in the rows get a bucket.
    pub fn partition(&self, column: usize) -> Result<Vec<(XT, Self)>, DatasetError> {
        if column >= self.x.ncols() {
            return Err(DatasetError::ColumnOutOfBounds {
                column,
                width: self.x.ncols(),
            });
        }

        let mut position: HashMap<&XT, usize> = HashMap::new();
        let mut buckets: Vec<(&XT, Vec<usize>)> = Vec::new();
        let column_view = self.x.column(column);
        for (row, value) in column_view.iter().enumerate() {
            match position.get(value) {
                Some(&index) => buckets[index].1.push(row),
                None => {
                    position.insert(value, buckets.len());
                    buckets.push((value, vec![row]));
                }
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(value, rows)| (value.clone(), self.select(&rows)))
            .collect())
    }

    pub fn train_test_split(
        &self,
        train_size: f64,
        seed: Option<u64>,
    ) -> Result<(Self, Self), DatasetError> {
        if !(0.0..=1.0).contains(&train_size) {
            return Err(DatasetError::InvalidSplit(train_size));
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut indices = (0..self.x.nrows()).collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let train_size = (self.x.nrows() as f64 * train_size).floor() as usize;
        let (train_indices, test_indices) = indices.split_at(train_size);

        Ok((self.select(train_indices), self.select(test_indices)))
    }
}

impl Dataset<String, String> {
    /// Builds a dataset from raw string records.
    ///
    /// The last header names the label column; every row must have exactly
    /// one value per header.
    ///
    /// # Errors
    ///
    /// Returns an error if `headers` is empty, `rows` is empty, or any row
    /// has a different width than `headers`. Row numbers in the error are
    /// 1-based.
    pub fn from_records<H, S>(headers: &[H], rows: &[Vec<S>]) -> Result<Self, DatasetError>
    where
        H: AsRef<str>,
        S: AsRef<str>,
    {
        let width = headers.len();
        if width == 0 {
            return Err(DatasetError::MissingLabelColumn);
        }
        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != width)
        {
            return Err(DatasetError::RowWidth {
                row: row + 1,
                expected: width,
                found: values.len(),
            });
        }

        let n_features = width - 1;
        let x = DMatrix::from_fn(rows.len(), n_features, |i, j| rows[i][j].as_ref().to_string());
        let y = DVector::from_fn(rows.len(), |i, _| rows[i][n_features].as_ref().to_string());
        let names = headers[..n_features]
            .iter()
            .map(|header| header.as_ref().to_string())
            .collect::<Vec<_>>();

        Self::new(x, y)?.with_feature_names(names)
    }
}
