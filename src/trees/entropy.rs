//! Entropy and information gain over categorical labels.
use crate::data::dataset::{Attribute, Category, Dataset};
use crate::errors::TreeError;
use nalgebra::DVector;
use rayon::prelude::*;
use std::collections::HashMap;

/// Counts every distinct label, in the order labels first appear.
pub fn class_counts<YT: Category>(labels: &DVector<YT>) -> Vec<(YT, usize)> {
    let mut position: HashMap<&YT, usize> = HashMap::new();
    let mut counts: Vec<(YT, usize)> = Vec::new();
    for label in labels.iter() {
        match position.get(label) {
            Some(&index) => counts[index].1 += 1,
            None => {
                position.insert(label, counts.len());
                counts.push((label.clone(), 1));
            }
        }
    }
    counts
}

/// The most frequent label. On equal counts the label seen first wins.
///
/// # Errors
///
/// Returns [`TreeError::EmptyDataset`] if there are no labels.
pub fn majority_label<YT: Category>(labels: &DVector<YT>) -> Result<YT, TreeError> {
    let mut best: Option<(YT, usize)> = None;
    for (label, count) in class_counts(labels) {
        match &best {
            Some((_, best_count)) if count <= *best_count => {}
            _ => best = Some((label, count)),
        }
    }
    best.map(|(label, _)| label).ok_or(TreeError::EmptyDataset)
}

/// Shannon entropy of the label distribution, in bits.
///
/// # Errors
///
/// Returns [`TreeError::EmptyDataset`] if there are no labels.
pub fn entropy<YT: Category>(labels: &DVector<YT>) -> Result<f64, TreeError> {
    if labels.is_empty() {
        return Err(TreeError::EmptyDataset);
    }
    let total = labels.len() as f64;

    Ok(class_counts(labels)
        .into_iter()
        .map(|(_, count)| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum())
}

/// Entropy of `dataset` minus the size-weighted entropy of each bucket.
///
/// The buckets are trusted to be a disjoint cover of `dataset`; this is not
/// checked.
pub fn information_gain<XT: Category, YT: Category>(
    dataset: &Dataset<XT, YT>,
    partition: &[(XT, Dataset<XT, YT>)],
) -> Result<f64, TreeError> {
    let total = dataset.nrows() as f64;
    let initial_entropy = entropy(&dataset.y)?;

    let mut weighted_entropy = 0.0;
    for (_, bucket) in partition {
        weighted_entropy += (bucket.nrows() as f64 / total) * entropy(&bucket.y)?;
    }

    Ok(initial_entropy - weighted_entropy)
}

fn attribute_gain<XT: Category, YT: Category>(
    dataset: &Dataset<XT, YT>,
    attribute: &Attribute,
) -> Result<f64, TreeError> {
    let partition = dataset.partition(attribute.column)?;
    information_gain(dataset, &partition)
}

/// Picks the attribute whose split maximizes information gain.
///
/// Returns the index into `attributes` and the gain. When several attributes
/// share the maximal gain, the one listed first is returned. With `parallel`
/// set, gains are computed on the rayon pool but still compared in list
/// order, so the choice does not depend on scheduling.
///
/// # Errors
///
/// Returns [`TreeError::NoAttributes`] if `attributes` is empty and
/// [`TreeError::EmptyDataset`] if `dataset` has no rows.
pub fn select_best_attribute<XT: Category, YT: Category>(
    dataset: &Dataset<XT, YT>,
    attributes: &[Attribute],
    parallel: bool,
) -> Result<(usize, f64), TreeError> {
    if attributes.is_empty() {
        return Err(TreeError::NoAttributes);
    }

    let gains = if parallel {
        attributes
            .par_iter()
            .map(|attribute| attribute_gain(dataset, attribute))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        attributes
            .iter()
            .map(|attribute| attribute_gain(dataset, attribute))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut best_index = 0;
    let mut best_gain = f64::NEG_INFINITY;
    for (index, gain) in gains.into_iter().enumerate() {
        if gain > best_gain {
            best_index = index;
            best_gain = gain;
        }
    }

    Ok((best_index, best_gain))
}
