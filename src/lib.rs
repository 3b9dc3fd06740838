//! # Rusty-id3
//!
//! `rusty-id3` induces classification decision trees from categorical data with the ID3
//! algorithm: rows are split recursively on the attribute with the highest information gain
//! until every node is label-pure or no attributes are left.
//!
//! ## Getting Started
//!
//! To use `rusty-id3`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! rusty-id3 = "*"
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use rusty_id3::data::dataset::Dataset;
//! use rusty_id3::trees::classifier::DecisionTreeClassifier;
//!
//! let dataset = Dataset::from_records(
//!     &["Weather", "Temp", "Play"],
//!     &[
//!         vec!["Sunny", "Hot", "No"],
//!         vec!["Sunny", "Cool", "No"],
//!         vec!["Rain", "Cool", "Yes"],
//!         vec!["Rain", "Hot", "Yes"],
//!     ],
//! )
//! .unwrap();
//!
//! let mut model = DecisionTreeClassifier::new();
//! model.fit(&dataset).unwrap();
//!
//! let gains = model.gain_record().unwrap();
//! assert_eq!(gains.by_attribute("Weather"), vec![1.0]);
//!
//! let predictions = model.predict(&dataset.x).unwrap();
//! assert_eq!(predictions, dataset.y);
//! ```

/// Dataset and data loading utilities
pub mod data;
/// Error types
pub mod errors;
/// Functions for evaluating model performance
pub mod metrics;
/// Decision trees
pub mod trees;
