/// ID3 decision tree classifier
pub mod classifier;
/// Entropy and information gain
pub mod entropy;
/// Tree nodes, traversal and rendering
pub mod node;
