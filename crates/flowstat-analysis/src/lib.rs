//! Dose-response analysis of flow-cytometry experiments.
//!
//! - [`table`]: Observation table of replicates, dose levels and response categories
//! - [`experiment`]: Built-in datasets with their chart labels and artifact names
//! - [`report`]: ANOVA, Tukey HSD and bar summaries computed for one experiment

pub mod experiment;
pub mod report;
pub mod table;
