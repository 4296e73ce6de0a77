//! Insecurity-map extraction and evaluation for fine-grained classifiers.
//!
//! The pipeline attributes a classifier and a difficulty predictor at a named
//! layer, combines the maps of every confusable class pair into an insecurity
//! field, thresholds the field at a sweep of size budgets and scores the masks
//! against projected part annotations.

mod common;

pub mod attribution;
pub mod budget;
pub mod config;
pub mod confusion;
pub mod dataset;
pub mod field;
pub mod ground_truth;
pub mod mask;
pub mod model;
pub mod pipeline;
pub mod score;
pub mod selection;
pub mod validation;
