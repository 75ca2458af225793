//! Algorithm implementations for the antibiogram pipeline
//!
//! This module contains the two core algorithms, result consolidation and
//! episode segmentation, together with the cohort statistics computed from
//! their inputs and outputs.

pub mod antibiogram;
pub mod episodes;
pub mod statistics;
