//! Grid-accelerated clustering of features across experiments
//!
//! Points in a 2D plane (e.g. m/z against retention time) are bucketed into
//! a spatial hash grid and grouped into clusters, either by greedy
//! quality-threshold extraction or by nearest-neighbour merging. Clusters
//! can carry a shared property (e.g. charge) and a per-member property that
//! must be unique within a cluster (e.g. source map).
pub mod cluster;

pub use cluster::*;
