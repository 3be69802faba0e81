pub mod anchors;
pub mod config;
pub mod fragments;
pub mod pipeline;
pub mod splice;

pub use anchors::AnchorSet;
pub use config::Config;
pub use pipeline::{MergeReport, Step, merge};
pub use splice::SpliceError;
