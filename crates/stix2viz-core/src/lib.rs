//! # stix2viz core
//!
//! STIX 2 バンドルを正規化し、可視化用の型付きグラフモデルを構築する
//! Normalizes STIX 2 content and builds the typed graph model rendered by
//! the notebook extension.

pub mod error;
pub mod model;
pub mod normalizer;
pub mod config;
pub mod icons;
pub mod refs;
pub mod builder;

pub use error::*;
pub use model::*;
pub use normalizer::*;
pub use config::*;
pub use icons::*;
pub use refs::*;
pub use builder::*;

/// Normalize raw content and build its graph with the bundled tables
pub fn graph_from_input<'a>(
    input: impl Into<StixInput<'a>>,
    config: &ViewConfig,
) -> Result<GraphModel, StixVizError> {
    let bundle = normalize(input)?;
    Ok(GraphBuilder::new().build_normalized(&bundle, config))
}
