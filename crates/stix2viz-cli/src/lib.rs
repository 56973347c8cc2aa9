//! # stix2viz CLI Library
//!
//! STIX 2 可視化のコマンドラインインターフェース
//! Render STIX content to embeddable HTML, inspect graphs and explore them
//! interactively from the command line.

pub mod commands;
pub mod interactive;

pub use commands::*;
pub use interactive::*;
