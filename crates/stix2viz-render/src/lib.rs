//! # stix2viz render
//!
//! グラフモデルを描画サーフェスにバインドする
//! Shapes graph models into render frames and binds them to surfaces as
//! live views (fit, click-to-inspect, type toggling, teardown).

pub mod error;
pub mod frame;
pub mod detail;
pub mod surface;
pub mod binder;

pub use error::*;
pub use frame::*;
pub use detail::*;
pub use surface::*;
pub use binder::*;
