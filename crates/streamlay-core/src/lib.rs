pub mod config;
pub mod controller;
pub mod embed;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gesture;
pub mod host;
pub mod model;
pub mod protocol;
pub mod schedule;
pub mod surface;
pub mod throttle;

pub use config::{ConfigStore, JsonFileStore};
pub use controller::SettingsController;
pub use error::*;
pub use frame::FrameInputLayer;
pub use geometry::{Bounds, Edges, Handle, Point};
pub use host::{HotkeyRegistrar, OverlayHost, WindowBackend};
pub use model::*;
pub use protocol::*;
pub use surface::{RenderSurface, SourceView, SurfaceLink, ViewFactory};
pub use throttle::{DeltaEmitter, FrameScheduler};
