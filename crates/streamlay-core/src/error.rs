use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Window {0} not found")]
    WindowNotFound(String),
    #[error("Window operation failed: {0}")]
    Window(String),
    #[error("Failed to register shortcut {combo}: {reason}")]
    Hotkey { combo: String, reason: String },
    #[error("Failed to inject into source {id}: {reason}")]
    Injection { id: String, reason: String },
    #[error("Rejected geometry {width}x{height}")]
    InvalidGeometry { width: i32, height: i32 },
    #[error("Source {0} not found")]
    SourceNotFound(String),
    #[error("Config IO error: {0}")]
    ConfigIo(#[from] io::Error),
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("Channel {0} closed")]
    ChannelClosed(&'static str),
}
