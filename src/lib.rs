// Configuration (TOML + env overrides)
pub mod config;

// Process clock
pub mod clock;

// Detection records and class label tables
pub mod detection;

// Transient per-label display messages
pub mod registry;

// Idle / text entry / answer display state machine
pub mod interaction;

// Off-loop question answering
pub mod dispatch;

// Rate limiting for automatic queries
pub mod rate_limit;

// Per-frame orchestration
pub mod frame_loop;

// Scripted capture and console display
pub mod replay;

pub use frame_loop::{FrameLoop, LoopExit, LoopIo, LoopSummary};
