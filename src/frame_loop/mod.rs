// Frame loop controller and its I/O boundary

mod controller;
mod overlay;

pub use controller::{FrameLoop, LoopIo, Step};
pub use overlay::{DrawCommand, Overlay, Rgb};

use crate::detection::Detection;
use crate::interaction::Key;
use anyhow::Result;


/// One captured video frame. Pixel layout is backend-defined; the loop
/// only passes it from capture to display.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Capture order, starting at 0
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Frame without pixel data
    pub fn blank(sequence: u64, width: u32, height: u32) -> Self {
        Self {
            sequence,
            width,
            height,
            data: Vec::new(),
        }
    }
}

/// Video capture device
pub trait FrameSource: Send {
    /// `Ok(None)` is end of stream; `Err` is a terminal capture failure.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Object-detection engine
pub trait Detector: Send {
    /// Detections for this frame, possibly empty
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;
}

/// Display device: shows the annotated frame
pub trait Display: Send {
    fn present(&mut self, frame: &Frame, overlay: &Overlay) -> Result<()>;
}

/// Keyboard attached to the display
pub trait KeySource: Send {
    /// At most one key press since the last poll. Must not block.
    fn poll_key(&mut self) -> Option<Key>;
}

/// Why the loop stopped
#[derive(Clone, Debug, PartialEq)]
pub enum LoopExit {
    Quit,
    EndOfStream,
    CaptureFailed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoopSummary {
    pub frames: u64,
    pub exit: LoopExit,
}
