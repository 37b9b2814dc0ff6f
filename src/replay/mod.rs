// Scripted capture for running the loop without camera hardware
//
// A script is JSON lines, one frame per line:
//   {"detections": [{"class_id": 16, "confidence": 0.91, "box": [10, 20, 110, 220]}], "key": "i"}
// Detections may carry "label" instead of "class_id". "key" is a single
// character or one of: enter, backspace, escape, space. Blank lines and lines
// starting with '#' are skipped.

mod script;

pub use script::{Script, ScriptError, ScriptFrame};

use crate::detection::Detection;
use crate::frame_loop::{Detector, Display, Frame, FrameSource, KeySource, Overlay};
use crate::interaction::Key;
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::io::Write;
use std::time::Duration;

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

/// Yields one blank frame per script line, pacing them like a camera would
pub struct ScriptedFrames {
    total: u64,
    next_sequence: u64,
    interval: Duration,
}

impl FrameSource for ScriptedFrames {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.next_sequence >= self.total {
            return Ok(None);
        }
        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }
        let frame = Frame::blank(self.next_sequence, FRAME_WIDTH, FRAME_HEIGHT);
        self.next_sequence += 1;
        Ok(Some(frame))
    }
}

/// Returns the scripted detections for the frame's sequence number
pub struct ScriptedDetector {
    frames: Vec<Vec<Detection>>,
}

impl Detector for ScriptedDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        Ok(self
            .frames
            .get(frame.sequence as usize)
            .cloned()
            .unwrap_or_default())
    }
}

/// One scripted key slot per frame, consumed in order
pub struct ScriptedKeys {
    keys: VecDeque<Option<Key>>,
}

impl KeySource for ScriptedKeys {
    fn poll_key(&mut self) -> Option<Key> {
        self.keys.pop_front().flatten()
    }
}

impl Script {
    /// Split into the three devices the frame loop consumes.
    pub fn into_devices(self, interval: Duration) -> (ScriptedFrames, ScriptedDetector, ScriptedKeys) {
        let total = self.frames.len() as u64;
        let (detections, keys): (Vec<_>, VecDeque<_>) = self
            .frames
            .into_iter()
            .map(|frame| (frame.detections, frame.key))
            .unzip();

        (
            ScriptedFrames {
                total,
                next_sequence: 0,
                interval,
            },
            ScriptedDetector { frames: detections },
            ScriptedKeys { keys },
        )
    }
}

/// Text display: prints the overlay's text whenever it changes
pub struct ConsoleDisplay<W: Write + Send> {
    out: W,
    last: Option<Vec<String>>,
}

impl<W: Write + Send> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Display for ConsoleDisplay<W> {
    fn present(&mut self, frame: &Frame, overlay: &Overlay) -> Result<()> {
        let texts: Vec<String> = overlay.texts().into_iter().map(str::to_string).collect();
        if self.last.as_ref() == Some(&texts) {
            return Ok(());
        }

        writeln!(self.out, "[frame {}]", frame.sequence).context("Failed to write to display")?;
        for text in &texts {
            writeln!(self.out, "  {}", text).context("Failed to write to display")?;
        }
        self.out.flush().context("Failed to flush display")?;

        self.last = Some(texts);
        Ok(())
    }
}
