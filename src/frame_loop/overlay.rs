use crate::detection::Detection;
use crate::interaction::InteractionView;
use crate::registry::DisplayMessage;
use serde::Serialize;

/// RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const CYAN: Rgb = Rgb(0, 255, 255);
}

const BOX_THICKNESS: u32 = 2;
const CAPTION_OFFSET: i32 = 10;
const CAPTION_SCALE: f32 = 0.9;
const TEXT_SCALE: f32 = 0.8;

const TEXT_X: i32 = 50;
const MESSAGE_START_Y: i32 = 50;
const MESSAGE_LINE_STEP: i32 = 30;
const PROMPT_Y: i32 = 400;
const TYPING_Y: i32 = 450;
const ANSWER_Y: i32 = 480;

/// Backend-neutral drawing instruction
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Rect {
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        color: Rgb,
        thickness: u32,
    },
    Text {
        text: String,
        origin: (i32, i32),
        scale: f32,
        color: Rgb,
    },
}

/// Everything drawn on top of one frame, in draw order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Overlay {
    commands: Vec<DrawCommand>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text of every text command, in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                DrawCommand::Rect { .. } => None,
            })
            .collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    pub fn rect(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), color: Rgb) {
        self.commands.push(DrawCommand::Rect {
            top_left,
            bottom_right,
            color,
            thickness: BOX_THICKNESS,
        });
    }

    pub fn text(&mut self, text: impl Into<String>, origin: (i32, i32), scale: f32, color: Rgb) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            origin,
            scale,
            color,
        });
    }

    /// Box plus `"<label> <confidence>"` caption above it
    pub fn draw_detection(&mut self, detection: &Detection, is_person: bool) {
        let color = if is_person { Rgb::GREEN } else { Rgb::YELLOW };
        let (top_left, bottom_right) = detection.bbox.corners();
        self.rect(top_left, bottom_right, color);
        self.text(
            detection.caption(),
            (top_left.0, top_left.1.saturating_sub(CAPTION_OFFSET)),
            CAPTION_SCALE,
            color,
        );
    }

    /// Messages stacked top to bottom in the order given
    pub fn stack_messages<'a, I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = &'a DisplayMessage>,
    {
        let mut y = MESSAGE_START_Y;
        for message in messages {
            self.text(message.text.clone(), (TEXT_X, y), TEXT_SCALE, Rgb::RED);
            y += MESSAGE_LINE_STEP;
        }
    }

    pub fn draw_interaction(&mut self, view: InteractionView<'_>, start_input_key: char) {
        match view {
            InteractionView::Hidden | InteractionView::Waiting => {}
            InteractionView::Prompt => self.text(
                format!("Press '{}' to talk", start_input_key),
                (TEXT_X, PROMPT_Y),
                TEXT_SCALE,
                Rgb::WHITE,
            ),
            InteractionView::Typing(text) => self.text(
                format!("Type: {}", text),
                (TEXT_X, TYPING_Y),
                TEXT_SCALE,
                Rgb::CYAN,
            ),
            InteractionView::Answer(text) => {
                self.text(text, (TEXT_X, ANSWER_Y), TEXT_SCALE, Rgb::YELLOW)
            }
        }
    }
}
