use crate::detection::{BoundingBox, Detection, LabelTable};
use crate::interaction::Key;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;

/// Errors for a malformed script line (1-based line numbers)
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptError {
    InvalidJson { line: usize, message: String },
    MissingLabel { line: usize },
    UnknownKey { line: usize, key: String },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::InvalidJson { line, message } => {
                write!(f, "line {}: invalid JSON: {}", line, message)
            }
            ScriptError::MissingLabel { line } => {
                write!(f, "line {}: detection needs 'label' or 'class_id'", line)
            }
            ScriptError::UnknownKey { line, key } => {
                write!(f, "line {}: unknown key '{}'", line, key)
            }
        }
    }
}

impl std::error::Error for ScriptError {}

#[derive(Debug, Deserialize)]
struct ScriptLine {
    #[serde(default)]
    detections: Vec<ScriptDetection>,
    #[serde(default)]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScriptDetection {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    class_id: Option<u32>,
    confidence: f32,
    #[serde(rename = "box")]
    bbox: [f32; 4],
}

/// What one frame of the script contains
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ScriptFrame {
    pub detections: Vec<Detection>,
    pub key: Option<Key>,
}

/// A parsed replay script
#[derive(Clone, Debug, Default)]
pub struct Script {
    pub(super) frames: Vec<ScriptFrame>,
}

impl Script {
    pub fn new(frames: Vec<ScriptFrame>) -> Self {
        Self { frames }
    }

    pub fn parse(contents: &str, labels: &LabelTable) -> Result<Self, ScriptError> {
        let mut frames = Vec::new();
        for (index, raw) in contents.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let parsed: ScriptLine =
                serde_json::from_str(trimmed).map_err(|e| ScriptError::InvalidJson {
                    line,
                    message: e.to_string(),
                })?;

            let detections = parsed
                .detections
                .into_iter()
                .map(|d| to_detection(d, labels, line))
                .collect::<Result<Vec<_>, _>>()?;
            let key = parsed
                .key
                .map(|k| parse_key(&k).ok_or(ScriptError::UnknownKey { line, key: k }))
                .transpose()?;

            frames.push(ScriptFrame { detections, key });
        }
        Ok(Self { frames })
    }

    pub fn load(path: &str, labels: &LabelTable) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script '{}'", path))?;
        Self::parse(&contents, labels).with_context(|| format!("Invalid replay script '{}'", path))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn to_detection(raw: ScriptDetection, labels: &LabelTable, line: usize) -> Result<Detection, ScriptError> {
    let label = match (raw.label, raw.class_id) {
        (Some(label), _) => label,
        (None, Some(class_id)) => labels.resolve(class_id).to_string(),
        (None, None) => return Err(ScriptError::MissingLabel { line }),
    };
    let [x1, y1, x2, y2] = raw.bbox;
    Ok(Detection::new(label, raw.confidence, BoundingBox::new(x1, y1, x2, y2)))
}

fn parse_key(name: &str) -> Option<Key> {
    match name.to_ascii_lowercase().as_str() {
        "enter" | "return" => return Some(Key::Enter),
        "backspace" => return Some(Key::Backspace),
        "escape" | "esc" => return Some(Key::Escape),
        "space" => return Some(Key::Char(' ')),
        _ => {}
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(Key::Char(c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::FALLBACK_LABEL;
    use std::io::Write;

    #[test]
    fn test_parse_frames() {
        let contents = r#"
# person walks in with a dog
{"detections": [{"class_id": 0, "confidence": 0.88, "box": [1, 2, 3, 4]}, {"label": "dog", "confidence": 0.91, "box": [5, 6, 7, 8]}]}
{"key": "i"}
{"key": "Enter"}
{}
"#;
        let script = Script::parse(contents, &LabelTable::coco()).unwrap();
        assert_eq!(script.len(), 4);

        let first = &script.frames[0];
        assert_eq!(first.detections[0].label, "person");
        assert_eq!(first.detections[1].label, "dog");
        assert_eq!(first.detections[1].bbox, BoundingBox::new(5.0, 6.0, 7.0, 8.0));
        assert_eq!(first.key, None);

        assert_eq!(script.frames[1].key, Some(Key::Char('i')));
        assert_eq!(script.frames[2].key, Some(Key::Enter));
        assert_eq!(script.frames[3], ScriptFrame::default());
    }

    #[test]
    fn test_unknown_class_id_uses_fallback() {
        let script = Script::parse(
            r#"{"detections": [{"class_id": 999, "confidence": 0.5, "box": [0, 0, 1, 1]}]}"#,
            &LabelTable::coco(),
        )
        .unwrap();
        assert_eq!(script.frames[0].detections[0].label, FALLBACK_LABEL);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let labels = LabelTable::coco();

        let err = Script::parse("{}\nnot json", &labels).unwrap_err();
        assert!(matches!(err, ScriptError::InvalidJson { line: 2, .. }));

        let err = Script::parse(
            r#"{"detections": [{"confidence": 0.5, "box": [0, 0, 1, 1]}]}"#,
            &labels,
        )
        .unwrap_err();
        assert_eq!(err, ScriptError::MissingLabel { line: 1 });

        let err = Script::parse(r#"{"key": "F13"}"#, &labels).unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownKey {
                line: 1,
                key: "F13".to_string()
            }
        );
        assert_eq!(err.to_string(), "line 1: unknown key 'F13'");
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!(parse_key("space"), Some(Key::Char(' ')));
        assert_eq!(parse_key("ESC"), Some(Key::Escape));
        assert_eq!(parse_key("backspace"), Some(Key::Backspace));
        assert_eq!(parse_key("?"), Some(Key::Char('?')));
        assert_eq!(parse_key("ab"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn test_bundled_demo_parses() {
        let script =
            Script::parse(include_str!("../../demos/desk.jsonl"), &LabelTable::coco()).unwrap();
        assert_eq!(script.len(), 20);
        assert_eq!(script.frames[1].detections[1].label, "cup");
        assert_eq!(script.frames[19].key, Some(Key::Char('q')));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"key": "q"}}"#).unwrap();

        let script = Script::load(file.path().to_str().unwrap(), &LabelTable::coco()).unwrap();
        assert_eq!(script.frames[0].key, Some(Key::Char('q')));

        let err = Script::load("/nonexistent/script.jsonl", &LabelTable::coco()).unwrap_err();
        assert!(err.to_string().contains("Failed to read replay script"));
    }
}
