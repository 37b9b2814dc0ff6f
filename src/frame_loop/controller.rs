use super::{Detector, Display, FrameSource, KeySource, LoopExit, LoopSummary, Overlay};
use crate::clock::Clock;
use crate::config::{SightlineConfig, SynthesisConfig};
use crate::detection::{person_present, Detection};
use crate::dispatch::{AnswerDispatcher, AnswerService, RequestId};
use crate::interaction::{InteractionMachine, KeyAction, KeyMap};
use crate::rate_limit::RateLimiter;
use crate::registry::{MessageRegistry, MessageText};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// External devices the loop talks to
pub struct LoopIo {
    pub source: Box<dyn FrameSource>,
    pub detector: Box<dyn Detector>,
    pub display: Box<dyn Display>,
    pub keys: Box<dyn KeySource>,
    pub clock: Box<dyn Clock>,
}

/// Outcome of a single iteration
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Continue,
    Exit(LoopExit),
}

/// Runs one iteration per captured frame.
///
/// Owns the message registry and the interaction state machine; both are
/// mutated only here, on the loop thread. Answers come back from the two
/// dispatchers as messages and are applied at a fixed point in the iteration,
/// so no transition is ever observed half-done.
pub struct FrameLoop {
    io: LoopIo,
    registry: MessageRegistry,
    interaction: InteractionMachine,
    keymap: KeyMap,
    person_label: String,
    synthesis_config: SynthesisConfig,
    /// Automatic per-label queries
    synthesis: AnswerDispatcher,
    /// Label each outstanding synthesis request belongs to
    synthesis_labels: HashMap<RequestId, String>,
    /// Set when automatic queries are capped
    synthesis_limiter: Option<RateLimiter>,
    /// User-typed questions
    manual: AnswerDispatcher,
    frames: u64,
}

impl FrameLoop {
    pub fn new(
        config: &SightlineConfig,
        io: LoopIo,
        service: Arc<dyn AnswerService>,
        runtime: Handle,
    ) -> Self {
        let interaction = &config.interaction;
        let error_text = config.answer_service.error_text.clone();

        Self {
            io,
            registry: MessageRegistry::new(interaction.message_ttl()),
            interaction: InteractionMachine::new(interaction.answer_display_ttl()),
            keymap: KeyMap::new(interaction.start_input_key, interaction.quit_key),
            person_label: interaction.person_label.clone(),
            synthesis_config: config.synthesis.clone(),
            synthesis: AnswerDispatcher::new(
                "synthesis",
                Arc::clone(&service),
                error_text.clone(),
                runtime.clone(),
            ),
            synthesis_labels: HashMap::new(),
            synthesis_limiter: config
                .synthesis
                .max_queries_per_minute
                .map(RateLimiter::per_minute),
            manual: AnswerDispatcher::new("manual", service, error_text, runtime),
            frames: 0,
        }
    }

    pub fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    pub fn interaction(&self) -> &InteractionMachine {
        &self.interaction
    }

    /// Force the interaction back to idle. A late answer for the abandoned
    /// question is discarded when it arrives.
    pub fn reset_interaction(&mut self) {
        self.interaction.reset();
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Dispatches whose answer has not come back yet
    pub fn in_flight_dispatches(&self) -> usize {
        self.synthesis.in_flight() + self.manual.in_flight()
    }

    /// Run until quit, end of stream, or capture failure.
    pub fn run(&mut self) -> LoopSummary {
        info!("Frame loop started");
        let exit = loop {
            if let Step::Exit(exit) = self.run_iteration() {
                break exit;
            }
        };
        info!(frames = self.frames, exit = ?exit, "Frame loop stopped");
        LoopSummary {
            frames: self.frames,
            exit,
        }
    }

    /// One frame: capture, detect, update messages, render, handle one key.
    pub fn run_iteration(&mut self) -> Step {
        let frame = match self.io.source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Step::Exit(LoopExit::EndOfStream),
            Err(e) => {
                error!(error = %e, "Capture failed");
                return Step::Exit(LoopExit::CaptureFailed(format!("{:#}", e)));
            }
        };
        self.frames += 1;
        let now = self.io.clock.now();

        let detections = match self.io.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                warn!(frame = frame.sequence, error = %e, "Detection failed, treating frame as empty");
                Vec::new()
            }
        };
        let person_present = person_present(&detections, &self.person_label);

        let mut overlay = Overlay::new();
        for detection in &detections {
            overlay.draw_detection(detection, detection.is_person(&self.person_label));
            self.upsert_message(detection, now);
        }

        self.apply_results(now);
        self.registry.tick(now);
        self.interaction.tick(now);

        overlay.stack_messages(self.registry.active_messages());
        overlay.draw_interaction(
            self.interaction.view(person_present),
            self.keymap.start_input_key(),
        );

        if let Err(e) = self.io.display.present(&frame, &overlay) {
            warn!(frame = frame.sequence, error = %e, "Display failed");
        }

        let Some(key) = self.io.keys.poll_key() else {
            return Step::Continue;
        };
        match self.keymap.map(key, self.interaction.is_typing()) {
            Some(KeyAction::Quit) => Step::Exit(LoopExit::Quit),
            Some(KeyAction::Input(event)) => {
                let manual = &mut self.manual;
                let transition =
                    self.interaction
                        .handle_event(event, person_present, |query| manual.submit(query));
                debug!(event = ?event, transition = ?transition, "Input handled");
                Step::Continue
            }
            None => {
                debug!(key = ?key, "Key ignored");
                Step::Continue
            }
        }
    }

    fn upsert_message(&mut self, detection: &Detection, now: DateTime<Utc>) {
        let label = detection.label.as_str();

        if detection.is_person(&self.person_label) {
            self.registry.upsert(label, now, || {
                Some(MessageText::Ready(format!("Detected: {}", label)))
            });
            return;
        }

        let synthesis = &mut self.synthesis;
        let synthesis_labels = &mut self.synthesis_labels;
        let limiter = self.synthesis_limiter.as_mut();
        let config = &self.synthesis_config;

        self.registry.upsert(label, now, || {
            if let Some(limiter) = limiter {
                if !limiter.try_acquire(now) {
                    debug!(label = %label, limit = limiter.limit(), "Synthesis rate limited");
                    return None;
                }
            }
            let request_id = synthesis.submit(config.query_for(label));
            synthesis_labels.insert(request_id, label.to_string());
            Some(MessageText::Pending(request_id))
        });
    }

    /// Apply every completed dispatch, in arrival order.
    fn apply_results(&mut self, now: DateTime<Utc>) {
        for result in self.synthesis.try_results() {
            let Some(label) = self.synthesis_labels.remove(&result.request_id) else {
                debug!(request_id = %result.request_id, "Synthesis result without a label");
                continue;
            };
            let text = format!("Detected: {}. {}", label, result.text());
            self.registry.resolve(&label, result.request_id, text, now);
        }

        for result in self.manual.try_results() {
            self.interaction.apply_result(&result, now);
        }
    }
}
