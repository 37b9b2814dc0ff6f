// Interaction state machine: idle, text entry, answer display

mod keymap;
mod state;

pub use keymap::{Key, KeyAction, KeyMap};
pub use state::{
    InputEvent, InteractionMachine, InteractionState, InteractionView, ShownAnswer, Transition,
};

#[cfg(test)]
mod tests;
