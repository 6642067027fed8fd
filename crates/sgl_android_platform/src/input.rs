//! # Touch Input
//!
//! Translates platform motion events into engine input events.
//!
//! ```text
//! Down / PointerDown  ->  TouchDown
//! Move                ->  TouchMoved (history oldest first, then current)
//! PointerUp / Up      ->  TouchUp
//! Cancel / Other      ->  (nothing)
//! ```
//!
//! The engine only knows "down" and "up". The first finger and any further
//! finger look the same; gestures are tracked through the pointer id.
//!
//! `PointerDown` and `PointerUp` announce only the pointer at the event's
//! action index. Fingers that were already down are not reported again, so
//! every `TouchDown` pairs with exactly one `TouchUp` per pointer id.

use crate::queue::InputSender;

/// Masked action of a motion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionAction {
    /// First pointer went down.
    Down,
    /// An additional pointer went down.
    PointerDown,
    /// One or more pointers moved (possibly batched).
    Move,
    /// A pointer went up while others remain.
    PointerUp,
    /// Last pointer went up.
    Up,
    /// The gesture was aborted.
    Cancel,
    /// Any action the engine does not consume (hover, scroll, ...).
    Other,
}

/// One pointer of a motion event.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchPointer {
    /// Stable pointer id for the duration of the gesture.
    pub id: i32,
    /// Current x position in pixels.
    pub x: f32,
    /// Current y position in pixels.
    pub y: f32,
    /// Batched intermediate positions, oldest first.
    pub history: Vec<(f32, f32)>,
}

impl TouchPointer {
    /// A pointer without history.
    #[must_use]
    pub fn new(id: i32, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            history: Vec::new(),
        }
    }

    /// Adds batched intermediate positions.
    #[must_use]
    pub fn with_history(mut self, history: Vec<(f32, f32)>) -> Self {
        self.history = history;
        self
    }
}

/// Platform motion event.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEvent {
    /// Masked action.
    pub action: MotionAction,
    /// Index into `pointers` of the pointer the action concerns.
    pub action_index: usize,
    /// Pointers down at the time of the event.
    pub pointers: Vec<TouchPointer>,
}

impl MotionEvent {
    /// An event whose action concerns the first pointer.
    #[must_use]
    pub fn new(action: MotionAction, pointers: Vec<TouchPointer>) -> Self {
        Self {
            action,
            action_index: 0,
            pointers,
        }
    }

    /// Sets the pointer the action concerns.
    #[must_use]
    pub fn with_action_index(mut self, action_index: usize) -> Self {
        self.action_index = action_index;
        self
    }
}

/// System actions the engine may opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemAction {
    /// Back button / back gesture.
    Back,
    /// Menu key.
    Menu,
}

/// Engine input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A pointer went down.
    TouchDown {
        /// X in pixels.
        x: i32,
        /// Y in pixels.
        y: i32,
        /// Pointer id.
        pointer: i32,
    },
    /// A pointer moved.
    TouchMoved {
        /// X in pixels.
        x: i32,
        /// Y in pixels.
        y: i32,
        /// Pointer id.
        pointer: i32,
    },
    /// A pointer went up.
    TouchUp {
        /// X in pixels.
        x: i32,
        /// Y in pixels.
        y: i32,
        /// Pointer id.
        pointer: i32,
    },
    /// A system action the host forwarded.
    System(SystemAction),
}

/// Translates `event`, appending engine events to `out`.
pub fn translate_into(event: &MotionEvent, out: &mut Vec<InputEvent>) {
    match event.action {
        MotionAction::Down | MotionAction::Up => {
            let up = event.action == MotionAction::Up;
            for pointer in &event.pointers {
                out.push(edge_event(pointer, up));
            }
        }
        MotionAction::PointerDown | MotionAction::PointerUp => {
            let up = event.action == MotionAction::PointerUp;
            match event.pointers.get(event.action_index) {
                Some(pointer) => out.push(edge_event(pointer, up)),
                None => tracing::debug!(
                    action_index = event.action_index,
                    pointers = event.pointers.len(),
                    "action index out of range, event ignored"
                ),
            }
        }
        MotionAction::Move => {
            for pointer in &event.pointers {
                for &(x, y) in &pointer.history {
                    out.push(InputEvent::TouchMoved {
                        x: x as i32,
                        y: y as i32,
                        pointer: pointer.id,
                    });
                }
                out.push(InputEvent::TouchMoved {
                    x: pointer.x as i32,
                    y: pointer.y as i32,
                    pointer: pointer.id,
                });
            }
        }
        MotionAction::Cancel | MotionAction::Other => {}
    }
}

/// Translates `event` into engine events.
#[must_use]
pub fn translate(event: &MotionEvent) -> Vec<InputEvent> {
    let mut out = Vec::with_capacity(event.pointers.len());
    translate_into(event, &mut out);
    out
}

fn edge_event(pointer: &TouchPointer, up: bool) -> InputEvent {
    let (x, y, pointer) = (pointer.x as i32, pointer.y as i32, pointer.id);
    if up {
        InputEvent::TouchUp { x, y, pointer }
    } else {
        InputEvent::TouchDown { x, y, pointer }
    }
}

/// Touch listener attached to the game view.
#[derive(Debug, Clone)]
pub struct TouchListener {
    sender: InputSender,
    scratch: Vec<InputEvent>,
}

impl TouchListener {
    /// Creates a listener feeding `sender`.
    #[must_use]
    pub fn new(sender: InputSender) -> Self {
        Self {
            sender,
            scratch: Vec::with_capacity(16),
        }
    }

    /// Handles a motion event. Always reports it consumed, otherwise the
    /// platform stops delivering the rest of the gesture.
    pub fn on_touch(&mut self, event: &MotionEvent) -> bool {
        self.scratch.clear();
        translate_into(event, &mut self.scratch);
        for input in self.scratch.drain(..) {
            self.sender.send(input);
        }
        true
    }
}
