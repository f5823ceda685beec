//! Keyboard bindings for playback control.

use crate::clock::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    R,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Press,
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Release,
        }
    }
}

/// Session command produced by a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the search if nothing has run yet, otherwise toggle playback.
    Toggle,
    Play,
    Pause,
    StepFrame(Direction),
    Clear,
}

/// Snapshot of session state the bindings need to pick a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    pub started: bool,
    pub animation_ended: bool,
}

impl InputContext {
    fn idle_or_ended(self) -> bool {
        !self.started || self.animation_ended
    }
}

/// Translates raw key events into [`Command`]s.
///
/// Bindings only react while attached. Holding one arrow key masks the other
/// until it is released.
#[derive(Debug, Default)]
pub struct InputBindings {
    attached: bool,
    right_held: bool,
    left_held: bool,
}

impl InputBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop reacting to keys and forget any held state.
    pub fn detach(&mut self) {
        self.attached = false;
        self.right_held = false;
        self.left_held = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn handle(&mut self, event: KeyEvent, ctx: InputContext) -> Option<Command> {
        if !self.attached {
            return None;
        }
        let arrow_held = self.right_held || self.left_held;

        match (event.key, event.action) {
            (Key::Space, KeyAction::Release) => Some(Command::Toggle),
            (Key::ArrowRight, KeyAction::Press) if !arrow_held && ctx.idle_or_ended() => {
                self.right_held = true;
                if ctx.animation_ended {
                    Some(Command::StepFrame(Direction::Forward))
                } else {
                    // Before any run, holding the key plays the search.
                    Some(Command::Play)
                }
            }
            (Key::ArrowRight, KeyAction::Release) if self.right_held => {
                self.right_held = false;
                (!ctx.animation_ended).then_some(Command::Pause)
            }
            (Key::ArrowLeft, KeyAction::Press) if !arrow_held && ctx.animation_ended => {
                self.left_held = true;
                Some(Command::StepFrame(Direction::Backward))
            }
            (Key::ArrowLeft, KeyAction::Release) if self.left_held => {
                self.left_held = false;
                None
            }
            (Key::R, KeyAction::Release) if ctx.idle_or_ended() => Some(Command::Clear),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDED: InputContext = InputContext {
        started: true,
        animation_ended: true,
    };
    const RUNNING: InputContext = InputContext {
        started: true,
        animation_ended: false,
    };

    fn attached() -> InputBindings {
        let mut bindings = InputBindings::new();
        bindings.attach();
        bindings
    }

    #[test]
    fn detached_bindings_ignore_keys() {
        let mut bindings = InputBindings::new();
        assert_eq!(
            bindings.handle(KeyEvent::release(Key::Space), ENDED),
            None
        );
        bindings.attach();
        bindings.detach();
        assert!(!bindings.is_attached());
        assert_eq!(
            bindings.handle(KeyEvent::release(Key::Space), ENDED),
            None
        );
    }

    #[test]
    fn space_toggles_on_release() {
        let mut bindings = attached();
        assert_eq!(bindings.handle(KeyEvent::press(Key::Space), RUNNING), None);
        assert_eq!(
            bindings.handle(KeyEvent::release(Key::Space), RUNNING),
            Some(Command::Toggle)
        );
    }

    #[test]
    fn arrows_step_once_ended_and_mask_each_other() {
        let mut bindings = attached();
        assert_eq!(
            bindings.handle(KeyEvent::press(Key::ArrowRight), ENDED),
            Some(Command::StepFrame(Direction::Forward))
        );
        assert_eq!(
            bindings.handle(KeyEvent::press(Key::ArrowLeft), ENDED),
            None
        );
        bindings.handle(KeyEvent::release(Key::ArrowRight), ENDED);
        assert_eq!(
            bindings.handle(KeyEvent::press(Key::ArrowLeft), ENDED),
            Some(Command::StepFrame(Direction::Backward))
        );
    }

    #[test]
    fn arrows_are_ignored_while_running() {
        let mut bindings = attached();
        assert_eq!(
            bindings.handle(KeyEvent::press(Key::ArrowRight), RUNNING),
            None
        );
        assert_eq!(
            bindings.handle(KeyEvent::press(Key::ArrowLeft), RUNNING),
            None
        );
    }

    #[test]
    fn holding_right_before_a_run_plays_until_release() {
        let mut bindings = attached();
        let idle = InputContext::default();
        assert_eq!(
            bindings.handle(KeyEvent::press(Key::ArrowRight), idle),
            Some(Command::Play)
        );
        assert_eq!(
            bindings.handle(KeyEvent::release(Key::ArrowRight), RUNNING),
            Some(Command::Pause)
        );
    }

    #[test]
    fn r_clears_only_when_idle_or_ended() {
        let mut bindings = attached();
        assert_eq!(bindings.handle(KeyEvent::release(Key::R), RUNNING), None);
        assert_eq!(
            bindings.handle(KeyEvent::release(Key::R), ENDED),
            Some(Command::Clear)
        );
    }
}
