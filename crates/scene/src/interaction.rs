//! Pointer interaction state machine.
//!
//! ```text
//! Idle --down--> Pressed --move(Δ≠0)--> Dragging
//!   ^               |                      |
//!   +-----up--------+  (click if quick)    |
//!   +-----------------------up-------------+  (never a click)
//! ```

use emissions::{CountryCode, RenderPoint};
use foundation::math::{LatLng, Vec2};
use foundation::time::Millis;
use tracing::debug;

use crate::camera::{CameraState, Rotation, clamp_pitch};
use crate::picking::{PickOptions, pick_screen};
use crate::projection::Projector;
use crate::selection::SelectionState;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InteractionConfig {
    /// Radians of pitch per pixel of vertical pointer movement.
    pub drag_sensitivity_x: f64,
    /// Radians of yaw per pixel of horizontal pointer movement.
    pub drag_sensitivity_y: f64,
    /// A press released sooner than this without moving is a click.
    pub click_threshold_ms: f64,
    pub pick: PickOptions,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity_x: 0.005,
            drag_sensitivity_y: 0.005,
            click_threshold_ms: 200.0,
            pick: PickOptions::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Pressed,
    Dragging,
}

/// How a press ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Gesture {
    Click,
    Drag,
    /// Held past the click threshold without moving.
    LongPress,
    /// Release with no matching press.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    CountrySelected(CountryCode),
    CountryHovered(Option<CountryCode>),
    SelectionCleared,
}

/// What hit-testing needs to see: the markers on screen and how they project.
#[derive(Debug, Copy, Clone)]
pub struct PickScene<'a> {
    pub points: &'a [RenderPoint],
    pub projector: &'a Projector,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct InteractionSession {
    pressed_at: Millis,
    press_pos: Vec2,
}

/// Sole writer of the camera's target rotation.
#[derive(Debug, Clone)]
pub struct InteractionController {
    config: InteractionConfig,
    state: InteractionState,
    session: Option<InteractionSession>,
    selection: SelectionState,
    outbox: Vec<InteractionEvent>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            state: InteractionState::Idle,
            session: None,
            selection: SelectionState::new(),
            outbox: Vec::new(),
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state == InteractionState::Dragging
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Events raised since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pointer_down(&mut self, pos: Vec2, now: Millis) {
        self.state = InteractionState::Pressed;
        self.session = Some(InteractionSession {
            pressed_at: now,
            press_pos: pos,
        });
    }

    /// `movement` is the delta since the previous move event; `primary_down`
    /// reports whether the primary button or touch is still active.
    pub fn pointer_move(
        &mut self,
        camera: &mut CameraState,
        scene: PickScene<'_>,
        pos: Vec2,
        movement: Vec2,
        primary_down: bool,
    ) {
        match self.state {
            InteractionState::Idle => self.update_hover(camera, scene, pos),
            InteractionState::Pressed | InteractionState::Dragging if !primary_down => {
                // Release happened outside our listeners; drop the gesture.
                self.end_session();
                self.update_hover(camera, scene, pos);
            }
            InteractionState::Pressed => {
                if movement.x != 0.0 || movement.y != 0.0 {
                    self.state = InteractionState::Dragging;
                    self.apply_drag(camera, movement);
                }
            }
            InteractionState::Dragging => self.apply_drag(camera, movement),
        }
    }

    pub fn pointer_up(&mut self, camera: &CameraState, scene: PickScene<'_>, now: Millis) -> Gesture {
        let state = self.state;
        let Some(session) = self.end_session() else {
            return Gesture::None;
        };

        match state {
            InteractionState::Dragging => Gesture::Drag,
            InteractionState::Pressed
                if now.since(session.pressed_at) < self.config.click_threshold_ms =>
            {
                self.click(camera, scene, session.press_pos);
                Gesture::Click
            }
            InteractionState::Pressed => Gesture::LongPress,
            InteractionState::Idle => Gesture::None,
        }
    }

    /// Pointer left the surface: abandon any gesture and clear the hover.
    pub fn pointer_leave(&mut self) {
        self.end_session();
        if self.selection.set_hovered(None) {
            self.outbox.push(InteractionEvent::CountryHovered(None));
        }
    }

    /// Points the camera at `pos` without touching the gesture state.
    pub fn focus(&mut self, camera: &mut CameraState, pos: LatLng) {
        let facing = Rotation::facing(pos);
        *camera.target_mut() = Rotation::new(clamp_pitch(facing.x), facing.y);
    }

    /// Idle drift. Returns `false` (and does nothing) while dragging.
    pub fn auto_rotate(&mut self, camera: &mut CameraState, step: f64) -> bool {
        if self.is_dragging() {
            return false;
        }
        camera.target_mut().y += step;
        true
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear_selection() {
            self.outbox.push(InteractionEvent::SelectionCleared);
        }
    }

    /// Call after the render point set is replaced.
    pub fn points_replaced(&mut self, points: &[RenderPoint]) {
        if self.selection.retain_rendered(points) {
            self.outbox.push(InteractionEvent::CountryHovered(None));
        }
    }

    fn end_session(&mut self) -> Option<InteractionSession> {
        self.state = InteractionState::Idle;
        self.session.take()
    }

    fn apply_drag(&mut self, camera: &mut CameraState, movement: Vec2) {
        let target = camera.target_mut();
        target.y += movement.x * self.config.drag_sensitivity_y;
        target.x = clamp_pitch(target.x + movement.y * self.config.drag_sensitivity_x);
    }

    fn hit_test(&self, camera: &CameraState, scene: PickScene<'_>, pos: Vec2) -> Option<CountryCode> {
        pick_screen(scene.points, camera.current(), scene.projector, pos, self.config.pick)
            .map(|hit| hit.country)
    }

    fn update_hover(&mut self, camera: &CameraState, scene: PickScene<'_>, pos: Vec2) {
        let candidate = self.hit_test(camera, scene, pos);
        if self.selection.set_hovered(candidate.clone()) {
            debug!(hovered = ?candidate, "hover changed");
            self.outbox.push(InteractionEvent::CountryHovered(candidate));
        }
    }

    fn click(&mut self, camera: &CameraState, scene: PickScene<'_>, pos: Vec2) {
        self.update_hover(camera, scene, pos);
        if let Some(country) = self.selection.hovered().cloned() {
            debug!(%country, "country selected");
            self.selection.select(country.clone());
            self.outbox.push(InteractionEvent::CountrySelected(country));
        }
    }
}
