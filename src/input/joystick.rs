//! # Joystick Input Mapper
//!
//! Maps pointer positions within a joystick widget to control vectors.
//!
//! ## Mapping
//!
//! For every pointer move the widget center is recomputed from the layout box
//! passed in by the host (never cached, so layout changes and resizes are
//! tolerated). The offset from center is normalized against the widget
//! radius (`max_distance`) WITHOUT clamping, so a drag beyond the visual
//! radius keeps scaling linearly in the stored value. The vector reported to
//! the session clamps each axis to [-1, 1] and multiplies by `scale_factor`
//! (negative by default to match the peer's coordinate frame), while the
//! visual handle offset clamps the distance so the handle never renders
//! outside the widget.
//!
//! ## Centering
//!
//! Each instance has a per-axis [`CenteringPolicy`]: on release a centering
//! axis snaps to 0, a holding axis keeps the clamped last value. The left
//! stick centers X only (yaw snaps back, throttle holds); the right stick
//! centers both (pitch/roll snap back). The asymmetry is intentional.
//!
//! ## Pointer identity
//!
//! Exactly one active pointer per widget. A second touch-start while a drag
//! is active is ignored, as are moves and releases for a non-matching id.
//! Mouse input participates only when the `mouse_fallback` option is on
//! (desktop testing).
//!
//! ## Usage
//!
//! ```
//! use drone_console::input::joystick::{CenteringPolicy, Joystick, LayoutBox, Point, PointerId};
//!
//! let layout = LayoutBox { left: 0.0, top: 0.0, width: 100.0, height: 100.0 };
//! let mut stick = Joystick::new(CenteringPolicy::both());
//!
//! let update = stick
//!     .pointer_down(PointerId::Touch(0), Point { x: 65.0, y: 50.0 }, &layout)
//!     .unwrap();
//! assert_eq!(update.vector.x, -5.0); // 15 units right / 30 radius * -10 scale
//! ```

/// Default visual radius in display units.
pub const DEFAULT_MAX_DISTANCE: f64 = 30.0;

/// Default scale applied to the clamped normalized vector.
/// The sign flip matches the peer's expected axis convention.
pub const DEFAULT_SCALE_FACTOR: f64 = -10.0;

/// A point in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Distance from the origin.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// The joystick widget's current bounding box in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutBox {
    /// Center point of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point {
            x: self.left + self.width / 2.0,
            y: self.top + self.height / 2.0,
        }
    }
}

/// Per-axis rule for whether an axis returns to zero on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenteringPolicy {
    pub center_x: bool,
    pub center_y: bool,
}

impl CenteringPolicy {
    /// Both axes snap back to zero on release (pitch/roll stick).
    #[must_use]
    pub fn both() -> Self {
        Self {
            center_x: true,
            center_y: true,
        }
    }

    /// Only the X axis snaps back; Y holds its last value (throttle/yaw stick).
    #[must_use]
    pub fn horizontal_only() -> Self {
        Self {
            center_x: true,
            center_y: false,
        }
    }
}

/// Identity of the pointer driving a drag.
///
/// Touch id 0 is a valid identifier and must not be treated as "no touch".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Touch(u64),
    Mouse,
}

/// A control vector after clamping and scaling, ready for the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlVector {
    pub x: f64,
    pub y: f64,
}

/// Result of processing one pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickUpdate {
    /// Offset of the visual handle from the widget center, in display units.
    /// Never exceeds the widget radius.
    pub handle_offset: Point,
    /// Scaled vector to report to the session.
    pub vector: ControlVector,
}

/// One joystick widget instance.
#[derive(Debug)]
pub struct Joystick {
    max_distance: f64,
    scale_factor: f64,
    policy: CenteringPolicy,
    mouse_fallback: bool,
    active: Option<PointerId>,
    last_x: f64,
    last_y: f64,
}

impl Joystick {
    /// Creates a joystick with default geometry and the given centering policy.
    #[must_use]
    pub fn new(policy: CenteringPolicy) -> Self {
        Self::with_options(DEFAULT_MAX_DISTANCE, DEFAULT_SCALE_FACTOR, policy, false)
    }

    /// Creates a joystick with explicit geometry and pointer options.
    ///
    /// # Arguments
    ///
    /// * `max_distance` - Visual radius in display units
    /// * `scale_factor` - Multiplier applied to the clamped normalized vector
    /// * `policy` - Per-axis centering behavior on release
    /// * `mouse_fallback` - Accept mouse press/drag as a synthetic pointer
    #[must_use]
    pub fn with_options(
        max_distance: f64,
        scale_factor: f64,
        policy: CenteringPolicy,
        mouse_fallback: bool,
    ) -> Self {
        Self {
            max_distance,
            scale_factor,
            policy,
            mouse_fallback,
            active: None,
            last_x: 0.0,
            last_y: 0.0,
        }
    }

    /// Returns the centering policy of this instance.
    #[must_use]
    pub fn policy(&self) -> CenteringPolicy {
        self.policy
    }

    /// Whether a drag is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Begins a drag.
    ///
    /// Ignored (returns `None`) when another pointer already owns the widget,
    /// or when the pointer is a mouse and the fallback is disabled.
    pub fn pointer_down(
        &mut self,
        id: PointerId,
        pos: Point,
        layout: &LayoutBox,
    ) -> Option<JoystickUpdate> {
        if self.active.is_some() {
            return None;
        }
        if id == PointerId::Mouse && !self.mouse_fallback {
            return None;
        }

        self.active = Some(id);
        Some(self.track(pos, layout))
    }

    /// Continues a drag. Ignored for a non-matching pointer id.
    pub fn pointer_move(
        &mut self,
        id: PointerId,
        pos: Point,
        layout: &LayoutBox,
    ) -> Option<JoystickUpdate> {
        if self.active != Some(id) {
            return None;
        }
        Some(self.track(pos, layout))
    }

    /// Ends a drag and resolves the resting vector per the centering policy.
    /// Ignored for a non-matching pointer id.
    pub fn pointer_up(&mut self, id: PointerId) -> Option<JoystickUpdate> {
        if self.active != Some(id) {
            return None;
        }
        self.active = None;
        Some(self.release())
    }

    /// Computes handle offset and scaled vector for a pointer position.
    fn track(&mut self, pos: Point, layout: &LayoutBox) -> JoystickUpdate {
        // Center recomputed per move so layout changes are tolerated
        let center = layout.center();
        let raw_x = pos.x - center.x;
        let raw_y = pos.y - center.y;

        let distance = (raw_x * raw_x + raw_y * raw_y).sqrt();
        let angle = raw_y.atan2(raw_x);
        let effective_distance = distance.min(self.max_distance);

        // Stored values stay unclamped: magnitude may exceed 1 when the
        // pointer is dragged beyond the visual radius
        self.last_x = raw_x / self.max_distance;
        self.last_y = raw_y / self.max_distance;

        JoystickUpdate {
            handle_offset: Point {
                x: angle.cos() * effective_distance,
                y: angle.sin() * effective_distance,
            },
            vector: ControlVector {
                x: self.last_x.clamp(-1.0, 1.0) * self.scale_factor,
                y: self.last_y.clamp(-1.0, 1.0) * self.scale_factor,
            },
        }
    }

    /// Resolves the resting position after the pointer is released.
    fn release(&mut self) -> JoystickUpdate {
        let capped_x = self.last_x.clamp(-1.0, 1.0);
        let capped_y = self.last_y.clamp(-1.0, 1.0);

        let rest_x = if self.policy.center_x { 0.0 } else { capped_x };
        let rest_y = if self.policy.center_y { 0.0 } else { capped_y };

        self.last_x = rest_x;
        self.last_y = rest_y;

        let angle = rest_y.atan2(rest_x);
        let distance = (rest_x * rest_x + rest_y * rest_y).sqrt();

        JoystickUpdate {
            handle_offset: Point {
                x: angle.cos() * distance * self.max_distance,
                y: angle.sin() * distance * self.max_distance,
            },
            vector: ControlVector {
                x: rest_x * self.scale_factor,
                y: rest_y * self.scale_factor,
            },
        }
    }
}
