//! # Input Mapper Module
//!
//! Converts raw pointer/touch coordinates and key events into normalized
//! control vectors and discrete command codes.
//!
//! This module handles:
//! - Joystick polar-to-cartesian mapping with per-axis centering policies
//! - Keyboard key → command table with a global debounce window
//! - Tracking the set of currently-held commands for display

pub mod joystick;
pub mod keyboard;

pub use joystick::{CenteringPolicy, ControlVector, Joystick, JoystickUpdate, LayoutBox, Point, PointerId};
pub use keyboard::{command_for_key, CommandCode, KeyAction, KeyboardControls, KeyboardUpdate};
