//! Fixed game configuration.
//!
//! The play field is a fixed 120x72 logical-pixel canvas (one terminal cell
//! renders 1x2 pixels) that gets centered in the terminal. Nothing here is
//! derived from the terminal size at runtime; the display layer letterboxes
//! instead of renegotiating the geometry.
//!
//! Physics constants are per-frame quantities at the 30 FPS cadence below,
//! not per-second rates.

// ── Field geometry ──────────────────────────────────────────────────────────

pub const FIELD_WIDTH: f64 = 120.0;
pub const FIELD_HEIGHT: f64 = 72.0;
pub const GROUND_HEIGHT: f64 = 12.0;
/// Top edge of the ground strip; the playable sky spans `0..GROUND_TOP`.
pub const GROUND_TOP: f64 = FIELD_HEIGHT - GROUND_HEIGHT;

// ── Bird ────────────────────────────────────────────────────────────────────

/// The bird never moves horizontally; this is the left edge of its box.
pub const BIRD_X: f64 = 26.0;
pub const BIRD_WIDTH: f64 = 7.0;
pub const BIRD_HEIGHT: f64 = 5.0;
/// Fraction of the visual box used for collision, centered within it.
pub const HITBOX_SCALE: f64 = 0.9;

// ── Physics (per frame) ─────────────────────────────────────────────────────

pub const GRAVITY: f64 = 0.28;
pub const JUMP_VELOCITY: f64 = -2.9;
pub const TERMINAL_VELOCITY: f64 = 3.2;

/// Display tilt in degrees per unit of velocity while rising / falling.
/// The tilt sweeps -30..90 degrees over the velocity range above; it is
/// purely visual and never feeds back into collision geometry.
pub const ROT_UP_FACTOR: f64 = 9.0;
pub const ROT_DOWN_FACTOR: f64 = 18.0;
pub const ROT_MIN_DEG: f64 = -30.0;
pub const ROT_MAX_DEG: f64 = 90.0;

// ── Pipes ───────────────────────────────────────────────────────────────────

pub const PIPE_WIDTH: f64 = 10.0;
/// Leftward translation per frame, shared by every pipe.
pub const PIPE_SPEED: f64 = 1.5;
/// A new pipe spawns once the rightmost one is this far from the right edge.
pub const PIPE_SPACING: f64 = 50.0;
pub const GAP_MIN: f64 = 15.0;
pub const GAP_MAX: f64 = 21.0;
/// The gap opening always stays inside `GAP_CEIL..GAP_FLOOR`.
pub const GAP_CEIL: f64 = 12.0;
pub const GAP_FLOOR: f64 = 54.0;

/// Pipe x positions seeded on session creation and on every restart.
pub const INITIAL_PIPE_X: [f64; 2] = [FIELD_WIDTH, FIELD_WIDTH + PIPE_SPACING];

// ── Decoration ──────────────────────────────────────────────────────────────

/// Ground scroll per frame; the hills derive slower parallax from it.
pub const GROUND_SPEED: f64 = 1.8;

/// Start-screen bob: amplitude in pixels, frequency in radians per ms.
pub const BOB_AMPLITUDE: f64 = 2.0;
pub const BOB_SPEED: f64 = 0.003;

/// The wing sprite advances one animation frame every this many game frames.
pub const WING_FRAME_DIV: u64 = 6;

// ── Transient effects (milliseconds) ────────────────────────────────────────

pub const FADE_MS: u64 = 300;
pub const FLASH_MS: u64 = 200;
pub const SCORE_BOUNCE_MS: u64 = 300;
pub const NEW_RECORD_MS: u64 = 2000;

/// Target cadence of the update/render loop (~30 FPS).
pub const FRAME_MS: u64 = 33;
