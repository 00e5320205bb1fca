//! Session state and the per-frame update step.
//!
//! A [`Session`] owns everything a run needs: the phase, the bird, the pipe
//! stream, both scores, and the transient effect timers. The only entry
//! points that mutate it are [`Session::jump`], [`Session::restart`] and
//! [`Session::update`], all driven from the single frame loop; the renderer
//! reads the public fields and never writes.
//!
//! Physics is frame-quantized: constants in [`crate::config`] are per-frame
//! amounts, so a run plays out identically regardless of wall-clock jitter.
//! The `now_ms` clock value threaded through the API only feeds the
//! presentational effect timers.

use log::{debug, info};
use rand::Rng;

use crate::config::*;

// ── Phases ──────────────────────────────────────────────────────────────────

/// Top-level mode gating which subsystems run each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Playing,
    GameOver,
}

// ── Entities ────────────────────────────────────────────────────────────────

/// The player. Horizontal position is fixed at `BIRD_X`; `y` is the top edge
/// of the visual box.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub y: f64,
    pub velocity: f64,
    /// Display tilt in degrees, derived from velocity each frame.
    pub rotation: f64,
}

/// A gap-pair obstacle: one vertical opening between a top and bottom pipe.
/// Spawned off the right edge, translated left at the shared speed, and
/// discarded once fully off screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub gap_center: f64,
    pub gap_size: f64,
    /// Set the first frame the bird's center passes the right edge.
    pub scored: bool,
}

impl Pipe {
    pub fn gap_top(&self) -> f64 {
        self.gap_center - self.gap_size / 2.0
    }

    pub fn gap_bottom(&self) -> f64 {
        self.gap_center + self.gap_size / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + PIPE_WIDTH
    }
}

/// Create one pipe at `x`: gap size uniform in `[GAP_MIN, GAP_MAX]`, gap
/// center uniform in a range narrowed by half the gap so the opening never
/// crosses `GAP_CEIL` or `GAP_FLOOR`.
pub fn spawn_pipe(x: f64, rng: &mut impl Rng) -> Pipe {
    let gap_size = rng.gen_range(GAP_MIN..=GAP_MAX);
    let half = gap_size / 2.0;
    Pipe {
        x,
        gap_center: rng.gen_range(GAP_CEIL + half..=GAP_FLOOR - half),
        gap_size,
        scored: false,
    }
}

// ── Collision ───────────────────────────────────────────────────────────────

/// What the collision scan found, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    Ground,
    Ceiling,
    Pipe,
}

/// The shrunk rectangle used for contact tests instead of the full sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Hitbox {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// The bird's hitbox: `HITBOX_SCALE` of the visual box, centered within it.
pub fn bird_hitbox(bird: &Bird) -> Hitbox {
    let width = BIRD_WIDTH * HITBOX_SCALE;
    let height = BIRD_HEIGHT * HITBOX_SCALE;
    Hitbox {
        x: BIRD_X + (BIRD_WIDTH - width) / 2.0,
        y: bird.y + (BIRD_HEIGHT - height) / 2.0,
        width,
        height,
    }
}

/// Scan for a collision: ground, then ceiling, then pipes in spawn order.
/// The first violation wins; at most one collision is reported per frame.
///
/// Pure: mutates nothing. Callers apply the consequences (phase change,
/// position clamp, cues).
pub fn check_collision(bird: &Bird, pipes: &[Pipe]) -> Option<CollisionKind> {
    let hb = bird_hitbox(bird);

    if hb.bottom() >= GROUND_TOP {
        return Some(CollisionKind::Ground);
    }
    if hb.y <= 0.0 {
        return Some(CollisionKind::Ceiling);
    }

    for pipe in pipes {
        let overlap = hb.x < pipe.right() && hb.right() > pipe.x;
        if overlap && (hb.y < pipe.gap_top() || hb.bottom() > pipe.gap_bottom()) {
            return Some(CollisionKind::Pipe);
        }
    }
    None
}

// ── Transient effects ───────────────────────────────────────────────────────

/// A transient presentational effect: a start time and a fixed duration,
/// evaluated against whatever clock value the caller passes in. Expiry is
/// implicit: `fraction` returns `None` once the duration has run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    started_ms: u64,
    duration_ms: u64,
}

impl Effect {
    fn start(now_ms: u64, duration_ms: u64) -> Self {
        Self {
            started_ms: now_ms,
            duration_ms,
        }
    }

    /// Elapsed fraction in `0..1`, or `None` once the effect has expired.
    pub fn fraction(&self, now_ms: u64) -> Option<f64> {
        let elapsed = now_ms.saturating_sub(self.started_ms);
        if elapsed < self.duration_ms {
            Some(elapsed as f64 / self.duration_ms as f64)
        } else {
            None
        }
    }
}

/// All transient effects, each independently armed. None of these gate input
/// or physics; the renderer alone consumes them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Effects {
    /// Short white fade armed on every phase transition.
    pub fade: Option<Effect>,
    /// Red full-field flash armed on collision.
    pub flash: Option<Effect>,
    /// Score-counter hop armed whenever the run score increments.
    pub score_bounce: Option<Effect>,
    /// "New record" banner armed when the best score is beaten.
    pub new_record: Option<Effect>,
}

// ── Frame events ────────────────────────────────────────────────────────────

/// Boundary notifications produced by one input or update step. The caller
/// turns these into audio cues and persistence writes; the core is
/// indifferent to whether that happens.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickEvents {
    /// A jump impulse was applied this step.
    pub jumped: bool,
    /// At least one pipe was cleared this frame.
    pub scored: bool,
    /// The run ended this frame.
    pub died: bool,
    /// The run beat the remembered best; carries the value to persist.
    pub new_best: Option<u32>,
}

// ── Session ─────────────────────────────────────────────────────────────────

/// One whole game instance. Reset wholesale on restart; never partially
/// rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub phase: Phase,
    pub bird: Bird,
    /// Live pipes in spawn order; positions are non-decreasing in that order
    /// since every pipe moves at the one shared speed.
    pub pipes: Vec<Pipe>,
    pub score: u32,
    /// Highest score ever seen; monotone non-decreasing.
    pub best: u32,
    /// True from the frame `best` was beaten until the next restart.
    pub new_record: bool,
    pub effects: Effects,
    /// Ground/hills scroll position, advanced only while Playing.
    pub scroll_x: f64,
    /// Frame counter; drives the wing-flap sprite cycle.
    pub frame: u64,
}

fn bird_start_y() -> f64 {
    FIELD_HEIGHT / 2.0 - BIRD_HEIGHT / 2.0
}

impl Session {
    /// Fresh session in the Start phase, with the two initial pipes seeded
    /// at their canonical offsets. `best` comes from the persistence layer.
    pub fn new(best: u32, rng: &mut impl Rng) -> Self {
        let mut session = Self {
            phase: Phase::Start,
            bird: Bird {
                y: bird_start_y(),
                velocity: 0.0,
                rotation: 0.0,
            },
            pipes: Vec::new(),
            score: 0,
            best,
            new_record: false,
            effects: Effects::default(),
            scroll_x: 0.0,
            frame: 0,
        };
        session.seed_pipes(rng);
        session
    }

    fn seed_pipes(&mut self, rng: &mut impl Rng) {
        self.pipes.clear();
        for x in INITIAL_PIPE_X {
            let pipe = spawn_pipe(x, rng);
            self.pipes.push(pipe);
        }
    }

    /// The single "jump" input. Starts the game from Start, flaps while
    /// Playing, restarts from GameOver. The impulse sets velocity to
    /// `JUMP_VELOCITY` outright; it never accumulates.
    pub fn jump(&mut self, now_ms: u64, rng: &mut impl Rng) -> TickEvents {
        let mut events = TickEvents::default();
        match self.phase {
            Phase::Start => {
                self.change_phase(Phase::Playing, now_ms);
                self.bird.velocity = JUMP_VELOCITY;
                events.jumped = true;
            }
            Phase::Playing => {
                self.bird.velocity = JUMP_VELOCITY;
                events.jumped = true;
            }
            // Restarting is not a flap: no impulse, no jump cue.
            Phase::GameOver => self.reset(now_ms, rng),
        }
        events
    }

    /// The dedicated restart input; only meaningful from GameOver.
    pub fn restart(&mut self, now_ms: u64, rng: &mut impl Rng) {
        if self.phase == Phase::GameOver {
            self.reset(now_ms, rng);
        }
    }

    /// Full session reset straight into Playing: bird recentered, scores and
    /// effects cleared, pipes reseeded at the canonical offsets.
    fn reset(&mut self, now_ms: u64, rng: &mut impl Rng) {
        self.bird = Bird {
            y: bird_start_y(),
            velocity: 0.0,
            rotation: 0.0,
        };
        self.score = 0;
        self.new_record = false;
        self.scroll_x = 0.0;
        self.effects = Effects::default();
        self.seed_pipes(rng);
        self.change_phase(Phase::Playing, now_ms);
    }

    /// All phase changes funnel through here, so every transition arms the
    /// fade and the Playing -> GameOver edge settles the best score.
    /// Returns the new best when it changed.
    fn change_phase(&mut self, to: Phase, now_ms: u64) -> Option<u32> {
        debug!("phase {:?} -> {:?}", self.phase, to);
        let mut new_best = None;
        if self.phase == Phase::Playing && to == Phase::GameOver && self.score > self.best {
            self.best = self.score;
            self.new_record = true;
            self.effects.new_record = Some(Effect::start(now_ms, NEW_RECORD_MS));
            new_best = Some(self.best);
            info!("new record: {}", self.best);
        }
        self.effects.fade = Some(Effect::start(now_ms, FADE_MS));
        self.phase = to;
        new_best
    }

    /// Advance one frame. `now_ms` is the caller's monotonic clock reading;
    /// it drives only the decorative timers, never the physics.
    pub fn update(&mut self, now_ms: u64, rng: &mut impl Rng) -> TickEvents {
        self.frame += 1;
        let mut events = TickEvents::default();

        match self.phase {
            Phase::Start => {
                // Decorative bob only: y moves, velocity never does.
                self.bird.y =
                    bird_start_y() + (now_ms as f64 * BOB_SPEED).sin() * BOB_AMPLITUDE;
                self.bird.rotation = 0.0;
            }
            Phase::Playing => {
                self.scroll_x += GROUND_SPEED;
                self.advance_pipes(rng);
                events.scored = self.update_score(now_ms);
                if let Some(kind) = self.advance_bird() {
                    self.settle_collision(kind);
                    events.new_best = self.change_phase(Phase::GameOver, now_ms);
                    self.effects.flash = Some(Effect::start(now_ms, FLASH_MS));
                    events.died = true;
                    debug!("collision: {kind:?}, score {}", self.score);
                }
            }
            // The world stays frozen at the death frame.
            Phase::GameOver => {}
        }
        events
    }

    /// Translate, recycle, and (when spacing allows) spawn pipes.
    fn advance_pipes(&mut self, rng: &mut impl Rng) {
        for pipe in &mut self.pipes {
            pipe.x -= PIPE_SPEED;
        }
        self.pipes.retain(|p| p.right() >= 0.0);

        let should_spawn = match self.pipes.last() {
            None => true,
            Some(last) => last.x < FIELD_WIDTH - PIPE_SPACING,
        };
        if should_spawn {
            let pipe = spawn_pipe(FIELD_WIDTH, rng);
            self.pipes.push(pipe);
        }
    }

    /// Flag every newly passed pipe and bump the run score once per pipe.
    /// Handles several pipes becoming passable in one frame without ever
    /// double-counting any of them.
    fn update_score(&mut self, now_ms: u64) -> bool {
        let bird_center = BIRD_X + BIRD_WIDTH / 2.0;
        let mut scored = false;
        for pipe in self.pipes.iter_mut().filter(|p| !p.scored) {
            if pipe.right() < bird_center {
                pipe.scored = true;
                self.score += 1;
                scored = true;
            }
        }
        if scored {
            self.effects.score_bounce = Some(Effect::start(now_ms, SCORE_BOUNCE_MS));
            debug!("score: {}", self.score);
        }
        scored
    }

    /// Integrate one frame of bird physics, derive the display tilt, then
    /// run the collision scan.
    fn advance_bird(&mut self) -> Option<CollisionKind> {
        self.bird.velocity = (self.bird.velocity + GRAVITY).min(TERMINAL_VELOCITY);
        self.bird.y += self.bird.velocity;
        self.bird.rotation = tilt_for(self.bird.velocity);
        check_collision(&self.bird, &self.pipes)
    }

    /// Apply the positional consequences of a collision: pin the bird onto
    /// the violated surface and kill its motion.
    fn settle_collision(&mut self, kind: CollisionKind) {
        let inset = (BIRD_HEIGHT - BIRD_HEIGHT * HITBOX_SCALE) / 2.0;
        match kind {
            CollisionKind::Ground => {
                self.bird.y = GROUND_TOP - BIRD_HEIGHT * HITBOX_SCALE - inset;
            }
            CollisionKind::Ceiling => {
                self.bird.y = -inset;
            }
            CollisionKind::Pipe => {}
        }
        self.bird.velocity = 0.0;
    }
}

/// Map velocity to the display tilt: nose-up while rising, nose-down while
/// falling, clamped to -30..90 degrees.
fn tilt_for(velocity: f64) -> f64 {
    if velocity < 0.0 {
        (velocity * ROT_UP_FACTOR).max(ROT_MIN_DEG)
    } else {
        (velocity * ROT_DOWN_FACTOR).min(ROT_MAX_DEG)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn effect_fraction_runs_then_expires() {
        let effect = Effect::start(100, 300);
        assert_eq!(effect.fraction(100), Some(0.0));
        assert_eq!(effect.fraction(250), Some(0.5));
        assert_eq!(effect.fraction(400), None);
        // A clock earlier than the start is treated as "just armed".
        assert_eq!(effect.fraction(50), Some(0.0));
    }

    #[test]
    fn hitbox_is_shrunk_and_centered() {
        let bird = Bird {
            y: 30.0,
            velocity: 0.0,
            rotation: 0.0,
        };
        let hb = bird_hitbox(&bird);
        assert!((hb.width - BIRD_WIDTH * HITBOX_SCALE).abs() < 1e-9);
        assert!((hb.height - BIRD_HEIGHT * HITBOX_SCALE).abs() < 1e-9);
        // Same margin on both sides of each axis.
        let left = hb.x - BIRD_X;
        let right = (BIRD_X + BIRD_WIDTH) - hb.right();
        assert!((left - right).abs() < 1e-9);
        let top = hb.y - bird.y;
        let bottom = (bird.y + BIRD_HEIGHT) - hb.bottom();
        assert!((top - bottom).abs() < 1e-9);
    }

    #[test]
    fn tilt_clamps_at_both_extremes() {
        assert!((tilt_for(JUMP_VELOCITY) - JUMP_VELOCITY * ROT_UP_FACTOR).abs() < 1e-9);
        assert_eq!(tilt_for(-100.0), ROT_MIN_DEG);
        assert!((tilt_for(TERMINAL_VELOCITY) - TERMINAL_VELOCITY * ROT_DOWN_FACTOR).abs() < 1e-9);
        assert_eq!(tilt_for(100.0), ROT_MAX_DEG);
        assert_eq!(tilt_for(0.0), 0.0);
    }

    #[test]
    fn new_session_seeds_two_pipes_at_canonical_offsets() {
        let session = Session::new(3, &mut rng());
        assert_eq!(session.phase, Phase::Start);
        assert_eq!(session.best, 3);
        assert_eq!(session.pipes.len(), 2);
        for (pipe, expected_x) in session.pipes.iter().zip(INITIAL_PIPE_X) {
            assert!((pipe.x - expected_x).abs() < 1e-9);
            assert!(!pipe.scored);
        }
    }

    #[test]
    fn spawned_gap_respects_vertical_bounds() {
        let mut r = rng();
        for _ in 0..1000 {
            let pipe = spawn_pipe(FIELD_WIDTH, &mut r);
            assert!(pipe.gap_size >= GAP_MIN && pipe.gap_size <= GAP_MAX);
            assert!(pipe.gap_top() >= GAP_CEIL - 1e-9);
            assert!(pipe.gap_bottom() <= GAP_FLOOR + 1e-9);
        }
    }

    #[test]
    fn several_pipes_passable_in_one_frame_each_score_once() {
        let mut r = rng();
        let mut session = Session::new(0, &mut r);
        session.jump(0, &mut r);
        // Two pipes already fully behind the bird's center, neither scored.
        session.pipes = vec![
            Pipe {
                x: 2.0,
                gap_center: 30.0,
                gap_size: 20.0,
                scored: false,
            },
            Pipe {
                x: 14.0,
                gap_center: 35.0,
                gap_size: 20.0,
                scored: false,
            },
        ];
        let events = session.update(33, &mut r);
        assert!(events.scored);
        assert_eq!(session.score, 2);
        assert!(session.effects.score_bounce.is_some());
    }

    #[test]
    fn ground_clamp_lands_hitbox_exactly_on_the_ground() {
        let mut r = rng();
        let mut session = Session::new(0, &mut r);
        session.jump(0, &mut r);
        session.bird.y = GROUND_TOP; // well past the surface
        session.bird.velocity = 2.0;
        let events = session.update(33, &mut r);
        assert!(events.died);
        assert_eq!(session.phase, Phase::GameOver);
        assert_eq!(session.bird.velocity, 0.0);
        let hb = bird_hitbox(&session.bird);
        assert!((hb.bottom() - GROUND_TOP).abs() < 1e-9);
        assert!(session.effects.flash.is_some());
    }

    #[test]
    fn ceiling_clamp_pins_hitbox_to_the_top_edge() {
        let mut r = rng();
        let mut session = Session::new(0, &mut r);
        session.jump(0, &mut r);
        session.bird.y = -3.0;
        session.bird.velocity = JUMP_VELOCITY;
        // Keep the pipes away so only the ceiling can trigger.
        session.pipes.clear();
        let events = session.update(33, &mut r);
        assert!(events.died);
        let hb = bird_hitbox(&session.bird);
        assert!(hb.y.abs() < 1e-9);
        assert_eq!(session.bird.velocity, 0.0);
    }

    #[test]
    fn every_transition_arms_the_fade() {
        let mut r = rng();
        let mut session = Session::new(0, &mut r);
        assert!(session.effects.fade.is_none());
        session.jump(10, &mut r);
        let fade = session.effects.fade.expect("start -> playing arms fade");
        assert_eq!(fade.fraction(10), Some(0.0));

        session.bird.y = GROUND_TOP;
        session.update(500, &mut r);
        let fade = session.effects.fade.expect("playing -> game over arms fade");
        assert_eq!(fade.fraction(500), Some(0.0));
    }

    #[test]
    fn restart_input_is_ignored_outside_game_over() {
        let mut r = rng();
        let mut session = Session::new(0, &mut r);
        session.restart(0, &mut r);
        assert_eq!(session.phase, Phase::Start);
        session.jump(0, &mut r);
        session.score = 4;
        session.restart(33, &mut r);
        assert_eq!(session.phase, Phase::Playing);
        assert_eq!(session.score, 4);
    }
}
