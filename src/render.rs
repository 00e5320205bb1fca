//! Half-block pixel rendering.
//!
//! The whole frame is composed into an RGB pixel buffer the size of the
//! logical field and flushed with `▀` cells (two pixels per terminal cell),
//! batching color changes so a frame is a few KB of escape codes. Everything
//! here reads the [`Session`] and the frame clock; nothing writes game state.

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

use crate::config::*;
use crate::game::{Bird, Phase, Pipe, Session};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }
}

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const GRASS: Rgb = Rgb(84, 168, 55);
const GRASS_LIGHT: Rgb = Rgb(110, 200, 70);
const DIRT: Rgb = Rgb(210, 185, 110);
const DIRT_DARK: Rgb = Rgb(185, 160, 90);
const PANEL_LIGHT: Rgb = Rgb(220, 195, 120);
const PIPE_EDGE: Rgb = Rgb(74, 122, 26);
const PIPE_MID: Rgb = Rgb(100, 170, 40);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const PIPE_SIDE: Rgb = Rgb(115, 191, 46);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_BODY: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const BIRD_BEAK_HI: Rgb = Rgb(240, 110, 50);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const GOLD: Rgb = Rgb(255, 215, 0);
const RED: Rgb = Rgb(255, 0, 0);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const FPS_GREEN: Rgb = Rgb(120, 255, 120);
const MUTE_RED: Rgb = Rgb(200, 70, 60);

// ── Pixel buffer ────────────────────────────────────────────────────────────

/// Field-sized RGB buffer flushed with half-block characters; pixel (x, y)
/// maps to the top or bottom half of terminal cell (x, y / 2).
pub struct PixelBuf {
    w: usize,
    h: usize,
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    /// Blend every pixel toward `color` by `t_256 / 256`.
    fn wash(&mut self, color: Rgb, t_256: u16) {
        for px in &mut self.px {
            *px = Rgb::lerp(*px, color, t_256);
        }
    }

    /// Flush the buffer with its top-left terminal cell at (col0, row0).
    pub fn render(&self, out: &mut impl Write, col0: u16, row0: u16) -> io::Result<()> {
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            queue!(out, cursor::MoveTo(col0, row0 + row as u16))?;
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(
                            out,
                            style::SetForegroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: bot.0,
                                g: bot.1,
                                b: bot.2
                            })
                        )?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

// ── 3x5 bitmap digits ───────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, fg: Rgb) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    let s = n.to_string();
    let total_w = s.len() as i32 * 4 - 1; // 3px per digit + 1px spacing
    let start_x = cx - total_w / 2;
    for (i, ch) in s.chars().enumerate() {
        let d = ch as u8 - b'0';
        draw_digit(buf, start_x + i as i32 * 4, y, d, fg);
    }
}

// ── Frame composition ───────────────────────────────────────────────────────

/// Compose one frame of the session into `buf`. `fps` is drawn when the
/// counter is enabled; `muted` adds the small mute marker.
pub fn draw(session: &Session, now_ms: u64, fps: Option<u32>, muted: bool, buf: &mut PixelBuf) {
    draw_sky(buf);
    draw_hills(session.scroll_x, buf);
    draw_pipes(&session.pipes, buf);
    draw_ground(session.scroll_x, buf);
    draw_bird(&session.bird, session.frame, buf);

    match session.phase {
        Phase::Start => draw_title(now_ms, buf),
        Phase::Playing => draw_score(session, now_ms, buf),
        Phase::GameOver => {
            draw_game_over(session, now_ms, buf);
            draw_score(session, now_ms, buf);
        }
    }

    // Full-field overlays, death flash first so the fade sits on top.
    if let Some(f) = session.effects.flash.and_then(|e| e.fraction(now_ms)) {
        let alpha = 0.5 * (1.0 - f);
        buf.wash(RED, (alpha * 256.0) as u16);
    }
    if let Some(f) = session.effects.fade.and_then(|e| e.fraction(now_ms)) {
        // Up then back down, peaking at 0.3.
        let alpha = if f < 0.5 { f } else { 1.0 - f } * 2.0 * 0.3;
        buf.wash(WHITE, (alpha * 256.0) as u16);
    }

    if let Some(fps) = fps {
        draw_number(buf, 8, 2, fps, FPS_GREEN);
    }
    if muted {
        buf.fill_rect(FIELD_WIDTH as i32 - 5, 2, 3, 3, MUTE_RED);
    }
}

fn draw_sky(buf: &mut PixelBuf) {
    let sky_h = GROUND_TOP as usize;
    for y in 0..sky_h {
        let t = (y as u16 * 256) / sky_h as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        for x in 0..FIELD_WIDTH as i32 {
            buf.set(x, y as i32, c);
        }
    }
}

fn draw_hills(scroll_x: f64, buf: &mut PixelBuf) {
    let base = GROUND_TOP as i32;
    // Far ridge drifts at a fifth of the ground speed, near at two fifths.
    for x in 0..FIELD_WIDTH as i32 {
        let fx = (x as f64 + scroll_x * 0.2) * 0.05;
        let h = fx.sin() * 4.0 + (fx * 1.7).sin() * 2.0;
        let top = base - h as i32 - 4;
        for y in top..base {
            buf.set(x, y, HILL_FAR);
        }
    }
    for x in 0..FIELD_WIDTH as i32 {
        let fx = (x as f64 + scroll_x * 0.4) * 0.07;
        let h = fx.sin() * 3.0 + (fx * 2.3).sin() * 1.5;
        let top = base - h as i32 - 2;
        for y in top..base {
            buf.set(x, y, HILL_NEAR);
        }
    }
}

fn draw_ground(scroll_x: f64, buf: &mut PixelBuf) {
    let gy = GROUND_TOP as i32;
    // Grass strip with scrolling stripes.
    for x in 0..FIELD_WIDTH as i32 {
        let alt = ((x as f64 + scroll_x) as i32 / 3) % 2 == 0;
        buf.set(x, gy, if alt { GRASS } else { GRASS_LIGHT });
        buf.set(x, gy + 1, GRASS);
    }
    // Dirt with slow diagonal banding.
    for y in (gy + 2)..FIELD_HEIGHT as i32 {
        for x in 0..FIELD_WIDTH as i32 {
            let stripe = ((x as f64 + scroll_x * 0.8) as i32 + (y - gy) * 2) % 12 < 6;
            buf.set(x, y, if stripe { DIRT } else { DIRT_DARK });
        }
    }
}

/// Cylinder-ish shading across the pipe body: dark edges, lit left-center.
fn pipe_shade(x: i32, w: i32) -> Rgb {
    if x <= 0 || x >= w - 1 {
        PIPE_EDGE
    } else if x < w / 3 {
        PIPE_MID
    } else if x < w / 2 {
        PIPE_HI
    } else {
        PIPE_SIDE
    }
}

fn draw_pipes(pipes: &[Pipe], buf: &mut PixelBuf) {
    const CAP_H: i32 = 2;
    const CAP_EXTRA: i32 = 1;
    let pw = PIPE_WIDTH as i32;
    let ground = GROUND_TOP as i32;

    for pipe in pipes {
        let px = pipe.x.round() as i32;
        let gap_top = pipe.gap_top().round() as i32;
        let gap_bot = pipe.gap_bottom().round() as i32;

        // Top pipe body, then its lip.
        for x in 0..pw {
            let c = pipe_shade(x, pw);
            for y in 0..gap_top - CAP_H {
                buf.set(px + x, y, c);
            }
        }
        for x in -CAP_EXTRA..(pw + CAP_EXTRA) {
            let c = pipe_shade(x + CAP_EXTRA, pw + CAP_EXTRA * 2);
            for y in (gap_top - CAP_H)..gap_top {
                buf.set(px + x, y, c);
            }
            buf.set(px + x, gap_top - 1, CAP_DARK);
        }

        // Bottom lip, then its body down to the ground.
        for x in -CAP_EXTRA..(pw + CAP_EXTRA) {
            let c = pipe_shade(x + CAP_EXTRA, pw + CAP_EXTRA * 2);
            for y in gap_bot..(gap_bot + CAP_H) {
                buf.set(px + x, y, c);
            }
            buf.set(px + x, gap_bot, CAP_DARK);
        }
        for x in 0..pw {
            let c = pipe_shade(x, pw);
            for y in (gap_bot + CAP_H)..ground {
                buf.set(px + x, y, c);
            }
        }
    }
}

fn draw_bird(bird: &Bird, frame: u64, buf: &mut PixelBuf) {
    let bx = BIRD_X as i32;
    let by = bird.y.round() as i32;
    let w = BIRD_WIDTH as i32;
    let h = BIRD_HEIGHT as i32;
    // Tilt the protruding bits by whole pixels; 30 degrees per pixel covers
    // the -30..90 sweep with offsets -1..2.
    let tilt = ((bird.rotation / 30.0).round() as i32).clamp(-1, 2);

    // Rounded body with a lit crown.
    buf.fill_rect(bx + 1, by, w - 2, 1, BIRD_HI);
    buf.fill_rect(bx, by + 1, w, h - 2, BIRD_BODY);
    buf.fill_rect(bx + 1, by + h - 1, w - 2, 1, BIRD_BODY);

    // Wing, flapping through three positions.
    let wing_off = match (frame / WING_FRAME_DIV) % 3 {
        0 => -1,
        1 => 0,
        _ => 1,
    };
    buf.fill_rect(bx + 1, by + 2 + wing_off, 3, 2, BIRD_WING);

    // Eye toward the beak side.
    buf.set(bx + w - 3, by + 1, BIRD_EYE);
    buf.set(bx + w - 2, by + 1, BIRD_PUPIL);

    // Beak and tail ride the tilt.
    buf.fill_rect(bx + w, by + 1 + tilt, 2, 1, BIRD_BEAK_HI);
    buf.fill_rect(bx + w, by + 2 + tilt, 2, 1, BIRD_BEAK);
    buf.fill_rect(bx - 2, by + 2 + tilt, 2, 2, BIRD_WING);
}

fn draw_score(session: &Session, now_ms: u64, buf: &mut PixelBuf) {
    let mut y = 4;
    // The counter hops one pixel for the first half of the bounce.
    if let Some(f) = session.effects.score_bounce.and_then(|e| e.fraction(now_ms)) {
        if f < 0.5 {
            y -= 1;
        }
    }
    draw_number(buf, FIELD_WIDTH as i32 / 2, y, session.score, WHITE);
}

/// Pulse in 0..1 from the frame clock; `period_ms` per full cycle.
fn pulse(now_ms: u64, period_ms: u64) -> f64 {
    let t = (now_ms % period_ms) as f64 / period_ms as f64;
    (t * std::f64::consts::TAU).sin() * 0.5 + 0.5
}

fn draw_title(now_ms: u64, buf: &mut PixelBuf) {
    let cx = FIELD_WIDTH as i32 / 2;
    let cy = FIELD_HEIGHT as i32 / 5;

    // Blocky seven-letter banner, one solid slab per letter.
    const LETTERS: i32 = 7;
    const CHAR_W: i32 = 6;
    const CHAR_H: i32 = 8;
    let sx = cx - (LETTERS * CHAR_W) / 2;
    for i in 0..LETTERS {
        let bx = sx + i * CHAR_W;
        buf.fill_rect(bx + 1, cy + 1, CHAR_W - 1, CHAR_H, SHADOW);
        buf.fill_rect(bx, cy, CHAR_W - 1, CHAR_H, BIRD_BODY);
        buf.fill_rect(bx, cy, CHAR_W - 1, 1, BIRD_HI);
    }

    // "Tap to start" prompt: a pulsing dotted line under the banner.
    let t = (pulse(now_ms, 2000) * 256.0) as u16;
    let c = Rgb::lerp(SKY_BOT, WHITE, t);
    let prompt_y = cy + CHAR_H + 6;
    let prompt_w = 11 * 4;
    let px = cx - prompt_w / 2;
    for i in 0..11 {
        buf.fill_rect(px + i * 4, prompt_y, 3, 3, c);
    }
}

fn draw_game_over(session: &Session, now_ms: u64, buf: &mut PixelBuf) {
    // Dim the frozen death frame.
    buf.wash(SHADOW, 110);

    let cx = FIELD_WIDTH as i32 / 2;
    let cy = FIELD_HEIGHT as i32 / 2;
    const PANEL_W: i32 = 48;
    const PANEL_H: i32 = 26;
    let px = cx - PANEL_W / 2;
    let py = cy - PANEL_H / 2;

    buf.fill_rect(px - 1, py - 1, PANEL_W + 2, PANEL_H + 2, SHADOW);
    buf.fill_rect(px, py, PANEL_W, PANEL_H, DIRT);
    buf.fill_rect(px + 1, py + 1, PANEL_W - 2, PANEL_H - 2, PANEL_LIGHT);

    // Run score over best score.
    draw_number(buf, cx, py + 5, session.score, WHITE);
    draw_number(buf, cx, py + 15, session.best, if session.new_record { GOLD } else { BIRD_BODY });

    // New-record banner: pulsing gold blocks above the panel while armed.
    if session
        .effects
        .new_record
        .and_then(|e| e.fraction(now_ms))
        .is_some()
    {
        let t = (pulse(now_ms, 400) * 256.0) as u16;
        let c = Rgb::lerp(DIRT, GOLD, t);
        for i in 0..6 {
            buf.fill_rect(px + 6 + i * 6, py - 6, 4, 3, c);
        }
    }

    // Restart prompt, pulsing like the title prompt.
    let t = (pulse(now_ms, 1500) * 256.0) as u16;
    let c = Rgb::lerp(SHADOW, WHITE, t);
    for i in 0..8 {
        buf.fill_rect(cx - 16 + i * 4, py + PANEL_H + 4, 3, 3, c);
    }
}
