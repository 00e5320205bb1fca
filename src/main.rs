use std::io::{self, Write, stdout};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, queue,
    style::{self, Print},
    terminal,
};
use rand::thread_rng;

use gapwing::audio::AudioCues;
use gapwing::config::{FIELD_HEIGHT, FIELD_WIDTH, FRAME_MS};
use gapwing::game::Session;
use gapwing::render::{self, PixelBuf};
use gapwing::store::ScoreStore;

/// A Flappy Bird style arcade game for the terminal.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Start with audio muted.
    #[arg(long)]
    mute: bool,
    /// Show the frame-rate counter.
    #[arg(long)]
    fps: bool,
}

fn main() -> io::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = ScoreStore::open();
    let mut session = Session::new(store.load(), &mut thread_rng());
    let mut audio = AudioCues::new(args.mute);
    let mut show_fps = args.fps;

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let result = run(&mut out, &mut session, &mut audio, &store, &mut show_fps);

    // Always restore the terminal, even when the loop errored.
    let _ = execute!(
        out,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    );
    let _ = terminal::disable_raw_mode();
    result
}

fn run(
    out: &mut io::Stdout,
    session: &mut Session,
    audio: &mut AudioCues,
    store: &ScoreStore,
    show_fps: &mut bool,
) -> io::Result<()> {
    let mut rng = thread_rng();
    let start = Instant::now();
    let frame_dur = Duration::from_millis(FRAME_MS);
    let mut buf = PixelBuf::new(FIELD_WIDTH as usize, FIELD_HEIGHT as usize);

    let (mut cols, mut rows) = terminal::size()?;
    execute!(out, terminal::Clear(terminal::ClearType::All))?;

    // FPS measured over half-second windows.
    let mut fps = 0u32;
    let mut window_frames = 0u32;
    let mut window_start = Instant::now();

    loop {
        let frame_start = Instant::now();
        let now_ms = start.elapsed().as_millis() as u64;

        // Drain pending input without blocking.
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => {
                        let events = session.jump(now_ms, &mut rng);
                        if events.jumped {
                            audio.jump();
                        }
                    }
                    KeyCode::Char('r') => session.restart(now_ms, &mut rng),
                    KeyCode::Char('m') => audio.toggle_mute(),
                    KeyCode::Char('f') => *show_fps = !*show_fps,
                    _ => {}
                },
                Event::Resize(c, r) => {
                    cols = c;
                    rows = r;
                    // Repaint the letterbox around the (unchanged) field.
                    execute!(out, terminal::Clear(terminal::ClearType::All))?;
                }
                _ => {}
            }
        }

        let events = session.update(now_ms, &mut rng);
        if events.scored {
            audio.score();
        }
        if events.died {
            audio.death();
        }
        if let Some(best) = events.new_best {
            store.save(best);
        }

        window_frames += 1;
        let window_ms = window_start.elapsed().as_millis() as u32;
        if window_ms >= 500 {
            fps = window_frames * 1000 / window_ms.max(1);
            window_frames = 0;
            window_start = Instant::now();
        }

        let field_cols = FIELD_WIDTH as u16;
        let field_rows = FIELD_HEIGHT as u16 / 2;
        if cols < field_cols || rows < field_rows {
            draw_resize_notice(out, cols, rows, field_cols, field_rows)?;
        } else {
            render::draw(session, now_ms, show_fps.then_some(fps), audio.muted(), &mut buf);
            let col0 = (cols - field_cols) / 2;
            let row0 = (rows - field_rows) / 2;
            buf.render(out, col0, row0)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

fn draw_resize_notice(
    out: &mut io::Stdout,
    cols: u16,
    rows: u16,
    need_cols: u16,
    need_rows: u16,
) -> io::Result<()> {
    let msg = format!("terminal too small: need {need_cols}x{need_rows}");
    queue!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(
            cols.saturating_sub(msg.len() as u16) / 2,
            rows.saturating_sub(1) / 2
        ),
        style::ResetColor,
        Print(&msg),
    )?;
    out.flush()
}
