use std::fs::File;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use crossterm::cursor;
use crossterm::event;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::execute;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use lifefield::config::Config;
use lifefield::input::DOTS_PER_ROW;
use lifefield::input::InputState;
use lifefield::input::reaches_every_cell;
use lifefield::render::Canvas;
use lifefield::session::Effect;
use lifefield::session::Mode;
use lifefield::session::Scheduled;
use lifefield::session::Session;
use lifefield::session::TickToken;

/// How long to wait for input when no tick is pending
const IDLE_POLL: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::discover(path.as_deref()).context("Failed to load config")?;

    anyhow::ensure!(
        reaches_every_cell(config.cell_size),
        "cell_size must be at least {DOTS_PER_ROW} for the mouse to reach every cell"
    );

    init_logging(&config)?;
    info!(?config, "Starting");

    let mut stdout = io::stdout();

    terminal::enable_raw_mode()?;
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        EnableMouseCapture,
        cursor::Hide
    )?;

    let result = run(&mut stdout, config);

    // Always try to restore the terminal
    let _ = execute!(
        stdout,
        cursor::Show,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    );
    let _ = terminal::disable_raw_mode();

    result
}

/// Log to a file, since the terminal belongs to the UI. `RUST_LOG` overrides the default
/// `info` level.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("Failed to create {}", config.log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn run(stdout: &mut io::Stdout, config: Config) -> anyhow::Result<()> {
    let (w, h) = config.canvas_size();
    let mut canvas = Canvas::new(w, h);
    let mut session = Session::new(config)?;
    let mut input = InputState::default();

    // The next tick of the simulation loop, if any
    let mut pending: Option<(TickToken, Instant)> = None;
    let mut message = String::new();
    let mut dirty = true;

    session.render(&mut canvas);

    loop {
        if dirty {
            draw(stdout, &mut canvas, &session, &input, &message)?;
            dirty = false;
        }

        let timeout = pending
            .map(|(_, at)| at.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_POLL);

        if event::poll(timeout)? {
            let event = event::read()?;
            dirty = true;

            if let Some(event) = input.convert(event) {
                match session.handle(event) {
                    Ok(Effect::None) => {}
                    Ok(Effect::Redraw) => {
                        session.render(&mut canvas);
                    }
                    Ok(Effect::Schedule(scheduled)) => pending = Some(due(scheduled)),
                    Ok(Effect::Exported(path)) => {
                        message = format!("Field exported to {}", path.display());
                    }
                    Ok(Effect::Exit) => break,
                    Err(e) => {
                        warn!(error = %e, "Event failed");
                        message = e.to_string();
                    }
                }
            }
        }

        if let Some((token, at)) = pending {
            if Instant::now() >= at {
                pending = session.tick(token, &mut canvas).map(due);
                dirty = true;
            }
        }
    }

    info!(generation = session.generation(), "Exiting");

    Ok(())
}

fn due(scheduled: Scheduled) -> (TickToken, Instant) {
    (scheduled.token, Instant::now() + scheduled.after)
}

fn hints(mode: Mode) -> &'static str {
    match mode {
        Mode::SelectingGeneration => "[r] random  [c] custom  [i] import  [q] exit",
        Mode::Editing(_) => "drag to paint  [enter] continue  [n] start again  [q] exit",
        Mode::Ready => "[enter] continue  [n] start again  [q] exit",
        Mode::Running => "[space] pause  [n] start again  [q] exit",
        Mode::Paused => "[space] play  [e] export field  [n] start again  [q] exit",
    }
}

fn draw(
    stdout: &mut io::Stdout,
    canvas: &mut Canvas,
    session: &Session,
    input: &InputState,
    message: &str,
) -> io::Result<()> {
    queue!(stdout, cursor::MoveTo(0, 0))?;

    let mut print_line = |line: &str| {
        queue!(
            stdout,
            style::Print(line),
            terminal::Clear(terminal::ClearType::UntilNewLine),
            cursor::MoveToNextLine(1)
        )
    };

    for line in canvas.render().lines() {
        print_line(line)?;
    }

    // Counters of the generation on screen, which a tick has already stepped past
    let frame = session.frame();
    let status = format!(
        "{} | generation {} | population {}",
        session.mode().name(),
        frame.generation,
        frame.population
    );

    print_line(&status)?;
    print_line(hints(session.mode()))?;

    if let Some(prompt) = input.prompt() {
        print_line(&format!("import file: {prompt}"))?;
    }

    if !message.is_empty() {
        print_line(message)?;
    }

    queue!(stdout, terminal::Clear(terminal::ClearType::FromCursorDown))?;

    stdout.flush()
}
