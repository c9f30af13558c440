use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::config::Config;
use crate::config::ConfigError;
use crate::events::Event;
use crate::field::FieldCodec;
use crate::field::FieldError;
use crate::grid::Grid;
use crate::paint::PaintState;
use crate::paint::to_cell_coords;
use crate::render::Surface;
use crate::world::World;

/// What the session is currently doing. Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for a choice between a random, custom, or imported field
    SelectingGeneration,

    /// Drawing a custom field
    Editing(PaintState),

    /// A field is loaded and the simulation can start
    Ready,

    Running,

    /// Simulation halted. Fields can be exported from here.
    Paused,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::SelectingGeneration => "select generation",
            Mode::Editing(_) => "editing",
            Mode::Ready => "ready",
            Mode::Running => "running",
            Mode::Paused => "paused",
        }
    }
}

/// Identifies one run of the simulation loop.
///
/// Pausing or restarting starts a new epoch, which turns every token handed out before into a
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken(u64);

/// A request to call [`Session::tick`] with `token` once `after` has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub token: TickToken,
    pub after: Duration,
}

/// The generation last drawn onto a surface, as opposed to the one the world holds now.
///
/// A tick draws a generation and then steps past it, so status text shown next to the picture
/// should come from here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    pub generation: u64,
    pub population: usize,
}

/// What the front end should do after an event was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing changed
    None,

    /// The field or mode changed and should be drawn again
    Redraw,

    /// The simulation loop (re)started
    Schedule(Scheduled),

    /// The field was written to this file
    Exported(PathBuf),

    Exit,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Import failed: {0}")]
    Import(#[source] FieldError),

    #[error("Export failed: {0}")]
    Export(#[source] FieldError),
}

/// The interactive core: the world, the current mode, and the field codec.
///
/// Front ends feed it [`Event`]s, honour the returned [`Effect`]s, and call [`Session::tick`]
/// whenever a scheduled tick comes due.
pub struct Session {
    config: Config,
    world: World,
    mode: Mode,
    codec: FieldCodec,
    rng: StdRng,

    /// Current run of the simulation loop
    epoch: u64,

    /// Last drawn generation
    frame: Frame,
}

impl Session {
    /// Start a session with an empty field. Fails if `config` doesn't pass
    /// [`Config::validate`].
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Like [`Session::new`], with a given source of randomness for random fields
    pub fn with_rng(config: Config, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let world = World::new(config.grid_width, config.grid_height, config.rule);
        let codec = FieldCodec::new(config.export_dir.clone());

        Ok(Self {
            config,
            world,
            mode: Mode::SelectingGeneration,
            codec,
            rng,
            epoch: 0,
            frame: Frame::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn grid(&self) -> &Grid {
        self.world.grid()
    }

    pub fn generation(&self) -> u64 {
        self.world.generation()
    }

    /// What the last [`Session::render`] or [`Session::tick`] drew
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn codec(&self) -> &FieldCodec {
        &self.codec
    }

    /// Apply `event` to the session.
    ///
    /// Events that make no sense in the current mode are ignored. Failed imports and exports
    /// leave the session untouched.
    pub fn handle(&mut self, event: Event) -> Result<Effect, SessionError> {
        match (self.mode, event) {
            (_, Event::Exit) => Ok(Effect::Exit),

            (_, Event::Restart) => {
                self.restart();
                Ok(Effect::Redraw)
            }

            (Mode::SelectingGeneration, Event::StartRandom) => {
                self.world.reset();
                self.world.grid_mut().randomize(&mut self.rng);
                self.set_mode(Mode::Ready);
                Ok(Effect::Redraw)
            }

            (Mode::SelectingGeneration, Event::StartCustom) => {
                self.world.reset();
                self.set_mode(Mode::Editing(PaintState::default()));
                Ok(Effect::Redraw)
            }

            (Mode::SelectingGeneration, Event::Import(path)) => {
                self.import(&path)?;
                self.set_mode(Mode::Ready);
                Ok(Effect::Redraw)
            }

            (Mode::Editing(_) | Mode::Ready, Event::ContinueToRun) => Ok(self.start_loop()),

            (Mode::Running, Event::TogglePause) => {
                self.epoch += 1;
                self.set_mode(Mode::Paused);
                Ok(Effect::Redraw)
            }

            (Mode::Paused, Event::TogglePause) => Ok(self.start_loop()),

            (Mode::Paused, Event::Export) => {
                let path = self
                    .codec
                    .export(self.world.grid())
                    .map_err(SessionError::Export)?;

                Ok(Effect::Exported(path))
            }

            (Mode::Editing(mut paint), Event::PointerDown { x, y }) => {
                let (x, y) = to_cell_coords(x, y, self.config.cell_size);
                let changed = paint.press(self.world.grid_mut(), x, y);
                self.mode = Mode::Editing(paint);

                Ok(redraw_if(changed))
            }

            (Mode::Editing(mut paint), Event::PointerMove { x, y }) => {
                let (x, y) = to_cell_coords(x, y, self.config.cell_size);
                let changed = paint.drag(self.world.grid_mut(), x, y);
                self.mode = Mode::Editing(paint);

                Ok(redraw_if(changed))
            }

            (Mode::Editing(mut paint), Event::PointerUp) => {
                paint.release();
                self.mode = Mode::Editing(paint);

                Ok(Effect::None)
            }

            (mode, event) => {
                debug!(mode = mode.name(), ?event, "Ignoring event");
                Ok(Effect::None)
            }
        }
    }

    /// One step of the simulation loop: draw the current generation onto `surface`, then
    /// advance the world. [`Session::frame`] keeps describing the drawn generation.
    ///
    /// Returns when to tick next, or `None` if `token` is stale or the session isn't running, in
    /// which case nothing happens.
    pub fn tick<S: Surface>(&mut self, token: TickToken, surface: &mut S) -> Option<Scheduled> {
        if self.mode != Mode::Running || token != TickToken(self.epoch) {
            trace!(?token, epoch = self.epoch, "Dropping stale tick");
            return None;
        }

        self.render(surface);
        self.world.step();

        trace!(generation = self.world.generation(), "Stepped");

        Some(Scheduled {
            token,
            after: self.config.update_interval(),
        })
    }

    /// Draw every live cell of the current generation onto `surface`
    pub fn render<S: Surface>(&mut self, surface: &mut S) -> Frame {
        let size = self.config.cell_size as usize;
        let mut population = 0;

        surface.clear();
        for (x, y) in self.world.grid().live_cells() {
            surface.fill_cell(x * size, y * size, size);
            population += 1;
        }

        self.frame = Frame {
            generation: self.world.generation(),
            population,
        };

        self.frame
    }

    fn import(&mut self, path: &Path) -> Result<(), SessionError> {
        let (width, height) = (self.config.grid_width, self.config.grid_height);

        let grid = self
            .codec
            .import(path, width, height)
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "Rejected field");
                SessionError::Import(e)
            })?;

        self.world.replace(grid).map_err(|grid| {
            SessionError::Import(FieldError::DimensionMismatch {
                width,
                height,
                got_width: grid.width(),
                got_height: grid.height(),
            })
        })
    }

    fn start_loop(&mut self) -> Effect {
        self.epoch += 1;
        self.set_mode(Mode::Running);

        Effect::Schedule(Scheduled {
            token: TickToken(self.epoch),
            after: Duration::ZERO,
        })
    }

    fn restart(&mut self) {
        self.epoch += 1;
        self.world.reset();
        self.set_mode(Mode::SelectingGeneration);
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            info!(from = self.mode.name(), to = mode.name(), "Mode change");
        }

        self.mode = mode;
    }
}

fn redraw_if(changed: bool) -> Effect {
    if changed { Effect::Redraw } else { Effect::None }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::Effect;
    use super::Frame;
    use super::Mode;
    use super::Scheduled;
    use super::Session;
    use crate::cell::Cell;
    use crate::config::Config;
    use crate::config::ConfigError;
    use crate::events::Event;
    use crate::render::Surface;

    /// Records draw calls
    #[derive(Default)]
    struct Recorder {
        clears: usize,
        cells: Vec<(usize, usize, usize)>,
    }

    impl Surface for Recorder {
        fn clear(&mut self) {
            self.clears += 1;
            self.cells.clear();
        }

        fn fill_cell(&mut self, x: usize, y: usize, size: usize) {
            self.cells.push((x, y, size));
        }
    }

    fn config() -> Config {
        Config {
            cell_size: 10,
            grid_width: 5,
            grid_height: 5,
            ..Config::default()
        }
    }

    fn session() -> Session {
        Session::with_rng(config(), StdRng::seed_from_u64(1)).unwrap()
    }

    fn schedule(effect: Effect) -> Scheduled {
        match effect {
            Effect::Schedule(s) => s,
            other => panic!("expected a schedule, got {other:?}"),
        }
    }

    #[test]
    fn starts_selecting() {
        let session = session();

        assert_eq!(session.mode(), Mode::SelectingGeneration);
        assert_eq!(session.grid().population(), 0);
    }

    #[test]
    fn custom_then_run() {
        let mut session = session();

        session.handle(Event::StartCustom).unwrap();
        assert!(matches!(session.mode(), Mode::Editing(_)));

        session.handle(Event::PointerDown { x: 15, y: 5 }).unwrap();
        session.handle(Event::PointerMove { x: 25, y: 5 }).unwrap();
        session.handle(Event::PointerMove { x: 35, y: 5 }).unwrap();
        session.handle(Event::PointerUp).unwrap();

        assert_eq!(
            session.grid().live_cells().collect::<Vec<_>>(),
            vec![(1, 0), (2, 0), (3, 0)]
        );

        let scheduled = schedule(session.handle(Event::ContinueToRun).unwrap());
        assert_eq!(session.mode(), Mode::Running);
        assert_eq!(scheduled.after.as_millis(), 0);
    }

    #[test]
    fn second_stroke_picks_its_own_color() {
        let mut session = session();
        session.handle(Event::StartCustom).unwrap();

        session.handle(Event::PointerDown { x: 0, y: 0 }).unwrap();
        session.handle(Event::PointerMove { x: 10, y: 0 }).unwrap();
        session.handle(Event::PointerUp).unwrap();

        // Starts on a live cell, so it erases
        session.handle(Event::PointerDown { x: 0, y: 0 }).unwrap();
        session.handle(Event::PointerMove { x: 10, y: 0 }).unwrap();
        session.handle(Event::PointerUp).unwrap();
        assert_eq!(session.grid().population(), 0);

        // Starts on a dead cell, so it draws
        session.handle(Event::PointerDown { x: 40, y: 40 }).unwrap();
        assert_eq!(session.grid().get(4, 4), Some(Cell::Alive));
    }

    #[test]
    fn pointer_outside_edit_mode_is_ignored() {
        let mut session = session();

        let effect = session.handle(Event::PointerDown { x: 0, y: 0 }).unwrap();

        assert_eq!(effect, Effect::None);
        assert_eq!(session.grid().population(), 0);
    }

    #[test]
    fn random_goes_to_ready() {
        let mut session = session();

        session.handle(Event::StartRandom).unwrap();

        assert_eq!(session.mode(), Mode::Ready);

        // Painting is only for custom fields
        let before = session.grid().clone();
        session.handle(Event::PointerDown { x: 0, y: 0 }).unwrap();
        assert_eq!(session.grid(), &before);
    }

    #[test]
    fn tick_renders_then_steps() {
        let mut session = session();
        session.handle(Event::StartCustom).unwrap();
        session.handle(Event::PointerDown { x: 20, y: 20 }).unwrap();
        session.handle(Event::PointerUp).unwrap();

        let scheduled = schedule(session.handle(Event::ContinueToRun).unwrap());

        let mut surface = Recorder::default();
        let next = session.tick(scheduled.token, &mut surface).unwrap();

        assert_eq!(surface.clears, 1);
        assert_eq!(surface.cells, vec![(20, 20, 10)]);
        assert_eq!(session.grid().population(), 0);
        assert_eq!(session.generation(), 1);
        assert_eq!(next.after, config().update_interval());
    }

    #[test]
    fn frame_describes_the_drawn_generation() {
        let mut session = session();
        session.handle(Event::StartCustom).unwrap();

        // A blinker, which keeps three live cells in every generation
        session.handle(Event::PointerDown { x: 10, y: 20 }).unwrap();
        session.handle(Event::PointerMove { x: 20, y: 20 }).unwrap();
        session.handle(Event::PointerMove { x: 30, y: 20 }).unwrap();
        session.handle(Event::PointerUp).unwrap();

        let mut surface = Recorder::default();
        assert_eq!(
            session.render(&mut surface),
            Frame {
                generation: 0,
                population: 3
            }
        );

        let scheduled = schedule(session.handle(Event::ContinueToRun).unwrap());
        let next = session.tick(scheduled.token, &mut surface).unwrap();

        // The world moved on, but the surface still shows generation 0
        assert_eq!(session.generation(), 1);
        assert_eq!(session.frame().generation, 0);
        assert_eq!(session.frame().population, surface.cells.len());

        session.tick(next.token, &mut surface).unwrap();
        assert_eq!(session.generation(), 2);
        assert_eq!(session.frame().generation, 1);
        assert_eq!(surface.cells, vec![(20, 10, 10), (20, 20, 10), (20, 30, 10)]);
    }

    #[test]
    fn rejects_invalid_configs() {
        let zero = Config {
            grid_width: 0,
            ..config()
        };
        assert!(matches!(
            Session::with_rng(zero, StdRng::seed_from_u64(1)),
            Err(ConfigError::Zero { field: "grid_width" })
        ));

        let huge = Config {
            grid_height: i32::MAX as usize + 1,
            ..config()
        };
        assert!(matches!(
            Session::with_rng(huge, StdRng::seed_from_u64(1)),
            Err(ConfigError::TooLarge { field: "grid_height", .. })
        ));
    }

    #[test]
    fn pause_and_resume() {
        let mut session = session();
        session.handle(Event::StartRandom).unwrap();
        let first = schedule(session.handle(Event::ContinueToRun).unwrap());

        let mut surface = Recorder::default();
        session.tick(first.token, &mut surface).unwrap();

        session.handle(Event::TogglePause).unwrap();
        assert_eq!(session.mode(), Mode::Paused);

        // The tick scheduled before the pause must not step
        let grid = session.grid().clone();
        assert!(session.tick(first.token, &mut surface).is_none());
        assert_eq!(session.grid(), &grid);
        assert_eq!(session.generation(), 1);

        let second = schedule(session.handle(Event::TogglePause).unwrap());
        assert_eq!(session.mode(), Mode::Running);

        // Still stale after resuming; only the new token drives the loop
        assert!(session.tick(first.token, &mut surface).is_none());
        assert!(session.tick(second.token, &mut surface).is_some());
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn export_only_when_paused() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut session = Session::with_rng(
            Config {
                export_dir: dir.path().to_path_buf(),
                ..config()
            },
            StdRng::seed_from_u64(3),
        )?;

        session.handle(Event::StartRandom)?;
        assert_eq!(session.handle(Event::Export)?, Effect::None);

        session.handle(Event::ContinueToRun)?;
        assert_eq!(session.handle(Event::Export)?, Effect::None);

        session.handle(Event::TogglePause)?;
        let effect = session.handle(Event::Export)?;

        assert_eq!(
            effect,
            Effect::Exported(dir.path().join("game_of_life_field_1.json"))
        );
        assert_eq!(session.mode(), Mode::Paused);

        Ok(())
    }

    #[test]
    fn failed_import_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();

        let result = session.handle(Event::Import(dir.path().join("missing.json")));

        assert!(result.is_err());
        assert_eq!(session.mode(), Mode::SelectingGeneration);
    }

    #[test]
    fn import_only_while_selecting() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        session.handle(Event::StartCustom).unwrap();

        // Would fail if it were attempted
        let effect = session
            .handle(Event::Import(dir.path().join("missing.json")))
            .unwrap();

        assert_eq!(effect, Effect::None);
        assert!(matches!(session.mode(), Mode::Editing(_)));
    }

    #[test]
    fn restart_from_every_mode() {
        let drive: [&[Event]; 5] = [
            &[],
            &[Event::StartCustom, Event::PointerDown { x: 0, y: 0 }],
            &[Event::StartRandom],
            &[Event::StartRandom, Event::ContinueToRun],
            &[Event::StartRandom, Event::ContinueToRun, Event::TogglePause],
        ];

        for events in drive {
            let mut session = session();
            for event in events {
                session.handle(event.clone()).unwrap();
            }

            assert_eq!(session.handle(Event::Restart).unwrap(), Effect::Redraw);
            assert_eq!(session.mode(), Mode::SelectingGeneration);
            assert_eq!(session.grid().population(), 0);
            assert_eq!(session.grid().width(), 5);
            assert_eq!(session.grid().height(), 5);
        }
    }

    #[test]
    fn restart_invalidates_ticks() {
        let mut session = session();
        session.handle(Event::StartRandom).unwrap();
        let scheduled = schedule(session.handle(Event::ContinueToRun).unwrap());

        session.handle(Event::Restart).unwrap();

        assert!(session.tick(scheduled.token, &mut Recorder::default()).is_none());
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn exit_from_anywhere() {
        let mut session = session();
        session.handle(Event::StartCustom).unwrap();

        assert_eq!(session.handle(Event::Exit).unwrap(), Effect::Exit);
    }
}
