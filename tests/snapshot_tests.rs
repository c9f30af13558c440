use lifefield::cell::Cell;
use lifefield::config::Config;
use lifefield::events::Event;
use lifefield::field::FieldCodec;
use lifefield::grid::Grid;
use lifefield::render::Canvas;
use lifefield::session::Effect;
use lifefield::session::Session;

const GLIDER: [(i32, i32); 5] = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];

#[test]
fn test_export_layout() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut codec = FieldCodec::new(dir.path());

    let mut grid = Grid::new(3, 2);
    grid.set(1, 0, Cell::Alive);

    let path = codec.export(&grid)?;

    insta::assert_snapshot!(
        std::fs::read_to_string(path)?,
        @r#"{"grid":[[0,1,0],[0,0,0]],"grid_width":3,"grid_height":2}"#
    );

    Ok(())
}

#[test]
fn test_glider_frames() -> anyhow::Result<()> {
    let config = Config {
        cell_size: 1,
        grid_width: 4,
        grid_height: 4,
        ..Config::default()
    };

    let (w, h) = config.canvas_size();
    let mut canvas = Canvas::new(w, h);
    let mut session = Session::new(config)?;

    session.handle(Event::StartCustom)?;
    for (x, y) in GLIDER {
        session.handle(Event::PointerDown { x, y })?;
        session.handle(Event::PointerUp)?;
    }

    let Effect::Schedule(scheduled) = session.handle(Event::ContinueToRun)? else {
        panic!("expected the loop to start");
    };

    // Each tick draws the current generation before stepping
    let scheduled = session.tick(scheduled.token, &mut canvas).unwrap();
    insta::assert_snapshot!(canvas.render().trim_end(), @"⠬⠆");

    session.tick(scheduled.token, &mut canvas).unwrap();
    insta::assert_snapshot!(canvas.render().trim_end(), @"⢢⠆");

    assert_eq!(session.generation(), 2);

    Ok(())
}
