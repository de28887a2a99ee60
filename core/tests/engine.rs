use std::cell::RefCell;
use std::rc::Rc;

use tile_merge_core::{
    moves, Direction, Game, GameConfig, GameObserver, Grid, Status, UpdateInfo,
};

#[derive(Default)]
struct Counters {
    updates: u32,
    undos: u32,
    wins: u32,
    game_overs: Vec<u64>,
    rejected: u32,
}

struct Counting(Rc<RefCell<Counters>>);

impl GameObserver for Counting {
    fn on_update(&mut self, _grid: &Grid, _score: u64, info: UpdateInfo) {
        let mut c = self.0.borrow_mut();
        c.updates += 1;
        if info.is_undo {
            c.undos += 1;
        }
    }
    fn on_win(&mut self) {
        self.0.borrow_mut().wins += 1;
    }
    fn on_game_over(&mut self, final_score: u64) {
        self.0.borrow_mut().game_overs.push(final_score);
    }
    fn on_rejected(&mut self, _direction: Direction) {
        self.0.borrow_mut().rejected += 1;
    }
}

fn observed(game: &mut Game) -> Rc<RefCell<Counters>> {
    let counters = Rc::new(RefCell::new(Counters::default()));
    game.subscribe(Box::new(Counting(counters.clone())));
    counters
}

/// Pick the first direction that moves, cycling through all four.
fn any_legal(game: &Game) -> Option<Direction> {
    let legal = game.legal_moves();
    Direction::ALL.into_iter().zip(legal).find(|(_, ok)| *ok).map(|(d, _)| d)
}

#[test]
fn initialize_produces_two_small_tiles() {
    for seed in 0..50 {
        let mut game = Game::new(GameConfig::seeded(seed)).unwrap();
        game.initialize(4, 2048).unwrap();
        let grid = game.grid();
        assert_eq!(grid.size(), 4);
        assert_eq!(grid.tile_count(), 2);
        assert!(grid.cells().iter().all(|&v| v == 0 || v == 2 || v == 4));
        assert_eq!(game.score(), 0);
        assert_eq!(game.status(), Status::Ongoing);
    }
}

#[test]
fn random_play_upholds_move_properties() {
    let mut game = Game::new(GameConfig::seeded(2024)).unwrap();
    let counters = observed(&mut game);

    let mut steps = 0;
    while let Some(direction) = any_legal(&game) {
        let before = game.grid().clone();
        let score_before = game.score();
        let expected = moves::resolve(&before, direction);

        let result = game.step(direction);
        assert!(result.moved);

        // Score grows by exactly the merged values.
        assert_eq!(result.reward, expected.reward);
        assert_eq!(game.score(), score_before + expected.reward);

        // Exactly one tile is spawned on top of the resolved grid.
        assert_eq!(game.grid().tile_count(), expected.grid.tile_count() + 1);
        let differing = game
            .grid()
            .cells()
            .iter()
            .zip(expected.grid.cells())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(differing, 1);

        // Every tile stays a power of two.
        assert!(game
            .grid()
            .cells()
            .iter()
            .all(|&v| v == 0 || (v >= 2 && v.is_power_of_two())));

        steps += 1;
        if steps > 5_000 {
            break;
        }
    }

    assert!(game.is_lost());
    assert_eq!(counters.borrow().game_overs, vec![game.score()]);
}

#[test]
fn rejected_moves_change_nothing() {
    let grid = Grid::from_rows(&[
        &[2, 4, 8, 16],
        &[0, 0, 0, 0],
        &[0, 0, 0, 0],
        &[0, 0, 0, 0],
    ])
    .unwrap();
    let mut game = Game::from_grid(GameConfig::seeded(1), grid.clone(), 40).unwrap();
    let counters = observed(&mut game);

    for direction in [Direction::Up, Direction::Left, Direction::Right] {
        assert!(!game.slide(direction));
        assert_eq!(game.grid(), &grid);
        assert_eq!(game.score(), 40);
        assert!(!game.can_undo());
    }
    let c = counters.borrow();
    assert_eq!(c.rejected, 3);
    assert_eq!(c.updates, 0);
}

#[test]
fn undo_round_trip_restores_exact_state() {
    let mut game = Game::new(GameConfig::seeded(77)).unwrap();
    let counters = observed(&mut game);

    for _ in 0..20 {
        let Some(direction) = any_legal(&game) else {
            break;
        };
        let before = game.grid().clone();
        let score_before = game.score();

        assert!(game.slide(direction));
        assert!(game.undo());
        assert_eq!(game.grid(), &before);
        assert_eq!(game.score(), score_before);

        // Move on so the next round starts from a new position.
        game.slide(direction);
    }
    assert!(counters.borrow().undos > 0);
}

#[test]
fn deeper_history_undoes_several_moves() {
    let config = GameConfig {
        undo_depth: 3,
        ..GameConfig::seeded(11)
    };
    let mut game = Game::new(config).unwrap();
    let start = game.grid().clone();
    let mut positions = vec![start];

    for _ in 0..4 {
        let direction = any_legal(&game).unwrap();
        assert!(game.slide(direction));
        positions.push(game.grid().clone());
    }
    assert_eq!(game.undo_available(), 3);

    // Positions 3, 2, 1 are recoverable; position 0 fell out of the buffer.
    for expected in positions[1..4].iter().rev() {
        assert!(game.undo());
        assert_eq!(game.grid(), expected);
    }
    assert!(!game.undo());
}

#[test]
fn disabled_history_never_undoes() {
    let config = GameConfig {
        undo_depth: 0,
        ..GameConfig::seeded(5)
    };
    let mut game = Game::new(config).unwrap();
    let direction = any_legal(&game).unwrap();
    assert!(game.slide(direction));
    assert!(!game.can_undo());
    assert!(!game.undo());
}

#[test]
fn lost_position_is_reported_and_frozen() {
    let grid = Grid::from_rows(&[&[2, 4, 2], &[4, 2, 4], &[2, 4, 2]]).unwrap();
    let config = GameConfig {
        size: 3,
        ..GameConfig::seeded(0)
    };
    let mut game = Game::from_grid(config, grid.clone(), 100).unwrap();
    assert_eq!(game.status(), Status::Lost);
    assert_eq!(game.legal_moves(), [false; 4]);
    for direction in Direction::ALL {
        assert!(!game.slide(direction));
    }
    assert_eq!(game.grid(), &grid);

    // Nothing to undo into; re-initializing starts over.
    assert!(!game.undo());
    game.reset();
    assert_eq!(game.status(), Status::Ongoing);
    assert_eq!(game.score(), 0);
}

#[test]
fn win_is_sticky_across_merges() {
    let grid = Grid::from_rows(&[
        &[1024, 1024, 0, 0],
        &[0, 0, 0, 0],
        &[0, 0, 0, 0],
        &[0, 0, 0, 0],
    ])
    .unwrap();
    let mut game = Game::from_grid(GameConfig::seeded(8), grid, 0).unwrap();
    let counters = observed(&mut game);

    assert!(game.slide(Direction::Left));
    assert!(game.is_won());
    assert_eq!(game.score(), 2048);

    for _ in 0..10 {
        match any_legal(&game) {
            Some(direction) => {
                game.slide(direction);
            }
            None => break,
        }
        assert!(game.is_won());
    }
    assert_eq!(counters.borrow().wins, 1);
}

#[test]
fn same_seed_same_game() {
    let mut a = Game::new(GameConfig::seeded(31337)).unwrap();
    let mut b = Game::new(GameConfig::seeded(31337)).unwrap();
    for _ in 0..50 {
        let Some(direction) = any_legal(&a) else {
            break;
        };
        a.step(direction);
        b.step(direction);
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.score(), b.score());
    }
}

#[test]
fn larger_grids_play() {
    let mut game = Game::new(GameConfig {
        size: 6,
        ..GameConfig::seeded(3)
    })
    .unwrap();
    for _ in 0..100 {
        let Some(direction) = any_legal(&game) else {
            break;
        };
        assert!(game.slide(direction));
    }
    assert_eq!(game.grid().size(), 6);
    assert!(game.score() > 0);
}
