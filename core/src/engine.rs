use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Player input on a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Primary button: open a hidden cell, or chord on an opened one.
    Open,
    /// Secondary button: toggle a flag.
    Flag,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// How neighbors of the opened cell get revealed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RevealMode {
    /// The cell was hidden before this action; flood outwards but never onto a mine.
    Fresh,
    /// The cell was already open; if its flags add up, open every unflagged neighbor, mines
    /// included.
    Chord,
}

/// What the engine hands back after every action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub is_win: bool,
    pub is_game_over: bool,
    pub board: Board,
}

#[derive(Clone, Debug)]
pub struct Engine<G = RandomMineGenerator> {
    config: GameConfig,
    board: Board,
    generator: G,
    first_click_pending: bool,
    is_win: bool,
    is_game_over: bool,
    revealed_this_action: Vec<Coord2>,
}

#[cfg(feature = "std")]
impl Engine<RandomMineGenerator> {
    /// Fresh game with mines drawn from OS entropy on the first open.
    pub fn new(config: GameConfig) -> Self {
        Self::with_generator(config, RandomMineGenerator::from_entropy())
    }
}

impl Engine<RandomMineGenerator> {
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_generator(config, RandomMineGenerator::new(seed))
    }

    /// Game whose mines are already placed, so flags work straight away and no open is
    /// protected from mines.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let layout = MineLayout::from_mine_coords(size, mine_coords)?;
        Self::from_layout(&layout, RandomMineGenerator::new(0))
    }
}

impl<G: MineGenerator> Engine<G> {
    pub fn with_generator(config: GameConfig, generator: G) -> Self {
        Self {
            config,
            board: Board::new(config.size()),
            generator,
            first_click_pending: true,
            is_win: false,
            is_game_over: false,
            revealed_this_action: Vec::new(),
        }
    }

    /// Seeds the board from `layout`; `generator` is kept but never consulted.
    pub fn from_layout(layout: &MineLayout, generator: G) -> Result<Self> {
        let config = layout.game_config()?;
        let mut engine = Self::with_generator(config, generator);
        engine.board.apply_layout(layout);
        engine.first_click_pending = false;
        Ok(engine)
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_win(&self) -> bool {
        self.is_win
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn state(&self) -> EngineState {
        match (self.is_game_over, self.is_win) {
            (true, true) => EngineState::Won,
            (true, false) => EngineState::Lost,
            (false, _) if self.first_click_pending => EngineState::Ready,
            (false, _) => EngineState::Active,
        }
    }

    pub fn flags_placed(&self) -> CellCount {
        self.board.flagged_count()
    }

    /// Mines minus flags; negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        (self.config.mines() as isize) - (self.flags_placed() as isize)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            is_win: self.is_win,
            is_game_over: self.is_game_over,
            board: self.board.clone(),
        }
    }

    /// Applies one player action and returns the resulting board.
    ///
    /// Out-of-range coordinates are rejected without touching the game. Once the game is
    /// over every action is ignored and the final snapshot is returned again.
    pub fn act(&mut self, row: Coord, col: Coord, action: Action) -> Result<Snapshot> {
        let coords = self.board.validate_coords((row, col))?;

        if self.is_game_over {
            log::debug!("Ignoring {:?} at {:?}, game is over", action, coords);
            return Ok(self.snapshot());
        }

        log::debug!("{:?} at {:?}", action, coords);
        match action {
            Action::Open => self.open(coords),
            Action::Flag => self.toggle_flag(coords),
        }
        self.revealed_this_action.clear();

        Ok(self.snapshot())
    }

    fn open(&mut self, coords: Coord2) {
        let cell = self.board[coords];
        // a flagged target stays hidden but still chords and still counts as clicked
        let mode = if cell.is_revealed || cell.is_flagged {
            RevealMode::Chord
        } else {
            self.reveal_cell(coords);
            RevealMode::Fresh
        };

        if self.first_click_pending {
            self.place_mines();
        }

        self.reveal_neighbors(coords, mode);
        self.check_game_result(coords);
    }

    fn toggle_flag(&mut self, coords: Coord2) {
        if self.first_click_pending {
            log::trace!("Flag at {:?} ignored before the first open", coords);
            return;
        }

        let cell = self.board.cell_mut(coords);
        if !cell.is_revealed {
            cell.is_flagged = !cell.is_flagged;
        }
    }

    fn reveal_cell(&mut self, coords: Coord2) {
        self.board.cell_mut(coords).is_revealed = true;
        self.revealed_this_action.push(coords);
    }

    fn place_mines(&mut self) {
        let blocked: Vec<Coord2> = self
            .board
            .iter()
            .filter(|(_, cell)| cell.is_revealed)
            .map(|(coords, _)| coords)
            .collect();

        let layout = self.generator.generate(self.config, &blocked);
        self.board.apply_layout(&layout);
        self.first_click_pending = false;
        log::debug!(
            "Board seeded with {} mines, {} cells kept clear",
            layout.mine_count(),
            blocked.len()
        );
    }

    fn reveal_neighbors(&mut self, coords: Coord2, mode: RevealMode) {
        let reveal_mines = match mode {
            RevealMode::Fresh => false,
            RevealMode::Chord => {
                let flagged = self.board.flagged_neighbor_count(coords);
                if self.board[coords].mines_around != Some(flagged) {
                    log::trace!("No chord at {:?}, {} flags around", coords, flagged);
                    return;
                }
                true
            }
        };

        let work_set: BTreeSet<Coord2> = self.board.neighbors(coords).collect();
        self.flood_reveal(work_set, reveal_mines);
    }

    /// Reveals cells from `work_set`, spreading through every cell without adjacent mines.
    ///
    /// The final set of revealed cells does not depend on visiting order.
    fn flood_reveal(&mut self, mut work_set: BTreeSet<Coord2>, reveal_mines: bool) {
        while let Some(coords) = work_set.pop_first() {
            let cell = self.board[coords];
            if (cell.is_mine && !reveal_mines) || cell.is_revealed || cell.is_flagged {
                continue;
            }

            self.reveal_cell(coords);
            log::trace!("Flood revealed {:?}", coords);

            if cell.mines_around == Some(0) {
                work_set.extend(self.board.neighbors(coords));
            }
        }
    }

    fn check_game_result(&mut self, clicked: Coord2) {
        let hit_mine = self.board[clicked].is_mine
            || self
                .revealed_this_action
                .iter()
                .any(|&coords| self.board[coords].is_mine);

        if hit_mine {
            self.end_game(false);
        } else if self.board.unrevealed_count() == self.config.mines() {
            self.end_game(true);
        }
    }

    fn end_game(&mut self, won: bool) {
        self.is_game_over = true;
        self.is_win = won;
        self.board.reveal_all();
        log::info!("Game over: {}", if won { "won" } else { "lost" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pre-seeded engine with `open` already revealed, as if by earlier actions.
    fn engine_with_revealed(size: Coord2, mines: &[Coord2], open: &[Coord2]) -> Engine {
        let mut engine = Engine::from_mine_coords(size, mines).unwrap();
        for &coords in open {
            engine.board.cell_mut(coords).is_revealed = true;
        }
        engine
    }

    /// 3x5 board: a mine in the top-left corner and a wall of mines in column 3, so floods from
    /// the left never reach column 4.
    const WALLED_MINES: [Coord2; 4] = [(0, 0), (0, 3), (1, 3), (2, 3)];

    fn assert_left_side_open(board: &Board) {
        for row in 0..3 {
            for col in 0..3 {
                if (row, col) != (0, 0) {
                    assert!(board[(row, col)].is_revealed, "({row}, {col}) hidden");
                }
            }
            assert!(!board[(row, 3)].is_revealed);
            assert!(!board[(row, 4)].is_revealed);
        }
    }

    struct FixedGenerator {
        mines: Vec<Coord2>,
        seen_blocked: Vec<Coord2>,
    }

    impl MineGenerator for FixedGenerator {
        fn generate(&mut self, config: GameConfig, blocked: &[Coord2]) -> MineLayout {
            self.seen_blocked = blocked.to_vec();
            MineLayout::from_mine_coords(config.size(), &self.mines).unwrap()
        }
    }

    #[test]
    fn first_open_seeds_board_around_clicked_cell() {
        let config = GameConfig::new(3, 5, 4).unwrap();
        let generator = FixedGenerator {
            mines: WALLED_MINES.to_vec(),
            seen_blocked: Vec::new(),
        };
        let mut engine = Engine::with_generator(config, generator);
        assert_eq!(engine.state(), EngineState::Ready);

        let snapshot = engine.act(1, 1, Action::Open).unwrap();

        assert_eq!(engine.generator.seen_blocked, [(1, 1)]);
        assert_eq!(engine.state(), EngineState::Active);
        assert!(!snapshot.is_game_over);
        assert_eq!(snapshot.board[(2, 0)].mines_around, Some(0));
        assert_eq!(snapshot.board[(1, 2)].mines_around, Some(3));
        assert_left_side_open(&snapshot.board);
    }

    #[test]
    fn first_open_with_random_mines_is_safe() {
        for seed in 0..50 {
            let mut engine = Engine::with_seed(Difficulty::Easy.config(), seed);

            let snapshot = engine.act(3, 4, Action::Open).unwrap();

            assert!(!snapshot.board[(3, 4)].is_mine);
            assert!(!(snapshot.is_game_over && !snapshot.is_win));
            assert_eq!(snapshot.board.mine_count(), 10);
        }
    }

    #[test]
    fn opening_mine_loses_and_reveals_everything() {
        let mut engine = Engine::from_mine_coords((3, 3), &[(0, 0)]).unwrap();

        let snapshot = engine.act(0, 0, Action::Open).unwrap();

        assert!(snapshot.is_game_over);
        assert!(!snapshot.is_win);
        assert_eq!(snapshot.board.unrevealed_count(), 0);
        assert_eq!(engine.state(), EngineState::Lost);
    }

    #[test]
    fn revealing_last_safe_cell_wins() {
        let safe: Vec<Coord2> = (0..3)
            .flat_map(|row| (0..3).map(move |col| (row, col)))
            .filter(|&coords| coords != (0, 0))
            .collect();
        let (&last, earlier) = safe.split_last().unwrap();
        let mut engine = engine_with_revealed((3, 3), &[(0, 0)], earlier);
        engine.act(0, 0, Action::Flag).unwrap();

        let snapshot = engine.act(last.0, last.1, Action::Open).unwrap();

        assert!(snapshot.is_win);
        assert!(snapshot.is_game_over);
        assert_eq!(snapshot.board.flagged_count(), 0);
        assert_eq!(snapshot.board.unrevealed_count(), 0);
    }

    #[test]
    fn opening_safe_cells_one_by_one_ends_in_win() {
        let mut engine = Engine::from_mine_coords((3, 3), &[(0, 0)]).unwrap();
        let mut won = false;

        for row in 0..3 {
            for col in 0..3 {
                if (row, col) == (0, 0) {
                    continue;
                }
                let snapshot = engine.act(row, col, Action::Open).unwrap();
                if snapshot.is_game_over {
                    assert!(snapshot.is_win);
                    won = true;
                }
            }
        }

        assert!(won);
        assert_eq!(engine.state(), EngineState::Won);
    }

    #[test]
    fn fresh_open_floods_safe_neighbors_only() {
        let mut engine = Engine::from_mine_coords((3, 5), &WALLED_MINES).unwrap();

        let snapshot = engine.act(1, 1, Action::Open).unwrap();

        assert!(!snapshot.is_game_over);
        assert!(!snapshot.board[(0, 0)].is_revealed);
        assert_left_side_open(&snapshot.board);
    }

    #[test]
    fn chord_with_matching_flags_opens_other_neighbors() {
        let mut engine = engine_with_revealed((3, 5), &WALLED_MINES, &[(1, 1)]);
        engine.act(0, 0, Action::Flag).unwrap();

        let snapshot = engine.act(1, 1, Action::Open).unwrap();

        assert!(!snapshot.is_game_over);
        assert!(snapshot.board[(0, 0)].is_flagged);
        assert!(!snapshot.board[(0, 0)].is_revealed);
        assert_left_side_open(&snapshot.board);
    }

    #[test]
    fn chord_with_wrong_flag_count_does_nothing() {
        let mut engine = engine_with_revealed((3, 5), &WALLED_MINES, &[(1, 1)]);
        let before = engine.snapshot();

        let snapshot = engine.act(1, 1, Action::Open).unwrap();

        assert_eq!(snapshot, before);
    }

    #[test]
    fn chord_on_misplaced_flag_opens_mine_and_loses() {
        let mut engine = engine_with_revealed((3, 5), &WALLED_MINES, &[(1, 1)]);
        engine.act(0, 1, Action::Flag).unwrap();

        let snapshot = engine.act(1, 1, Action::Open).unwrap();

        assert!(snapshot.is_game_over);
        assert!(!snapshot.is_win);
        assert_eq!(snapshot.board.unrevealed_count(), 0);
        assert_eq!(snapshot.board.flagged_count(), 0);
    }

    #[test]
    fn flag_toggles_only_hidden_cells() {
        let mut engine = engine_with_revealed((3, 5), &WALLED_MINES, &[(1, 1)]);

        let flagged = engine.act(0, 4, Action::Flag).unwrap();
        assert!(flagged.board[(0, 4)].is_flagged);
        assert_eq!(engine.flags_placed(), 1);
        assert_eq!(engine.mines_left(), 3);

        let unflagged = engine.act(0, 4, Action::Flag).unwrap();
        assert!(!unflagged.board[(0, 4)].is_flagged);

        let on_revealed = engine.act(1, 1, Action::Flag).unwrap();
        assert!(!on_revealed.board[(1, 1)].is_flagged);
        assert_eq!(engine.flags_placed(), 0);
    }

    #[test]
    fn flag_before_first_open_is_ignored() {
        let mut engine = Engine::with_seed(Difficulty::Easy.config(), 3);

        let snapshot = engine.act(0, 0, Action::Flag).unwrap();

        assert!(!snapshot.board[(0, 0)].is_flagged);
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[test]
    fn opening_flagged_mine_loses() {
        let mut engine = Engine::from_mine_coords((3, 3), &[(0, 0)]).unwrap();
        engine.act(0, 0, Action::Flag).unwrap();

        let snapshot = engine.act(0, 0, Action::Open).unwrap();

        assert!(snapshot.is_game_over);
        assert!(!snapshot.is_win);
        assert_eq!(snapshot.board.flagged_count(), 0);
        assert_eq!(engine.state(), EngineState::Lost);
    }

    #[test]
    fn opening_flagged_safe_cell_chords_around_it() {
        let mut engine = Engine::from_mine_coords((3, 5), &WALLED_MINES).unwrap();
        engine.act(2, 0, Action::Flag).unwrap();

        let snapshot = engine.act(2, 0, Action::Open).unwrap();

        assert!(!snapshot.is_game_over);
        assert!(snapshot.board[(2, 0)].is_flagged);
        assert!(!snapshot.board[(2, 0)].is_revealed);
        for coords in [(1, 0), (1, 1), (1, 2), (2, 1), (2, 2)] {
            assert!(snapshot.board[coords].is_revealed, "{coords:?} hidden");
        }
        assert!(!snapshot.board[(0, 1)].is_revealed);
    }

    #[test]
    fn opening_flagged_cell_without_matching_flags_changes_nothing() {
        let mut engine = Engine::from_mine_coords((3, 5), &WALLED_MINES).unwrap();
        engine.act(1, 1, Action::Flag).unwrap();
        let before = engine.snapshot();

        let snapshot = engine.act(1, 1, Action::Open).unwrap();

        assert_eq!(snapshot, before);
    }

    #[test]
    fn out_of_range_is_rejected_without_side_effects() {
        let mut engine = Engine::with_seed(Difficulty::Easy.config(), 9);

        assert_eq!(
            engine.act(8, 0, Action::Open),
            Err(GameError::OutOfRange { row: 8, col: 0 })
        );
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.board().unrevealed_count(), 64);
    }

    #[test]
    fn actions_after_game_over_are_ignored() {
        let mut engine = Engine::from_mine_coords((3, 3), &[(0, 0)]).unwrap();
        let lost = engine.act(0, 0, Action::Open).unwrap();

        let again = engine.act(2, 2, Action::Open).unwrap();
        let flag = engine.act(1, 1, Action::Flag).unwrap();

        assert_eq!(again, lost);
        assert_eq!(flag, lost);
    }

    #[test]
    fn snapshot_is_detached_from_engine() {
        let mut engine = Engine::from_mine_coords((3, 5), &WALLED_MINES).unwrap();
        let before = engine.snapshot();

        engine.act(2, 0, Action::Open).unwrap();

        assert_eq!(before.board.unrevealed_count(), 15);
        assert!(engine.board().unrevealed_count() < 15);
    }

    #[test]
    fn layout_without_safe_cells_is_rejected() {
        assert!(matches!(
            Engine::from_mine_coords((1, 2), &[(0, 0), (0, 1)]),
            Err(GameError::InvalidConfiguration { .. })
        ));
    }
}
