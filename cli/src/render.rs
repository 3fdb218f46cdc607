use minegrid_core::{Board, CellDisplay, Snapshot};

pub fn glyph(display: CellDisplay) -> char {
    match display {
        CellDisplay::Hidden => '.',
        CellDisplay::Flagged => 'F',
        CellDisplay::Mine => '*',
        CellDisplay::Empty => ' ',
        CellDisplay::Number(count) => char::from_digit(count.into(), 10).unwrap_or('?'),
    }
}

/// Grid with column numbers on top and row numbers down the left.
pub fn render_board(board: &Board) -> String {
    let mut out = String::from("    ");
    for col in 0..board.cols() {
        out.push_str(&format!("{:>3}", col));
    }
    out.push('\n');

    for row in 0..board.rows() {
        out.push_str(&format!("{:>3} ", row));
        for cell in board.row(row) {
            out.push_str(&format!("{:>3}", glyph(cell.display())));
        }
        out.push('\n');
    }
    out
}

pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = render_board(&snapshot.board);
    if snapshot.is_game_over {
        out.push_str(if snapshot.is_win {
            "You win!\n"
        } else {
            "You lose!\n"
        });
    }
    out
}
