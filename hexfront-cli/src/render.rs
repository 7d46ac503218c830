//! ASCII board rendering
//!
//! Each offset row takes two text lines: even columns on the first, odd
//! columns (shifted half a cell down) on the second.
//!
//! Cell tokens: `P3`/`C5` unit with strength, `.` neutral plain, `p`/`c`
//! owned plain, `~` river, `^` mountain; a trailing `*` marks a base.

use hexfront_core::{Board, Cell, Extent, Side, Terrain};

const CELL_WIDTH: usize = 3;

pub fn render_board(board: &Board) -> String {
    let extent = board.extent();
    let mut out = String::new();

    out.push_str("    ");
    for col in 0..extent.width {
        out.push_str(&format!("{:<width$}", col, width = CELL_WIDTH));
    }
    out.push('\n');

    for row in 0..extent.height as i32 {
        for parity in [0, 1] {
            let mut line = if parity == 0 {
                format!("{:>3} ", row)
            } else {
                "    ".to_string()
            };
            for col in 0..extent.width as i32 {
                if col % 2 == parity {
                    let token = board
                        .cell(Extent::from_offset(col, row))
                        .map(|cell| cell_token(board, cell))
                        .unwrap_or_default();
                    line.push_str(&format!("{:<width$}", token, width = CELL_WIDTH));
                } else {
                    line.push_str(&" ".repeat(CELL_WIDTH));
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }

    out
}

fn cell_token(board: &Board, cell: &Cell) -> String {
    if let Some(unit) = cell.occupant {
        let strength = if unit.strength > 9 {
            '+'
        } else {
            char::from_digit(unit.strength, 10).unwrap_or('?')
        };
        return format!("{}{}", side_char(unit.side).to_ascii_uppercase(), strength);
    }

    let glyph = match (cell.terrain, cell.owner) {
        (Terrain::River, _) => '~',
        (Terrain::Mountain, _) => '^',
        (Terrain::Plain, Some(side)) => side_char(side),
        (Terrain::Plain, None) => '.',
    };
    if board.is_base(cell.hex) {
        format!("{}*", glyph)
    } else {
        glyph.to_string()
    }
}

fn side_char(side: Side) -> char {
    match side {
        Side::Player => 'p',
        Side::Cpu => 'c',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexfront_core::Hex;

    fn open_board() -> Board {
        let extent = Extent::new(4, 3);
        let (player, cpu) = extent.opposite_corners();
        Board::new(extent, player, cpu).unwrap()
    }

    #[test]
    fn test_two_lines_per_row_plus_header() {
        let text = render_board(&open_board());
        assert_eq!(text.lines().count(), 1 + 3 * 2);
    }

    #[test]
    fn test_tokens() {
        let mut board = open_board();
        board.place_unit(Side::Player, Hex::new(1, 0), 4).unwrap();
        let text = render_board(&board);
        assert!(text.contains("P4"));
        assert!(text.contains("p*"));
        assert!(text.contains("c*"));
        assert!(text.contains('.'));
    }
}
