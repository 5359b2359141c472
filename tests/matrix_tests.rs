use tetris_engine::core::pieces::{get_shape, spawn_position};
use tetris_engine::core::{Matrix, MatrixSnapshot, Tetrimino};
use tetris_engine::types::{Facing, PieceKind, MATRIX_HEIGHT, PLAYFIELD_WIDTH};

#[test]
fn every_kind_and_facing_fits_at_spawn_on_an_empty_matrix() {
    let matrix = Matrix::new();
    for kind in PieceKind::ALL {
        let (x, y) = spawn_position(kind);
        for facing in Facing::ALL {
            assert!(
                matrix.can_place(kind, facing, x, y),
                "{:?} {:?} does not fit at ({}, {})",
                kind,
                facing,
                x,
                y
            );
        }
    }
}

#[test]
fn shapes_have_four_distinct_cells_inside_the_box() {
    for kind in PieceKind::ALL {
        for facing in Facing::ALL {
            let shape = get_shape(kind, facing);
            for (i, a) in shape.iter().enumerate() {
                assert!((0..4).contains(&a.0) && (0..4).contains(&a.1));
                assert!(shape[i + 1..].iter().all(|b| b != a));
            }
        }
    }
}

#[test]
fn clearing_one_row_shifts_only_the_rows_above() {
    let mut matrix = Matrix::from_rows(&[
        "...S......",
        "..TT......",
        "##########",
        "J........L",
        "ZZ......OO",
    ]);
    let before_row_0 = matrix.row_text(0);
    let before_row_1 = matrix.row_text(1);

    let cleared = matrix.clear_full_lines();
    assert_eq!(cleared.as_slice(), &[2]);

    assert_eq!(matrix.row_text(0), before_row_0);
    assert_eq!(matrix.row_text(1), before_row_1);
    assert_eq!(matrix.row_text(2), "..TT......");
    assert_eq!(matrix.row_text(3), "...S......");
    assert!(matrix.is_row_empty(4));
}

#[test]
fn clearing_separated_rows_compacts_the_rest() {
    let mut matrix = Matrix::from_rows(&[
        "##########",
        "T.........",
        "##########",
        ".........Z",
    ]);
    let cleared = matrix.clear_full_lines();
    assert_eq!(cleared.len(), 2);
    assert_eq!(matrix.row_text(0), ".........Z");
    assert_eq!(matrix.row_text(1), "T.........");
    assert_eq!(matrix.filled_count(), 2);
}

#[test]
fn walls_and_floor_are_solid_and_the_sky_is_open() {
    let matrix = Matrix::new();
    assert!(matrix.is_occupied(-1, 5));
    assert!(matrix.is_occupied(PLAYFIELD_WIDTH as i8, 5));
    assert!(matrix.is_occupied(4, -1));
    assert!(!matrix.is_occupied(4, MATRIX_HEIGHT as i8));
}

#[test]
fn matrix_snapshots_are_stable_without_mutation() {
    let matrix = Matrix::from_rows(&["..OO......", "..OO..IIII"]);
    let piece = Tetrimino::spawn(PieceKind::T);
    let first = MatrixSnapshot::new(&matrix, Some(&piece));
    let second = MatrixSnapshot::new(&matrix, Some(&piece));
    assert_eq!(first, second);
    assert_eq!(first.conflicts(), 0);
    assert_eq!(first.cells().len(), PLAYFIELD_WIDTH as usize * MATRIX_HEIGHT as usize);
}

#[test]
fn overlap_is_reported_and_foreground_wins() {
    let mut matrix = Matrix::new();
    let piece = Tetrimino::spawn(PieceKind::I);
    let (x, y) = piece.cells()[0];
    matrix.set(x, y, Some(PieceKind::Z));

    let view = MatrixSnapshot::new(&matrix, Some(&piece));
    assert_eq!(view.conflicts(), 1);
    let cell = view.cell(x as u8, y as u8).unwrap();
    assert!(cell.is_conflicting());
    assert_eq!(cell.resolve(), PieceKind::I.color());
}
