use super::{Console, Tile};
use crate::core::{Color, ConsoleError};

#[test]
fn new_console_has_parallel_arrays_of_equal_length() {
    let console = Console::new(7, 3);
    assert_eq!(console.len(), 21);
    assert_eq!(console.bg().len(), 21);
    assert_eq!(console.fg().len(), 21);
    assert_eq!(console.bg_bytes().len(), 63);
    assert_eq!(console.fg_bytes().len(), 63);
}

#[test]
fn zero_sized_console_is_empty() {
    let console = Console::new(0, 0);
    assert!(console.is_empty());
    assert!(console.get(0, 0).is_none());
}

#[test]
fn from_parts_rejects_mismatched_lengths() {
    let err = Console::from_parts(2, 2, vec![Color::BLACK; 4], vec![Color::BLACK; 3], vec![0; 4])
        .unwrap_err();
    match err {
        ConsoleError::ShapeMismatch {
            what,
            expected,
            actual,
            ..
        } => {
            assert_eq!(what, "fg");
            assert_eq!(expected, 4);
            assert_eq!(actual, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn set_and_get_are_row_major() {
    let mut console = Console::new(3, 2);
    let tile = Tile {
        glyph: 65,
        fg: Color::WHITE,
        bg: Color::BLACK,
    };
    console.set(2, 1, tile);
    assert_eq!(console.get(2, 1), Some(tile));
    assert_eq!(console.glyphs()[5], 65);
    assert_eq!(&console.bg_bytes()[15..18], &[0, 0, 0]);
}

#[test]
fn out_of_bounds_writes_are_ignored() {
    let mut console = Console::new(2, 2);
    let before = console.clone();
    console.put_char(2, 0, 1);
    console.set_fg(0, 5, Color::WHITE);
    console.set_bg(9, 9, Color::WHITE);
    assert_eq!(console, before);
}

#[test]
fn print_clips_at_right_edge() {
    let mut console = Console::new(4, 1);
    let written = console.print(1, 0, "hello", Color::WHITE, Color::BLACK);
    assert_eq!(written, 3);
    assert_eq!(console.glyphs(), &[Console::BLANK, 'h' as u32, 'e' as u32, 'l' as u32]);
}

#[test]
fn clear_and_resize_reset_content() {
    let mut console = Console::new(2, 2);
    console.clear(b'#' as u32, Color::WHITE, Color::BLACK);
    assert!(console.glyphs().iter().all(|&g| g == b'#' as u32));

    console.resize(3, 1);
    assert_eq!(console.width(), 3);
    assert_eq!(console.height(), 1);
    assert!(console.glyphs().iter().all(|&g| g == Console::BLANK));
}
