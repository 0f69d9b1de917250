//! Game records built the way the protocol builds them.

use tessera_core::{Game, GameError, is_checkmate, notation};

#[test]
fn scholars_mate_game() {
    let mut game = Game::starting_position();
    let start = game.board().clone();
    for text in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"] {
        game.play_uci(text).unwrap();
    }
    assert!(is_checkmate(game.board()));
    assert_eq!(
        notation::natural_line(&start, game.moves()),
        "e4 e5 Bc4 Nc6 Qh5 Nf6 Qxf7#"
    );
    assert_eq!(
        notation::terse_line(&start, game.moves()).join(" "),
        "e2e4 e7e5 f1c4 b8c6 d1h5 g8f6 h5f7"
    );
}

#[test]
fn knight_shuffle_reaches_threefold() {
    let mut game = Game::starting_position();
    for _ in 0..2 {
        for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            game.play_uci(text).unwrap();
        }
    }
    assert_eq!(game.repetition_count(), 3);
    assert_eq!(game.history().len(), 9);
}

#[test]
fn continuation_extends_the_record() {
    let mut earlier = Game::starting_position();
    earlier.play_uci("d2d4").unwrap();
    let mut later = earlier.clone();
    later.play_uci("d7d5").unwrap();
    assert!(later.extends(&earlier));
    assert!(!earlier.extends(&later));

    let mut other = Game::starting_position();
    other.play_uci("e2e4").unwrap();
    other.play_uci("d7d5").unwrap();
    assert!(!other.extends(&earlier));
}

#[test]
fn move_after_mate_is_rejected() {
    let mut game =
        Game::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
    assert!(matches!(
        game.play_uci("e2e4"),
        Err(GameError::IllegalMove { .. })
    ));
    assert!(game.moves().is_empty());
}
