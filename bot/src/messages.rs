//! Reply copy.

use rand::seq::IndexedRandom;

/// Lines the bot picks from before announcing its move.
pub const ACKNOWLEDGEMENTS: &[&str] = &[
    "That's no trouble for me.",
    "Easy.",
    "Inspiration strikes!",
    "You're pretty good~",
    "Now that's an unexpected move!",
    "I can feel my fighting spirit rising.",
    "Let me grab some water first!",
    "The pressure is on >_<",
    "Are you going easy on me?",
    "My head hurts!",
    "So this is what a master feels like?",
];

pub const CHECK: &str = "Check!";
pub const PLAYER_WON: &str = "\nCongratulations, you won!\n";
pub const PLAYER_LOST: &str = "\n\nGame over, you lost.";
pub const SURRENDERED: &str = "Game over, you lost.";
pub const SURRENDER_FORBIDDEN: &str =
    "Only the player who started the game or an administrator can end it.";
pub const NOTHING_TO_UNDO: &str = "There is nothing left to take back.";
pub const UNDO_DONE: &str = "Fine, you may take that move back.";
pub const GAME_OVER: &str = "This game has already finished.";
pub const ENGINE_FAILED: &str =
    "I lost my train of thought, so your last move was taken back. Please play it again.";
pub const INTERNAL_ERROR: &str = "Something went wrong on my side. Please try again.";

pub fn acknowledgement() -> &'static str {
    ACKNOWLEDGEMENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(ACKNOWLEDGEMENTS[0])
}

pub fn engine_move(notation: &str) -> String {
    format!("My next move: {}", notation)
}

pub fn menu(prefix: &str) -> String {
    format!(
        "Commands:\n\
         {prefix}start\n    Start a game\n\
         {prefix}move <from><to>\n    Play a move, files a-i and ranks 0-9\n    Example: {prefix}move h2e2\n\
         {prefix}undo\n    Take back your last move and my reply\n\
         {prefix}surrender\n    Resign. The game creator or an administrator can end it\n\
         {prefix}menu\n    Show this menu"
    )
}

pub fn not_understood(prefix: &str) -> String {
    format!("Sorry, I didn't catch that.\n{}", menu(prefix))
}

pub fn already_started(prefix: &str) -> String {
    format!(
        "A game is already running here, please wait for the next one. \
         You can also end it early with `{prefix}surrender`."
    )
}

pub fn not_started(prefix: &str) -> String {
    format!("No game is running. Use `{prefix}start` to begin one.")
}

pub fn notation_hint(prefix: &str) -> String {
    format!("Please use correct move notation, for example {prefix}move h2e2")
}

pub fn illegal_move(prefix: &str) -> String {
    format!("That move is not legal, please try again with `{prefix}move`.")
}

pub fn honor_granted(role_name: &str) -> String {
    format!("\n\n👑 Congratulations on earning the role 【{}】", role_name)
}
