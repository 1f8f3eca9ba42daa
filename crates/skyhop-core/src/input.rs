use serde::{Deserialize, Serialize};

/// Abstracted player input for one host frame.
///
/// `move_left` and `move_right` are held states; `jump` is an edge and is
/// consumed once when the intents are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Intents {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
}

impl Intents {
    /// Net horizontal direction: -1, 0 or +1. Both held cancel out.
    pub fn move_dir(&self) -> i8 {
        i8::from(self.move_right) - i8::from(self.move_left)
    }
}
