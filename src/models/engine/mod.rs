pub mod accuracy;
pub mod constants;
pub mod hit_window;
pub mod note;

pub use accuracy::AccuracyModel;
pub use constants::*;
pub use hit_window::HitWindow;
pub use note::{ActiveNote, Beatmap, NoteSpec};
