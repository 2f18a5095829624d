pub mod meal;
pub mod profile;
pub mod session;

pub use meal::{FoodEntry, Meal};
pub use profile::Profile;
pub use session::{ExerciseSet, Session, SessionExercise};
