//! Domain types.
//!
//! These are validated domain objects, separate from database row types.

pub mod letter;
pub mod payment;
pub mod settings;

pub use letter::{
    BackgroundStyle, Letter, LetterType, background_style, background_styles, letter_types,
};
pub use payment::PaidLetter;
pub use settings::{LetterSettings, VisualEffect};
