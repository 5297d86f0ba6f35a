pub mod auth_handlers;
pub mod note_handlers;

pub use auth_handlers::{login, register, verify_otp};
pub use note_handlers::{create_note, delete_note, get_note, list_notes, toggle_pin, update_note};
