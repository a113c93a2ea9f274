pub mod logging;
pub mod text;

pub use text::{decode_unicode_escapes, truncate_text};
