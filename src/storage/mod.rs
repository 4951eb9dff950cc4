//! File system storage management
//!
//! Path sanitization and resolution against a root directory, the directory
//! and file primitives built on it, and the listing entries they return.

pub mod entry;
pub mod filesystem;
pub mod operations;
pub mod results;
pub mod sanitize;
pub mod validation;

pub use entry::{Entry, EntryType, RESERVED_ENTRY_NAME};
pub use filesystem::{open_file, save_file};
pub use operations::{create_folder, delete_path, list_directory, move_path};
pub use results::{CreateOutcome, DeleteOutcome, Download, MoveOutcome};
pub use sanitize::sanitize_name;
pub use validation::{resolve_path, validate_move};
