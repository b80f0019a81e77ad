//! Cross-reference engine: walks every table and event-command list of a
//! project and records each use of a database entity.

pub mod entities;
pub mod index;
pub mod manager;
pub mod opcodes;
pub mod recorder;
pub mod scanner;
pub mod types;
pub mod walker;

pub use index::ReferenceIndex;
pub use manager::{build_index, kind_label, XrefManager};
pub use opcodes::command_name;
pub use recorder::Recorder;
pub use types::*;
