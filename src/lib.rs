pub mod cli;
pub mod data;
pub mod error;
pub mod filter;
pub mod ui;
pub mod writer;
pub mod xref;

pub use cli::{Cli, Commands};
pub use error::XrefError;
pub use ui::{Phase, SilentUi, Ui, UiApp};
pub use xref::{EntityType, ReferenceRecord, XrefManager};
