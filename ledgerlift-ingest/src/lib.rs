//! ledgerlift-ingest: grid-based transaction table extraction for word-positioned statements.

pub mod cells;
pub mod classify;
pub mod dispatcher;
pub mod engine;
pub mod grid;
pub mod limits;
pub mod migrate;
pub mod profile;
pub mod reference;
pub mod rows;
pub mod session;
pub mod stitch;
pub mod vocabulary;

pub use classify::{classify_document, is_unstructured};
pub use dispatcher::Dispatcher;
pub use engine::{EngineOutput, GridEngine};
pub use grid::{build_master_grid, MasterGrid};
pub use profile::{LayoutProfile, MaskedCardLayout, ReferenceColumnLayout};
pub use session::{SessionPolicy, SessionState};
