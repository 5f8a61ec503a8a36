//! CFIHOS ingestion: sheets → normalized entity and property tables.
//!
//! - `sheet`: tabular rows and the reader seam (JSON files, in-memory)
//! - `columns` / `vocab`: fixed column names and value vocabularies
//! - `sanitize`: storage-safe PascalCase / snake_case names
//! - `loader`: per-source loaders for generic entities, tag classes and equipment classes
//! - `context`: per-loader mapping tables and their explicit, ordered union

pub mod columns;
pub mod config;
pub mod context;
pub mod loader;
pub mod sanitize;
pub mod sheet;
pub mod vocab;

pub use config::{SourceConfig, SourceTypeConfig};
pub use context::{MappingContext, MappingTables};
pub use loader::{build_mapping_tables, duplicates, LoadedTables, SourceLoader};
pub use sanitize::{bound_length, sanitize_name, CaseStyle};
pub use sheet::{JsonSheetReader, MemorySheetReader, Row, Sheet, SheetReader};
