#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Configuration for seedfile copy processes.
//!
//! Layout: `model.rs` (typed documents), `defaults.rs` (default values and
//! bounds), `loader.rs` (file/string parsing and environment overrides),
//! `validate.rs` (validation).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{apply_env_overrides, apply_overrides, from_json_str, load, load_from_path};
pub use model::{CopySettings, FilenameRoots, LogFormatSetting, LoggingSettings, SeedfileConfig};
pub use validate::validate;
