//! Persistence for ingested media.
//!
//! Two stores with strictly separated ownership:
//!
//! - [`MediaStore`]: the filesystem area holding raw and derived media
//! - [`AudioCatalog`]: the SQLite index of saved voice messages
//!
//! # Storage Layout
//!
//! ```text
//! <data-dir>/
//! ├── audio_messages.db                 # catalog of saved voice messages
//! ├── audio_ogg/audio_<sender>_<id>.ogg # originals as received
//! ├── audio_wav/audio_<sender>_<id>.wav # derived 16 kHz renditions
//! └── photo/face_<sender>_<id>.jpg      # photos that passed face detection
//! ```

pub mod catalog;
pub mod media;

pub use catalog::{AudioCatalog, CatalogError};
pub use media::{MediaCategory, MediaStore, ProvisionalPhoto};
