//! Repository Layer
//!
//! Persistence abstractions and implementations.

mod kv;
mod local_store;
mod remote_store;
mod snapshot;
mod traits;

pub use kv::{FileKv, MemoryKv};
#[cfg(target_arch = "wasm32")]
pub use kv::WebStorageKv;
pub use local_store::LocalStore;
pub use remote_store::RemoteStore;
pub use snapshot::{
    export, export_file_name, parse_import, ExportEnvelope, ExportFile, StoredEnvelope, EXPORT_VERSION,
};
pub use traits::{KeyValueStore, ShortcutStore};
