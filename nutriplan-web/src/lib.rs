#![forbid(unsafe_code)]
//! Browser collaborators for the weekly meal planner: the embedded menu
//! catalog, `localStorage` persistence, clipboard and share-link plumbing, and
//! the `WebPlanner` object the page script drives.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub mod bindings;
pub mod catalog;
pub mod controller;
pub mod dom;
pub mod notices;
pub mod shared;
pub mod storage;

pub use catalog::{EmbeddedCatalog, EmbeddedCatalogError, load_embedded_catalog};
pub use controller::{DispatchResult, dispatch};
pub use storage::{LocalStorageBackend, WebStorageError};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    log::debug!("nutriplan-web loaded");
}
