//! draws: draw collections and the Draw Store.
//!
//! - [`collection::DrawCollection`]: retained draws plus per-draw and
//!   run-level metadata, with marginal summaries.
//! - [`store::DrawStore`]: `store` / `retrieve` / `delete` by tag, with an
//!   in-memory and a JSON-directory implementation.
//! - [`prior::draw_prior`]: prior collections in the same shape as
//!   posterior ones.

pub mod collection;
pub mod errors;
pub mod prior;
pub mod store;

pub use self::collection::{DrawCollection, DrawMeta, ParameterSummary, Provenance};
pub use self::errors::{DrawError, DrawResult};
pub use self::prior::draw_prior;
pub use self::store::{DrawStore, JsonDirStore, MemoryDrawStore};
