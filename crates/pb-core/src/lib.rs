//! pastebin/crates/pb-core/src/lib.rs
//!
//! The paste lifecycle rules and the interfaces plugins implement.

pub mod clock;
pub mod error;
pub mod ids;
pub mod lifecycle;
pub mod models;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use clock::*;
pub use error::*;
pub use ids::*;
pub use lifecycle::*;
pub use models::*;
pub use traits::*;
