//! In-page DOM analyzer
//!
//! Walks a synthetic document/window pair (see `input`), classifies
//! interactive elements, resolves which are actually clickable at their own
//! point in the stacking order, de-duplicates nested/overlapping
//! candidates, and assigns each survivor a stable reading-order index.
//!
//! ## Core design
//!
//! ```text
//! RawDocument (borrowed) -> walker -> WalkArena (owned) -> filter -> highlight -> output
//!                                           |
//!                                      NodeId (u32)
//! ```

pub mod arena;
pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod highlight;
pub mod input;
pub mod output;
pub mod service;
pub mod topmost;
pub mod types;
pub mod walker;

pub use arena::WalkArena;
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, Result};
pub use service::AnalyzerService;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_service_has_default_config() {
        let service = AnalyzerService::new();
        assert!(service.config().do_highlight_elements);
        assert_eq!(service.config().viewport_expansion, 0);
    }
}
