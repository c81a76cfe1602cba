//! # OTM-DE Core
//!
//! Model graph and the collaborator contracts used by the object editor's
//! action managers: validation, change events, status reporting and
//! library refresh tasks.

pub mod events;
pub mod model;
pub mod status;
pub mod tasks;
pub mod validation;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
