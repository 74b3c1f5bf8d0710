//! External service integrations.

pub mod provider_client {
    pub use crate::provider_client::*;
}

pub mod audience_cache {
    pub use crate::audience_cache::*;
}
