// Domain-layer modules and shared errors/models
pub mod pipeline {
    pub use crate::pipeline::*;
}

pub mod recipe {
    pub use crate::recipe::*;
}

pub mod quality {
    pub use crate::quality::*;
}

pub mod quality_gate {
    pub use crate::quality_gate::*;
}

pub mod compliance {
    pub use crate::compliance::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
