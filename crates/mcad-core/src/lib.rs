pub mod error;
pub mod id;
pub mod settings;
pub mod traits;

pub use error::{McadError, Result};
pub use id::EntityId;
pub use settings::{TraceSettings, DEFAULT_TRIM_RESOLUTION};
pub use traits::Validate;
