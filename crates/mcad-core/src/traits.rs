use crate::error::Result;

/// Validate structural integrity of a geometric entity or a settings block.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
