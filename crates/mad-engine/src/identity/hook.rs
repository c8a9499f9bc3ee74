//! Post-load hook seam.

use mad_core::errors::IdentityError;

use super::TrackedFile;
use crate::context::Context;

/// Runs after a file's identity is loaded or created. Hooks typically
/// apply ambient metadata through [`TrackedFile::update`].
pub trait LoadHook: Send + Sync {
    fn on_load(&self, ctx: &Context, file: &mut TrackedFile<'_>) -> Result<(), IdentityError>;
}
