//! Storage interface used by the resource walker.

use crate::codec::EncodedContent;
use crate::error::Result;

use super::surface::{ResourceTable, SurfaceId};

/// Read/replace access to the content of drawing surfaces.
///
/// Implementations stage replacements in memory; persisting them is up to
/// the owner of the store.
pub trait SurfaceStore {
    /// Decoded content stream bytes of a surface.
    fn content(&self, surface: &SurfaceId) -> Result<Vec<u8>>;

    /// Replace a surface's content.
    fn set_content(&mut self, surface: &SurfaceId, content: EncodedContent) -> Result<()>;

    /// XObject resources visible to a surface.
    fn resources(&self, surface: &SurfaceId) -> Result<ResourceTable>;
}

impl<S: SurfaceStore + ?Sized> SurfaceStore for &mut S {
    fn content(&self, surface: &SurfaceId) -> Result<Vec<u8>> {
        (**self).content(surface)
    }

    fn set_content(&mut self, surface: &SurfaceId, content: EncodedContent) -> Result<()> {
        (**self).set_content(surface, content)
    }

    fn resources(&self, surface: &SurfaceId) -> Result<ResourceTable> {
        (**self).resources(surface)
    }
}
