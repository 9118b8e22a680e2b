//! Ownership of the one live map surface per mounted view.
//!
//! Async work captures a [`MountToken`] when it starts and goes through
//! [`SurfaceSlot::with_live`] when it finishes. If the surface was torn
//! down or replaced in between, the result is dropped.

use crate::{MapSurface, SurfaceOptions};

/// Identifies one mount of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountToken(u64);

#[derive(Debug, Default)]
pub struct SurfaceSlot {
    surface: Option<MapSurface>,
    generation: u64,
}

impl SurfaceSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            surface: None,
            generation: 0,
        }
    }

    /// Creates a new surface, tearing down the current one first.
    pub fn mount(&mut self, options: SurfaceOptions) -> MountToken {
        self.unmount();
        self.generation += 1;
        self.surface = Some(MapSurface::new(options));
        log::debug!("Mounted surface generation {}", self.generation);
        MountToken(self.generation)
    }

    /// Tears down and releases the current surface, if any.
    pub fn unmount(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.teardown();
            log::debug!("Unmounted surface generation {}", self.generation);
        }
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Token of the live surface, if one is mounted.
    #[must_use]
    pub fn current_token(&self) -> Option<MountToken> {
        self.surface.as_ref().map(|_| MountToken(self.generation))
    }

    #[must_use]
    pub fn is_live(&self, token: MountToken) -> bool {
        token.0 == self.generation && self.surface.as_ref().is_some_and(MapSurface::is_alive)
    }

    #[must_use]
    pub const fn surface(&self) -> Option<&MapSurface> {
        self.surface.as_ref()
    }

    pub const fn surface_mut(&mut self) -> Option<&mut MapSurface> {
        self.surface.as_mut()
    }

    /// Runs `f` on the surface only if `token` still names the live
    /// mount. Stale callers get `None`.
    pub fn with_live<R>(&mut self, token: MountToken, f: impl FnOnce(&mut MapSurface) -> R) -> Option<R> {
        if !self.is_live(token) {
            log::debug!(
                "Discarding late result for surface generation {} (current {})",
                token.0,
                self.generation
            );
            return None;
        }
        self.surface.as_mut().map(f)
    }
}

impl Drop for SurfaceSlot {
    fn drop(&mut self) {
        self.unmount();
    }
}
