//! Context lifetime for one pairing.
//!
//! At most one context is live at any time. In single-binary mode an
//! accelerated context acquired for compression is handed over to the
//! decompress stage instead of being reloaded; in every other case the live
//! context is released before the next one is opened.

use tracing::{debug, warn};

use crate::codec::{CodecContext, Runtime};
use crate::config::Acquisition;
use crate::error::Result;
use crate::flow::{Role, Variant};

pub struct Session<'a> {
    runtime: &'a dyn Runtime,
    acquisition: &'a Acquisition,
    live: Option<Box<dyn CodecContext>>,
}

impl<'a> Session<'a> {
    pub fn new(runtime: &'a dyn Runtime, acquisition: &'a Acquisition) -> Self {
        Self {
            runtime,
            acquisition,
            live: None,
        }
    }

    /// Context for `role` running `variant`, reusing the live one when the
    /// acquisition strategy allows it.
    pub fn acquire(&mut self, role: Role, variant: Variant) -> Result<&dyn CodecContext> {
        let acquisition = self.acquisition;
        let binding = acquisition.binding_for(role);
        let reusable = match &self.live {
            Some(ctx) => {
                acquisition.is_shared()
                    && variant == Variant::Accelerated
                    && ctx.variant() == Variant::Accelerated
                    && ctx.binding() == Some(binding)
            }
            None => false,
        };

        let ctx = match self.live.take() {
            Some(ctx) if reusable => {
                debug!(%role, %binding, "reusing shared context");
                ctx
            }
            previous => {
                if let Some(old) = previous {
                    old.release()?;
                }
                debug!(%role, %variant, %binding, "opening context");
                self.runtime.open(variant, binding)?
            }
        };
        Ok(&**self.live.insert(ctx))
    }

    /// Release the live context, if any.
    pub fn release(&mut self) -> Result<()> {
        match self.live.take() {
            Some(ctx) => ctx.release(),
            None => Ok(()),
        }
    }

    pub fn finish(mut self) -> Result<()> {
        self.release()
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Some(ctx) = self.live.take() {
            if let Err(e) = ctx.release() {
                warn!("releasing context after abort failed: {e}");
            }
        }
    }
}
