// ============================================================================
// IMAGE PROCESSOR — owns a pixel buffer and runs filter chains over it
// ============================================================================
//
// Name resolution and buffer checks happen before any pixel is touched, so a
// failed call always leaves the working buffer as it was.
// ============================================================================

use super::filters::{Filter, apply_chain};
use super::registry;
use crate::logger::{self, ApplyRecord};
use crate::pixels::PixelBuffer;

/// Error type for filter processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// No decoded image to work on.
    NoImage,
    /// A filter name with no registry entry.
    FilterNotFound(String),
    /// A `name=intensity` reference whose intensity is not an integer.
    InvalidSpec(String),
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::NoImage => write!(f, "No image to process"),
            FilterError::FilterNotFound(name) => write!(f, "Unknown filter: '{}'", name),
            FilterError::InvalidSpec(spec) => {
                write!(f, "Invalid filter '{}' (expected name or name=intensity)", spec)
            }
        }
    }
}

impl std::error::Error for FilterError {}

/// Applies filters to a decoded image.
///
/// Keeps the untouched source next to the working copy so callers can
/// compare against it or start over with [`ImageProcessor::reset`].
#[derive(Clone, Debug, Default)]
pub struct ImageProcessor {
    original: Option<PixelBuffer>,
    image: Option<PixelBuffer>,
    filters: Vec<Filter>,
    string_filters: Vec<String>,
}

impl ImageProcessor {
    pub fn new(image: PixelBuffer) -> Self {
        Self::from_decoded(Some(image))
    }

    /// Processor over the result of an upstream decode.  `None` (decode
    /// failure) gives a processor whose apply calls report
    /// [`FilterError::NoImage`].
    pub fn from_decoded(image: Option<PixelBuffer>) -> Self {
        Self {
            original: image.clone(),
            image,
            filters: Vec::new(),
            string_filters: Vec::new(),
        }
    }

    pub fn add_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    /// Queue a filter by registry name.  The name is checked when
    /// [`ImageProcessor::apply_filters`] runs.
    pub fn add_string_filter(&mut self, name: impl Into<String>) {
        self.string_filters.push(name.into());
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Mutable access to the active chain, e.g. to retune an intensity
    /// before re-applying.
    pub fn filters_mut(&mut self) -> &mut [Filter] {
        &mut self.filters
    }

    pub fn string_filters(&self) -> &[String] {
        &self.string_filters
    }

    /// Resolve queued names onto the active chain, then run the whole chain
    /// over every pixel.
    ///
    /// Queued names are kept after resolution, so every call appends them
    /// to the chain again.
    pub fn apply_filters(&mut self) -> Result<(), FilterError> {
        if self.image.is_none() {
            log_err!("apply_filters: no image loaded");
            return Err(FilterError::NoImage);
        }

        let resolved = self
            .string_filters
            .iter()
            .map(|name| registry::resolve(name))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| {
                log_err!("apply_filters: {}", e);
            })?;
        self.filters.extend(resolved);

        let chain = &self.filters;
        let Some(image) = self.image.as_mut() else {
            return Err(FilterError::NoImage);
        };
        logger::record_apply(&ApplyRecord {
            mode: "chain",
            filters: chain,
            width: image.width(),
            height: image.height(),
        });
        image.map_pixels(|px| apply_chain(chain, px));
        Ok(())
    }

    /// Run one filter over every pixel.  Queued names are ignored.
    pub fn apply_single_filter(&mut self, filter: &Filter) -> Result<(), FilterError> {
        let Some(image) = self.image.as_mut() else {
            log_err!("apply_single_filter: no image loaded");
            return Err(FilterError::NoImage);
        };
        logger::record_apply(&ApplyRecord {
            mode: "single",
            filters: std::slice::from_ref(filter),
            width: image.width(),
            height: image.height(),
        });
        image.map_pixels(|px| filter.apply_own(px));
        Ok(())
    }

    /// Working buffer (filtered so far).
    pub fn image(&self) -> Option<&PixelBuffer> {
        self.image.as_ref()
    }

    /// Source buffer as it was before any filter ran.
    pub fn original(&self) -> Option<&PixelBuffer> {
        self.original.as_ref()
    }

    /// Discard filter results and restore the source pixels.  The chain and
    /// queued names are kept.
    pub fn reset(&mut self) {
        self.image = self.original.clone();
    }

    /// Hand the working buffer to the caller, leaving the processor empty.
    pub fn take_image(&mut self) -> Option<PixelBuffer> {
        self.original = None;
        self.image.take()
    }
}
