//! The seam between the store and whatever produces image bytes.

use std::path::Path;

use crate::error_handling::types::CaptureError;

/// Something that can write a screenshot to a given path.
///
/// The store hands over the full destination path and only cares whether
/// the call succeeded. Format, resolution and content are the capture
/// source's business. A failed capture may leave a partial file behind;
/// cleaning it up is also the capture source's business.
///
/// Closures with the right shape implement this trait, which is what most
/// tests use:
///
/// ```
/// use std::path::Path;
/// use screenshots::data_capture::Capture;
/// use screenshots::error_handling::types::CaptureError;
///
/// let capture = |path: &Path| -> Result<(), CaptureError> {
///     std::fs::write(path, b"\x89PNG")?;
///     Ok(())
/// };
/// # let _ = &capture as &dyn Capture;
/// ```
pub trait Capture {
    fn capture(&self, path: &Path) -> Result<(), CaptureError>;
}

impl<F> Capture for F
where
    F: Fn(&Path) -> Result<(), CaptureError>,
{
    fn capture(&self, path: &Path) -> Result<(), CaptureError> {
        self(path)
    }
}
