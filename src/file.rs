use std::path::PathBuf;

/// An uploaded file, as supplied by the transport layer.
///
/// The request treats uploads as opaque: [`Request::file`] and
/// [`Request::files`] hand descriptors back exactly as they were given
/// at construction.
///
/// [`Request::file`]: crate::Request::file
/// [`Request::files`]: crate::Request::files
#[derive(Clone, Debug, Default)]
pub struct UploadedFile {
    /// The client-supplied file name.
    pub name: String,

    /// The content type declared for the upload, if any.
    pub content_type: Option<String>,

    /// Where the transport layer spooled the upload.
    pub tmp_path: Option<PathBuf>,

    /// Upload size in bytes.
    pub size: u64,

    /// Transport-specific error code; zero means the upload succeeded.
    pub error: u32,
}
