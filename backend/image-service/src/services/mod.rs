/// Business logic layer for image-service
///
/// - storage: originals and previews on disk
/// - preview: preview rendition generation
/// - upload: batch upload pipeline
/// - listing: paginated listing
/// - download: admission-gated downloads
pub mod download;
pub mod listing;
pub mod preview;
pub mod storage;
pub mod upload;

pub use download::{DownloadGate, DownloadPermit};
pub use listing::ListingService;
pub use preview::{PreviewGenerator, PreviewProcessor};
pub use storage::ImageStore;
pub use upload::{IncomingFile, UploadPipeline};
