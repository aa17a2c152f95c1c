pub(crate) mod cache;
pub(crate) mod package;
pub(crate) mod roles;
pub(crate) mod session;
pub(crate) mod trigger;
pub(crate) mod upload;

pub use cache::{PNG_MIME, RenderedAsset, RenderedAssetCache, file_name_for, parse_file_name};
pub use package::{FrameMetadataEntry, PackagePart, UploadPackage, build_package};
pub use roles::{FrameRole, RoleRule};
pub use session::{ExportOutcome, ExportSession, SweepReport};
pub use trigger::{HttpJobTrigger, JobTrigger};
pub use upload::{HttpUploader, UploadAck, Uploader};
