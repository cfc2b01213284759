//! Media lifecycle: key scheme, data-URL decoding, promotion and the
//! authenticated upload pipeline.

mod data_url;
pub mod keys;
mod promote;
mod upload;

pub use data_url::{data_url_to_bytes, DecodedDataUrl};
pub use promote::{find_and_promote_unregistered_media, PromotedMedia};
pub use upload::{process_upload, UploadRequest};

/// The single accepted image content type
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Maximum accepted image size: 512 KiB
pub const MAX_IMAGE_SIZE: usize = 1024 * 512;

/// The two independent media slots a name can carry.
///
/// Each slot owns its own bucket namespace; key and policy logic is
/// identical across slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    Avatar,
    Header,
}

impl MediaSlot {
    /// Slot string as bound into upload signatures
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSlot::Avatar => "avatar",
            MediaSlot::Header => "header",
        }
    }
}
