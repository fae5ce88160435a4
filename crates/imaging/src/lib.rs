pub mod data_url;
pub mod transcode;

pub use data_url::{encode_data_url, parse_data_url, sniff_mime};
pub use transcode::{
    target_size, transcode, transcode_source, ImageSource, TranscodeOptions, Unsharp,
};
