pub mod media_downloader;
pub mod media_kind;
