pub mod yt_dlp_downloader;
