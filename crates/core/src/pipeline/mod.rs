pub mod fetch_media_use_case;
pub mod generate_subtitles_use_case;
pub mod pipeline_logger;
