pub mod cue_normalizer;
pub mod cue_text;
pub mod line_formatter;
pub mod segment;
pub mod subtitle_format;
pub mod subtitle_serializer;
pub mod timestamp;
