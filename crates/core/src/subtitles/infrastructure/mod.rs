pub mod serializer_factory;
pub mod srt_serializer;
pub mod vtt_serializer;
