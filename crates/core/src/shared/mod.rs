pub mod constants;
pub mod model_resolver;
pub mod text;
pub mod whisper_model;
