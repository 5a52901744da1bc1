pub mod audio;
pub mod keys;
pub mod tts;
