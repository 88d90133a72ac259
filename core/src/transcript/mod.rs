//! Conversation transcript recording and replay

pub mod entry;
pub mod recorder;

pub use entry::{EntryType, TranscriptEntry};
pub use recorder::{Transcript, TranscriptMetadata, TranscriptRecorder};
