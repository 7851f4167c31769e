pub mod batch;
pub mod decode;

pub use batch::{AudioBatch, BatchBuilder, Waveform};
pub use decode::decode_waveform;
