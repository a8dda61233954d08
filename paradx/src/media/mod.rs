//! Media preparation for prompt embedding.
//!
//! Uploaded media is never analysed locally. It is reduced to a bounded base64 text fragment
//! (a *snippet*) that is pasted into a natural-language prompt. See [`encoder::MediaEncoder`].

pub mod encoder;

pub use encoder::{EncodedSnippet, MediaEncoder, MediaKind};
