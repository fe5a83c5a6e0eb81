//! Public library API for decoding game-client `.cache` files.

/// Stream decoding, shared objects, compressed rows, and cached payloads.
pub mod cache;
