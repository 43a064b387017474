//! Text normalization: header decoding, date parsing, and message-to-record conversion.

pub mod header;
pub mod message;
pub mod normalize;
