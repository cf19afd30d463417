// Fixed-width scalar decoding shared by the codeplug record codecs

pub mod elements;

pub use elements::{read_u24_le, write_u24_le};
