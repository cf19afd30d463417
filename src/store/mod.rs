// Random-access byte store abstraction over the underlying codeplug file

pub mod byte_store;

pub use byte_store::ByteStore;
