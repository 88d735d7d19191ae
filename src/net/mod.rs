pub mod frame;
pub mod tcp;
pub mod varint;
