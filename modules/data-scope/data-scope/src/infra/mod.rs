//! Infrastructure: in-process stores and SeaORM persistence.

pub mod memory;
pub mod storage;
