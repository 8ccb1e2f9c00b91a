pub mod market;
pub mod storage;
