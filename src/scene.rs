pub mod doc;
pub mod element;
pub mod shape;
pub mod storage;
pub mod style;
pub mod transform;
