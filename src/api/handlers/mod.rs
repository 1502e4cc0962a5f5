pub mod images;
pub mod records;
pub mod root;
