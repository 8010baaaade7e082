pub mod convert;
pub mod extract;
pub mod merge_lines;
pub mod patch;
pub mod story;
pub mod validate;
