pub mod base;
pub mod timedtext;
