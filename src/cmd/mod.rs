pub mod demo;
pub mod track;
