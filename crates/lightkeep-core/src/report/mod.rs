pub mod console;
pub mod decompose;
