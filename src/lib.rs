pub mod config;
pub mod payload;
pub mod run;
pub mod submit;
pub mod table;
