pub mod billing;
pub mod entities;
pub mod repositories;
pub mod value_objects;
