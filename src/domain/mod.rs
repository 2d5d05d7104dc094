pub mod entities;
pub mod object_key;
pub mod use_cases;
