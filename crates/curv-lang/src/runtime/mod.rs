pub mod binop_registry;
pub mod context;
pub mod env;
pub mod interpreter;
pub mod list;
pub mod record;
pub mod value;
