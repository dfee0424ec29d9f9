pub mod helpers;
pub mod tokens;
pub mod usuario;
