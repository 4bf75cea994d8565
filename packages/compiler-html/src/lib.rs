mod compiler;
mod fragment;
pub mod lexer;


pub use compiler::{compile_to_html, is_void_element, CompileError, CompileOptions};
pub use fragment::{decode_entities, parse_fragment};
