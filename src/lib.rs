//! zawk - lexical front end and value runtime for a POSIX AWK
//!
//! This crate provides the scanner that turns AWK program text into tokens,
//! and the data types the rest of an AWK implementation is built on:
//! [`ZString`] (shared byte strings), [`ZMap`] (AWK arrays), [`ZList`]
//! (the growable table type) and [`Value`] (the AWK scalar/array cell).
//!
//! # Example
//!
//! ```
//! use zawk::{Lexer, TokenKind};
//!
//! let mut lexer = Lexer::new("a = 1 / 2");
//! let kinds: Vec<TokenKind> = lexer
//!     .tokenize()
//!     .unwrap()
//!     .into_iter()
//!     .map(|t| t.kind)
//!     .collect();
//!
//! assert_eq!(
//!     kinds,
//!     [
//!         TokenKind::Var,
//!         TokenKind::Assign,
//!         TokenKind::Number,
//!         TokenKind::Slash,
//!         TokenKind::Number,
//!         TokenKind::Newline,
//!         TokenKind::Eof,
//!     ]
//! );
//! ```
//!
//! # Arrays Example
//!
//! ```
//! use zawk::{Value, ZMap, ZString};
//!
//! let mut map = ZMap::new();
//! map.insert(&ZString::from("answer"), Value::Number(42.0));
//! map.delete(&ZString::from("missing"));
//!
//! assert_eq!(map.len(), 1);
//! assert_eq!(map.find(&ZString::from("answer")).map(Value::to_number), Some(42.0));
//! ```
//!
//! # Driving the Lexer
//!
//! ```
//! use zawk::{Context, Lexer, TokenKind};
//!
//! let mut ctx = Context::new(Lexer::new(r#"BEGIN { print "hi" }"#));
//! while ctx.scan().unwrap().kind != TokenKind::Eof {
//!     ctx.literal_from_token().unwrap();
//! }
//! assert_eq!(ctx.literals.len(), 1);
//! ```

pub mod context;
pub mod error;
pub mod lexer;
pub mod value;
pub mod zlist;
pub mod zmap;
pub mod zstring;

pub use context::Context;
pub use error::{Diagnostic, Error, Result, SourceLocation};
pub use lexer::{Builtin, Lexer, LexerOptions, ProgramSource, Token, TokenClass, TokenKind};
pub use value::Value;
pub use zlist::ZList;
pub use zmap::ZMap;
pub use zstring::ZString;
