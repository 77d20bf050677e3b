//! Line-oriented conditional compilation for source text.
//!
//! Lines between `//@ifdef NAME` (or `//@ifndef NAME`) and the matching
//! `//@endif` are kept or dropped depending on whether `NAME` is truthy in
//! the supplied [`Definitions`]. Directive lines are always removed; every
//! other byte of the input, line endings included, passes through untouched.
//!
//! ```text
//! const words = [];
//! //@ifdef DEFINED
//! words.push('the', 'cake', 'is');
//! //@endif
//! words.push('a', 'lie');
//! ```

pub mod defines;
pub mod error;
pub mod parser;
pub mod preprocessor;
pub mod stack;

pub use defines::{Definitions, Value};
pub use error::{Error, Result};
pub use parser::{Directive, DirectiveParser, Located};
pub use preprocessor::{Preprocessor, preprocess};
pub use stack::{BitStack, ConditionStack, MAX_DEPTH, VecStack};
