pub mod directive;

pub use directive::{Directive, DirectiveParser, Located, Scan};
