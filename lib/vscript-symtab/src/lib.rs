pub mod arena;
pub mod ast;
pub mod context;
pub mod error;
pub mod location;
pub mod resolve;
pub mod scope;
pub mod scoping;
pub mod script;
pub mod store;

pub use context::{Context, ExtensionLibrary};
pub use error::{DiagnosticSink, SemanticError, SemanticErrorKind, SemanticErrors, SymtabError};
pub use location::Location;
pub use scoping::Outcome;
