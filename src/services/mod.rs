pub mod links;
pub mod resolver;

pub use links::LinkService;
pub use resolver::{LookupFailed, ResolvedTarget, Resolution, Resolver};
