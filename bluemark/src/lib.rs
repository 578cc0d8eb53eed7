pub mod block;
pub mod blueprint;
pub mod markdown;
pub mod parser;

pub use block::{Block, BlockKind, SourceMap};
pub use blueprint::{Blueprint, Header, Method, Payload, Resource, ResourceGroup};
pub use parser::{ParseOptions, ParseReport, Parser};
