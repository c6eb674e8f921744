pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod element;
pub mod extract;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod normalize;
pub mod optimize;
pub mod pipeline;
pub mod postprocess;
pub mod recover;
pub mod shape;
pub mod theme;
pub mod validate;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config, parse_config};
pub use element::Element;
pub use extract::{extract_structure, summarize};
pub use ir::{DiagramKind, Edge, Node, Structure};
pub use normalize::normalize;
pub use optimize::optimize;
pub use pipeline::{GenerateOptions, Generated, generate, generate_from_structure};
pub use theme::Theme;
pub use validate::{Validation, validate};

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct ReadmeDoctests;
