// letter-rendering-service/src/template/mod.rs

mod normalize;
mod renderer;
mod resolver;

pub use normalize::normalize_key;
pub use renderer::{find_unresolved, render_template, RenderOptions, RenderReport, TemplateRenderer};
pub use resolver::{resolve_field, FieldResolver};
