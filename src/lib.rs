pub mod error;
pub mod level;
pub mod value;
pub mod record;
pub mod group;
pub mod buffer;
pub mod color;
pub mod handler;
pub mod text;
pub mod indent;
pub mod layer;

pub use error::{Error, Result};
pub use handler::{Handler, HandlerOptions, ReplaceAttr};
pub use indent::IndentHandler;
pub use level::Level;
pub use record::{Record, Source};
pub use text::TextHandler;
pub use value::{Attr, LogValuer, Value};
