pub mod error;
pub mod external;
pub mod format;
pub mod import;
pub mod key;
pub mod node;
pub mod nodes;
pub mod registry;
pub mod style;

pub use error::{ModelError, ModelResult};
pub use external::{ExternalElement, ExternalNode};
pub use format::{Direction, ElementFormat, TextFormat, TextFormatType};
pub use import::{DomConversion, TextPatch};
pub use key::{KeyGenerator, NodeKey};
pub use node::{NodeData, NodeKind, NodeTree};
pub use nodes::decorator::Template;
pub use nodes::element::{ElementAttrs, Heading, HeadingTag};
pub use nodes::embed::{Tweet, YouTube};
pub use nodes::image::Image;
pub use nodes::layout::LayoutContainer;
pub use nodes::text::{TextMode, TextNode};
pub use registry::{ExportOverride, NodeRegistry, NodeTypeEntry};
