mod compose;
mod layer;
mod style;
mod visual;

pub use compose::{CompositeHost, LAYER_COUNT};
pub use layer::{LayerKind, LayerRenderer};
pub use style::{StyleTable, StyleTableError, PLACEHOLDER_COLOR};
pub use visual::LayerVisual;
