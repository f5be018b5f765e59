use super::layer::{LayerKind, LayerRenderer};
use super::style::StyleTable;
use super::visual::LayerVisual;
use crate::viewmodel::RootViewModel;

pub const LAYER_COUNT: usize = 2;

/// Fixed-order composition of the two layer renderers. The tile layer is
/// child 0 and paints strictly under the entity layer at child 1; this
/// ordering is an invariant, not a default.
#[derive(Debug)]
pub struct CompositeHost {
    tile_layer: LayerRenderer,
    entity_layer: LayerRenderer,
}

impl CompositeHost {
    pub fn new(root: &mut RootViewModel) -> Self {
        Self {
            tile_layer: LayerRenderer::new(LayerKind::Tile, root),
            entity_layer: LayerRenderer::new(LayerKind::Entity, root),
        }
    }

    pub fn child_count(&self) -> usize {
        LAYER_COUNT
    }

    pub fn child_at(&self, index: usize) -> Option<&LayerVisual> {
        match index {
            0 => Some(self.tile_layer.visual()),
            1 => Some(self.entity_layer.visual()),
            _ => None,
        }
    }

    /// Delegates to both owned renderers; returns whether any visual was
    /// redrawn and the composition therefore needs repainting.
    pub fn sync(&mut self, root: &mut RootViewModel, styles: &mut StyleTable) -> bool {
        let tile_redrawn = self.tile_layer.sync(root, styles);
        let entity_redrawn = self.entity_layer.sync(root, styles);
        tile_redrawn || entity_redrawn
    }

    /// Blits the children onto the host frame in paint order. No drawing of
    /// its own; composition only.
    pub fn composite_into(&self, frame: &mut [u8], frame_width: u32, frame_height: u32) {
        for index in 0..LAYER_COUNT {
            if let Some(visual) = self.child_at(index) {
                visual.blit_onto(frame, frame_width, frame_height);
            }
        }
    }

    pub fn take_dirty(&mut self) -> bool {
        let tile_dirty = self.tile_layer.visual_mut().take_dirty();
        let entity_dirty = self.entity_layer.visual_mut().take_dirty();
        tile_dirty || entity_dirty
    }

    pub fn canvas_size_px(&self) -> (u32, u32) {
        (
            self.tile_layer.visual().width_px(),
            self.tile_layer.visual().height_px(),
        )
    }
}
