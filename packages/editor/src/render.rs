//! Handle passed to section renderers so they can embed their block list.

use crate::registry::Registry;
use crate::view::{Mount, VNode};
use pagecraft_schema::Block;
use tracing::warn;

/// Class of the container a section renders its blocks into
pub const BLOCK_LIST_CLASS: &str = "editor-blocks";

pub struct RenderContext<'a> {
    registry: &'a Registry,
    section_id: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn new(registry: &'a Registry, section_id: &'a str) -> Self {
        Self {
            registry,
            section_id,
        }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Id of the section being rendered
    pub fn section_id(&self) -> &'a str {
        self.section_id
    }

    /// Render a block list into a container the engine can reorder.
    ///
    /// Blocks with no registered plugin are skipped with a warning; their
    /// siblings still render.
    pub fn render_blocks(&self, blocks: Option<&[Block]>) -> VNode {
        let mut wrapper = VNode::element("div")
            .with_class(BLOCK_LIST_CLASS)
            .with_mount(Mount::BlockList {
                section_id: self.section_id.to_string(),
            });

        for block in blocks.unwrap_or_default() {
            let Some(plugin) = self.registry.block(&block.type_name) else {
                warn!("No block renderer for: {}", block.type_name);
                continue;
            };

            let node = plugin
                .renderer
                .render(block)
                .into_element()
                .with_mount(Mount::Block {
                    block_id: block.id.clone(),
                });
            wrapper = wrapper.with_child(node);
        }

        wrapper
    }
}
