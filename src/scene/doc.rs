use crate::foundation::core::Color;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::NodeId;
use crate::scene::element::Element;
use crate::scene::shape::{ImageData, Shape};
use crate::scene::storage::Storage;
use crate::scene::style::Style;
use crate::scene::transform::Transform;
use std::path::Path;
use std::sync::Arc;

/// Serializable description of a whole scene.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneDoc {
    /// Surface width in CSS pixels.
    pub width: u32,
    /// Surface height in CSS pixels.
    pub height: u32,
    /// Color painted under every root when exporting.
    #[serde(default)]
    pub background: Option<Color>,
    /// Root nodes in insertion order.
    #[serde(default)]
    pub nodes: Vec<NodeDoc>,
}

/// One node of a [`SceneDoc`]. Nodes without a `shape` are groups.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NodeDoc {
    /// Debug name, also printed by the CLI `hit` command.
    pub name: Option<String>,
    /// Leaf geometry; absent for groups.
    pub shape: Option<Shape>,
    /// Paint attributes.
    pub style: Style,
    /// Local transform.
    pub transform: Transform,
    /// First-tier sort key.
    pub zlevel: i32,
    /// Second-tier sort key.
    pub z: i32,
    /// Excluded from hit-testing.
    pub silent: bool,
    /// Excluded from painting and hit-testing.
    pub invisible: bool,
    /// Can be dragged.
    pub draggable: bool,
    /// Children of a group.
    pub children: Vec<NodeDoc>,
}

impl SceneDoc {
    /// Parse and validate a JSON scene.
    pub fn from_json_str(s: &str) -> SceneResult<Self> {
        let doc: Self = serde_json::from_str(s)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Read, parse and validate a JSON scene file.
    pub fn from_path(path: &Path) -> SceneResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SceneError::validation(format!("read scene '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> SceneResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::validation("scene width/height must be > 0"));
        }
        for node in &self.nodes {
            node.validate()?;
        }
        Ok(())
    }

    /// Build the scene into `storage`, registering every top-level node as a root.
    ///
    /// Image hrefs that name files are loaded relative to `base_dir`.
    pub fn build_into(&self, storage: &mut Storage, base_dir: Option<&Path>) -> SceneResult<Vec<NodeId>> {
        let mut roots = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let id = node.build(storage, base_dir)?;
            storage.add_root(id);
            roots.push(id);
        }
        Ok(roots)
    }
}

impl NodeDoc {
    fn validate(&self) -> SceneResult<()> {
        if self.shape.is_some() && !self.children.is_empty() {
            return Err(SceneError::validation(format!(
                "node '{}' has both a shape and children",
                self.name.as_deref().unwrap_or("<unnamed>")
            )));
        }
        if !(0.0..=1.0).contains(&self.style.opacity) {
            return Err(SceneError::validation("style.opacity must be in [0,1]"));
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }

    fn build(&self, storage: &mut Storage, base_dir: Option<&Path>) -> SceneResult<NodeId> {
        let mut el = match &self.shape {
            Some(shape) => Element::shape(load_image(shape.clone(), base_dir)?),
            None => Element::group(),
        }
        .with_style(self.style.clone())
        .with_transform(self.transform)
        .with_z(self.zlevel, self.z)
        .with_silent(self.silent)
        .with_invisible(self.invisible)
        .with_draggable(self.draggable);
        if let Some(name) = &self.name {
            el = el.with_name(name.clone());
        }
        let id = storage.insert(el);
        for child in &self.children {
            let child_id = child.build(storage, base_dir)?;
            storage.add_child(id, child_id);
        }
        Ok(id)
    }
}

fn load_image(mut shape: Shape, base_dir: Option<&Path>) -> SceneResult<Shape> {
    if let Shape::Image { source, .. } = &mut shape {
        let href = source.href.as_str();
        if source.pixels.is_none() && !href.is_empty() && !href.contains(':') {
            let path = match base_dir {
                Some(dir) => dir.join(href),
                None => Path::new(href).to_path_buf(),
            };
            let bytes = std::fs::read(&path).map_err(|e| {
                SceneError::validation(format!("read image '{}': {e}", path.display()))
            })?;
            source.pixels = Some(Arc::new(ImageData::decode(&bytes)?));
        }
    }
    Ok(shape)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/doc.rs"]
mod tests;
