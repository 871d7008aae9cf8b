//! Retained-mode 2D scene graph for chart widgets.
//!
//! Elements live in a [`Storage`] registry and are drawn by a [`Painter`] onto either a
//! CPU raster surface (`vello_cpu`) or a retained SVG document. Pointer input is
//! hit-tested and dispatched by the [`Handler`], property tweens run on the [`Animator`],
//! and [`KeyedLayer`] reconciles keyed data snapshots into animated marks. [`Engine`]
//! wires them together behind one frame loop.
#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod engine;
pub mod foundation;
pub mod input;
pub mod reconcile;
pub mod render;
pub mod scene;

pub use animation::animator::Animator;
pub use animation::ease::Ease;
pub use animation::tween::{Tween, TweenOptions, TweenState};
pub use config::{EngineConfig, LocaleRegistry};
pub use engine::Engine;
pub use foundation::core::{Affine, BezPath, Color, Point, Rect, Size, Vec2};
pub use foundation::error::{SceneError, SceneResult};
pub use foundation::ids::{FrameHandle, ListenerId, NodeId, TweenId};
pub use input::event::{EventKind, PointerInput, PointerKind, SceneEvent};
pub use input::handler::{Handler, hit_test};
pub use reconcile::diff::{KeyDiff, diff_keys};
pub use reconcile::ext::ExtTable;
pub use reconcile::layer::{FadeTransition, KeyedLayer, MarkTarget, MarkTransition, SyncReport};
pub use render::backend::{BackendKind, ExportOptions, PaintBackend};
pub use render::painter::Painter;
pub use render::raster::RasterBackend;
pub use render::scheduler::{FrameQueue, FrameTask};
pub use render::surface::{FixedSurface, SurfaceHost};
pub use render::text::TextEngine;
pub use render::vector::VectorBackend;
pub use scene::doc::SceneDoc;
pub use scene::element::{Attrs, Element};
pub use scene::shape::Shape;
pub use scene::storage::Storage;
pub use scene::style::Style;
pub use scene::transform::Transform;
