//! pitchdeck is the slide document model and editing-history engine behind a pitch-deck canvas
//! editor.
//!
//! A deck is an ordered list of slides, each holding an immutable scene snapshot and its own
//! bounded undo/redo history. The engine:
//!
//! - Encodes and decodes scene snapshots to and from a live [`Surface`]
//! - Composites color and image backgrounds with five scale modes
//! - Renders off-screen thumbnails and full-resolution exports
//! - Patches regenerated images into a slide without touching anything else
//! - Saves the whole deck with at most one save in flight
//!
//! [`DeckEditor`] wires these together the way an interactive editor drives them.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod assets;
pub(crate) mod background;
pub(crate) mod document;
pub(crate) mod history;
pub(crate) mod persist;
pub(crate) mod regen;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod session;

pub use crate::foundation::config::EditorOpts;
pub use crate::foundation::core::{
    Affine, BezPath, BoxFuture, Canvas, Color, Point, Rect, Rgba8Premul, SlideId, Vec2,
};
pub use crate::foundation::error::{DeckError, DeckResult};

pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::fetch::{ImageFetcher, UrlFetcher};
pub use crate::assets::store::{ImageSet, ImageStore};
pub use crate::background::compositor::{
    BackgroundCompositor, BackgroundRequest, LoadedBackground, SlideTarget,
};
pub use crate::background::scale::{background_object, scale_factors};
pub use crate::document::deck::{DeckDocument, SlideRecord};
pub use crate::document::store::{Slide, SlideDocumentStore};
pub use crate::document::templates::{SlideKind, initial_snapshot};
pub use crate::history::stack::HistoryStack;
pub use crate::persist::autosave::Autosaver;
pub use crate::persist::backend::{FileBackend, HttpBackend, PersistenceBackend};
pub use crate::persist::coordinator::PersistenceCoordinator;
pub use crate::regen::client::{HttpRegenerationClient, RegenerationBackend, RegenerationRequest};
pub use crate::regen::patcher::patch_image;
pub use crate::render::bitmap::Bitmap;
pub use crate::render::export::{ExportOpts, ExportedSlide, Exporter};
pub use crate::render::raster::{Rasterizer, render_snapshot};
pub use crate::render::thumbnails::{Thumbnail, ThumbnailEntry, ThumbnailPipeline};
pub use crate::scene::codec::{decode, decode_json, encode};
pub use crate::scene::model::{
    BackgroundImageSpec, BackgroundMode, BackgroundSpec, ElementKind, SCENE_FORMAT_VERSION,
    ScaleMode, SceneDocument, SceneObject,
};
pub use crate::scene::snapshot::{SceneSnapshot, SnapshotFingerprint};
pub use crate::scene::surface::{ShapeKind, Surface, TextStyle};
pub use crate::session::editor::{DeckEditor, RegeneratedImage};
