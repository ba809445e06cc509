//! Cameras known to the recorder and the colours used to tint their footage.
//!
//! The recorder serialises its camera config verbatim, so the identifier
//! arrives as `name` and extra fields (`rtsp_url`, `retention_days`, …) ride
//! along. Only `id`/`name` and `color` matter here.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A CSS-style colour string such as `#3b82f6`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(Cow<'static, str>);

impl Color {
    /// Slots with no recording.
    pub const MISSING: Color = Color(Cow::Borrowed("#dddddd"));
    /// Used when the selected camera is not (yet) in the camera list.
    pub const UNKNOWN_CAMERA: Color = Color(Cow::Borrowed("#000000"));

    pub fn new(value: impl Into<String>) -> Self {
        Color(Cow::Owned(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::UNKNOWN_CAMERA
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One recorder camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    #[serde(alias = "name")]
    pub id: String,
    #[serde(default, deserialize_with = "color_or_default")]
    pub color: Color,
}

impl Camera {
    pub fn new(id: impl Into<String>, color: impl Into<String>) -> Self {
        Self { id: id.into(), color: Color::new(color) }
    }
}

/// The recorder emits `""` for cameras without a configured colour.
fn color_or_default<'de, D>(de: D) -> std::result::Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(match raw {
        Some(s) if !s.trim().is_empty() => Color::new(s),
        _ => Color::default(),
    })
}

/// Ordered camera list, loaded once per session.
#[derive(Debug, Clone, Default)]
pub struct CameraList {
    cameras: Vec<Camera>,
}

impl CameraList {
    pub fn new(cameras: Vec<Camera>) -> Self {
        Self { cameras }
    }

    pub fn find(&self, id: &str) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.id == id)
    }

    /// Colour of `id`, or [`Color::UNKNOWN_CAMERA`] when it is not listed.
    pub fn color_of(&self, id: &str) -> Color {
        self.find(id).map(|c| c.color.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}
