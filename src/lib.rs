// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

pub mod availability;
pub mod backend;
pub mod camera;
pub mod config;
pub mod driver;
pub mod error;
#[cfg(feature = "gstreamer")]
pub mod gst_engine;
pub mod hover;
pub mod playback;
pub mod selection;
pub mod session;
pub mod timeline;
