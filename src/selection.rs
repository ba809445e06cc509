//! Current (camera, date, segment) selection and the media identifiers that
//! derive from it.
//!
//! Identifiers are paths relative to the recorder's `/videos/` root; see
//! [`crate::backend::media_url`] for turning them into absolute URLs.

/// Stale-response ticket. Issued on every selection change; a fetch response
/// is applied only while its ticket is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Default)]
pub struct Selection {
    camera: Option<String>,
    date: Option<String>,
    segment: Option<String>,
    generation: u64,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera(&self) -> Option<&str> {
        self.camera.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    /// Switch camera. Date and segment are kept so the same block can be
    /// compared across cameras.
    pub fn select_camera(&mut self, camera: impl Into<String>) -> FetchTicket {
        self.camera = Some(camera.into());
        self.bump()
    }

    /// First half of segment selection: record the choice synchronously and
    /// hand back the ticket the existing-segments fetch must carry.
    pub fn select_segment(&mut self, date: impl Into<String>, segment: impl Into<String>) -> FetchTicket {
        self.date = Some(date.into());
        self.segment = Some(segment.into());
        self.bump()
    }

    pub fn ticket(&self) -> FetchTicket {
        FetchTicket(self.generation)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Playback manifest for the selected segment, or empty when none is
    /// selected.
    pub fn stream_source(&self) -> String {
        match &self.segment {
            Some(seg) => format!("{}/stream.m3u8", self.prefix(seg)),
            None => String::new(),
        }
    }

    /// Thumbnail for the hovered slot, or empty when nothing is hovered.
    /// The slot number is zero-padded to three digits to match the
    /// recorder's file names.
    pub fn thumbnail_source(&self, hovered: Option<usize>) -> String {
        match hovered {
            Some(slot) => format!(
                "{}/thumbnails/{:03}.jpg",
                self.prefix(self.segment.as_deref().unwrap_or_default()),
                slot
            ),
            None => String::new(),
        }
    }

    fn prefix(&self, segment: &str) -> String {
        format!(
            "{}/{}/{}",
            self.camera.as_deref().unwrap_or_default(),
            self.date.as_deref().unwrap_or_default(),
            segment
        )
    }

    fn bump(&mut self) -> FetchTicket {
        self.generation += 1;
        self.ticket()
    }
}
