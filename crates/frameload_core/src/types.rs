use std::fmt;

/// Transport handle for one fetch job, allocated by the loader.
pub type JobId = u64;

/// Concurrently active secondary-resource jobs per frame.
pub const DEFAULT_REQUEST_LIMIT: usize = 2;

/// Stable key of a frame in the loader's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub(crate) u32);

impl FrameId {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Options for opening a document in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenOptions {
    /// Bypass caches for the document and its secondary resources.
    pub reload: bool,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl OpenOptions {
    pub fn reload() -> Self {
        Self {
            reload: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Display and behavior settings handed to the presentation side of a frame.
///
/// The loader does not interpret these; it threads them from the root into
/// every child frame it creates and reports them through
/// [`Effect::ApplySettings`](crate::Effect::ApplySettings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSettings {
    pub font_family: String,
    pub font_size: u16,
    pub text_color: Color,
    pub link_color: Color,
    pub visited_link_color: Color,
    pub background_color: Color,
    pub underline_links: bool,
    pub change_cursor_over_links: bool,
    pub autoload_images: bool,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            font_family: "times".to_string(),
            font_size: 12,
            text_color: Color(0, 0, 0),
            link_color: Color(0, 0, 255),
            visited_link_color: Color(255, 0, 255),
            background_color: Color(255, 255, 255),
            underline_links: true,
            change_cursor_over_links: true,
            autoload_images: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Upper bound on active secondary jobs per frame. Values below 1 are raised to 1.
    pub request_limit: usize,
    /// Settings for the root frame; children inherit them from their parent.
    pub root_settings: FrameSettings,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            request_limit: DEFAULT_REQUEST_LIMIT,
            root_settings: FrameSettings::default(),
        }
    }
}

/// Terminal result of one load generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Canceled,
}

/// Where a frame stands in its current open() generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing has been opened yet.
    #[default]
    Idle,
    /// Loading, or waiting for children; the completion edge has not fired.
    Pending,
    /// The completion edge fired with this outcome.
    Done(Outcome),
}

/// Where a link activation went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Opened(FrameId),
    /// No frame of this tree is the target; the resolved URL belongs in a new window.
    NewWindow(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub pending: usize,
    pub active: usize,
    pub limit: usize,
}
