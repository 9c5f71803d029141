//! Progress glyph for the live status line

const GLYPHS: [char; 4] = ['|', '/', '-', '\\'];

/// Rotating `| / - \` indicator, advanced once per redraw
#[derive(Debug, Clone, Default)]
pub struct Spinner {
    progress: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current glyph and advance
    pub fn tick(&mut self) -> char {
        let glyph = GLYPHS[self.progress];
        self.progress = (self.progress + 1) % GLYPHS.len();
        glyph
    }
}
