use crossterm::style::Color;

use crate::model::ImageStatus;

/// Foreground colours used by the image list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub title: Color,
    pub selected: Color,
    pub cursor: Color,
    pub tree: Color,
    pub region: Color,
    pub image_id: Color,
    pub date: Color,
    pub public: Color,
    pub private: Color,
    pub updating: Color,
    pub error: Color,
    pub success: Color,
    pub scroll: Color,
    pub help: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Color::AnsiValue(39),
            selected: Color::AnsiValue(42),
            cursor: Color::AnsiValue(212),
            tree: Color::AnsiValue(241),
            region: Color::AnsiValue(33),
            image_id: Color::AnsiValue(214),
            date: Color::AnsiValue(245),
            public: Color::AnsiValue(196),
            private: Color::AnsiValue(34),
            updating: Color::AnsiValue(226),
            error: Color::AnsiValue(196),
            success: Color::AnsiValue(42),
            scroll: Color::AnsiValue(240),
            help: Color::AnsiValue(241),
        }
    }
}

impl Theme {
    pub fn status(&self, status: ImageStatus) -> Color {
        match status {
            ImageStatus::Public => self.public,
            ImageStatus::Private => self.private,
            ImageStatus::Updating => self.updating,
            ImageStatus::Error => self.error,
        }
    }
}
