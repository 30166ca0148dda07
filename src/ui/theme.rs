use ratatui::style::Color;

// Dark palette with a single green accent. Add roles here instead of
// hard-coding colors in the render code.
pub const BG: Color = Color::Rgb(13, 15, 18);
pub const SURFACE: Color = Color::Rgb(20, 24, 30);
pub const BAR_BG: Color = Color::Rgb(16, 20, 25);

pub const FG: Color = Color::Rgb(226, 229, 234);
pub const MUTED: Color = Color::Rgb(148, 156, 168);
pub const DIM: Color = Color::Rgb(100, 108, 120);
pub const BORDER: Color = Color::Rgb(58, 66, 80);

pub const ACCENT: Color = Color::Rgb(74, 222, 128);
pub const ACCENT_BG: Color = Color::Rgb(18, 38, 26);

pub const WARN: Color = Color::Rgb(250, 204, 21); // paused indicator
pub const ERROR: Color = Color::Rgb(248, 113, 113);
