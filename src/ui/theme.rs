use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub tab_active: Color,
    pub table_header_fg: Color,
    pub row_highlight_bg: Color,
    pub tcp_fg: Color,
    pub udp_fg: Color,
    pub upload_fg: Color,
    pub download_fg: Color,
    pub warning_fg: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub statusbar_bg: Color,
}

impl Theme {
    pub fn from_config(theme_name: &str) -> Self {
        match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn next(&self) -> Self {
        match self.name {
            "dark" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Rgb(103, 232, 249),
            header_accent_fg: Color::Black,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,
            tab_active: Color::Rgb(103, 232, 249),
            table_header_fg: Color::Yellow,
            row_highlight_bg: Color::Rgb(49, 50, 68),
            tcp_fg: Color::Rgb(96, 165, 250),
            udp_fg: Color::Rgb(192, 132, 252),
            upload_fg: Color::Rgb(251, 146, 60),
            download_fg: Color::Rgb(52, 211, 153),
            warning_fg: Color::Rgb(248, 113, 113),
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            statusbar_bg: Color::DarkGray,
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Blue,
            header_accent_fg: Color::White,
            overlay_border: Color::Rgb(150, 150, 150),
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            text_muted: Color::Rgb(150, 150, 150),
            tab_active: Color::Blue,
            table_header_fg: Color::Rgb(200, 100, 0),
            row_highlight_bg: Color::Rgb(210, 220, 235),
            tcp_fg: Color::Rgb(70, 130, 180),
            udp_fg: Color::Rgb(160, 80, 160),
            upload_fg: Color::Rgb(200, 100, 0),
            download_fg: Color::Rgb(0, 120, 0),
            warning_fg: Color::Red,
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            statusbar_bg: Color::Rgb(220, 220, 220),
        }
    }
}
