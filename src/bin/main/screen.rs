use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use fleetread_core::{SessionPhase, SpeedReader, StyleProperty, StyleValidator};

const HELP_LINE: &str = "space pause   h/l step   =/- speed   r rewind   q quit";

/// Accepts style values the terminal can express: hex or named colors for
/// color properties, anything non-empty otherwise.
pub struct TermStyles;

impl StyleValidator for TermStyles {
    fn is_valid(&self, property: StyleProperty, value: &str) -> bool {
        match property {
            StyleProperty::Color | StyleProperty::BackgroundColor => parse_color(value).is_some(),
            StyleProperty::FontSize | StyleProperty::FontFamily => !value.trim().is_empty(),
        }
    }
}

pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb { r, g, b });
    }
    match value.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "white" => Some(Color::White),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "blue" => Some(Color::Blue),
        "yellow" => Some(Color::Yellow),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "grey" | "gray" => Some(Color::Grey),
        _ => None,
    }
}

/// Raw-mode alternate screen, restored on drop.
pub struct Terminal {
    out: Stdout,
}

impl Terminal {
    pub fn open() -> io::Result<Self> {
        let mut out = io::stdout();
        enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(Self { out })
    }

    pub fn draw(&mut self, reader: &SpeedReader) -> io::Result<()> {
        let settings = reader.settings();
        let (columns, rows) = terminal::size()?;
        let chunk = reader.current_chunk_text().unwrap_or_default();
        let highlight = parse_color(&settings.highlight_color).unwrap_or(Color::White);
        let background = parse_color(&settings.highlight_background_color);

        queue!(self.out, Clear(ClearType::All))?;

        let column = (columns as usize).saturating_sub(chunk.chars().count()) / 2;
        queue!(
            self.out,
            MoveTo(column as u16, rows / 2),
            SetForegroundColor(highlight)
        )?;
        if let Some(background) = background {
            queue!(self.out, SetBackgroundColor(background))?;
        }
        queue!(self.out, Print(&chunk), ResetColor)?;

        let status = format!(
            "{} wpm   word {}/{}   {}",
            reader.words_per_minute(),
            reader.word_offset(),
            reader.total_words(),
            phase_label(reader.phase()),
        );
        queue!(
            self.out,
            MoveTo(0, rows.saturating_sub(2)),
            SetForegroundColor(Color::DarkGrey),
            Print(&status),
            ResetColor
        )?;
        queue!(
            self.out,
            MoveTo(0, rows.saturating_sub(1)),
            SetForegroundColor(Color::DarkGrey),
            Print(HELP_LINE),
            ResetColor
        )?;
        self.out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn phase_label(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "no text",
        SessionPhase::Ready => "ready",
        SessionPhase::Reading => "reading",
        SessionPhase::Paused => "paused",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_named_colors_parse() {
        assert_eq!(
            parse_color("#102030"),
            Some(Color::Rgb {
                r: 0x10,
                g: 0x20,
                b: 0x30
            })
        );
        assert_eq!(parse_color("white"), Some(Color::White));
        assert_eq!(parse_color("Gray"), Some(Color::Grey));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("#12345g"), None);
        assert_eq!(parse_color("mauve-ish"), None);
    }

    #[test]
    fn validator_gates_colors_but_not_fonts() {
        assert!(TermStyles.is_valid(StyleProperty::Color, "#B3B3B3"));
        assert!(!TermStyles.is_valid(StyleProperty::Color, "nope"));
        assert!(TermStyles.is_valid(StyleProperty::FontFamily, "sans-serif"));
        assert!(!TermStyles.is_valid(StyleProperty::FontSize, "   "));
    }
}
