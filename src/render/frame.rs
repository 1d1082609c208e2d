//! Box drawing for the `frame` display mode

use console::{Alignment, measure_text_width, pad_str};

/// Spaces left of the box
const MARGIN: usize = 4;
/// Narrowest usable box interior, whatever the terminal says
const MIN_INNER: usize = 20;

/// Border character set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStyle {
    /// Double lines, used for banners
    Heavy,
    /// Thin lines, used for linter results
    Light,
}

struct Borders {
    vertical: char,
    horizontal: char,
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
}

impl FrameStyle {
    fn borders(self) -> Borders {
        match self {
            FrameStyle::Heavy => Borders {
                vertical: '║',
                horizontal: '═',
                top_left: '╔',
                top_right: '╗',
                bottom_left: '╚',
                bottom_right: '╝',
            },
            FrameStyle::Light => Borders {
                vertical: '│',
                horizontal: '─',
                top_left: '┌',
                top_right: '┐',
                bottom_left: '└',
                bottom_right: '┘',
            },
        }
    }
}

/// Draw `title` and an optional `body` inside a box fitting `width` columns.
///
/// Body lines become bullets (numbered when there is more than one) separated
/// by blank lines and word-wrapped to the box.
pub fn draw(style: FrameStyle, width: usize, title: &str, body: Option<&str>) -> String {
    let borders = style.borders();
    let inner = width.saturating_sub(2 * MARGIN + 2).max(MIN_INNER);
    let pad = " ".repeat(MARGIN);
    let horizontal = borders.horizontal.to_string().repeat(inner);

    let mut rows = vec![pad_str(title, inner, Alignment::Center, Some("…")).into_owned()];
    if let Some(body) = body.filter(|body| !body.trim().is_empty()) {
        let text_width = inner - 2;
        rows.push(format!(" {} ", "─".repeat(text_width)));
        for row in body_rows(body, text_width) {
            rows.push(format!(" {} ", pad_str(&row, text_width, Alignment::Left, None)));
        }
    }

    let mut framed = format!("{pad}{}{horizontal}{}\n", borders.top_left, borders.top_right);
    for row in &rows {
        framed.push_str(&format!("{pad}{}{row}{}\n", borders.vertical, borders.vertical));
    }
    framed.push_str(&format!(
        "{pad}{}{horizontal}{}\n",
        borders.bottom_left, borders.bottom_right
    ));
    framed
}

/// Split a body into wrapped rows, one blank row around every bullet
fn body_rows(body: &str, width: usize) -> Vec<String> {
    let bullets: Vec<&str> = body.lines().map(str::trim_end).filter(|row| !row.trim().is_empty()).collect();
    let enumerate = bullets.len() > 1;

    let mut rows = vec![String::new()];
    for (index, bullet) in bullets.iter().enumerate() {
        let bullet = if enumerate {
            format!("{}) {}", index + 1, bullet.trim())
        } else {
            bullet.trim().to_string()
        };
        rows.extend(wrap(&bullet, width));
        rows.push(String::new());
    }
    rows
}

/// Word-wrap `text` to `width` columns. Words longer than a line are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_width = measure_text_width(word);
        let current_width = measure_text_width(&current);

        if !current.is_empty() && current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if word_width <= width {
            current.push_str(word);
        } else {
            // Split on display columns so wide glyphs and escape codes fit
            for ch in word.chars() {
                current.push(ch);
                if measure_text_width(&current) > width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
