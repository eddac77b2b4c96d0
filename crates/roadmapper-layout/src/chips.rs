//! Tag chip layout.

use roadmapper_core::{Colour, TagStyles, TextMeasurer, TextMetrics, TextStyle};

use crate::{centred_baseline, Point, Rect};

const PAD_X: f32 = 6.0;
const PAD_Y: f32 = 3.0;
const GAP: f32 = 6.0;
const ROW_GAP: f32 = 4.0;
const TRAILING_SPACE: f32 = 10.0;

/// A coloured pill for one tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Chip {
    pub label: String,
    pub rect: Rect,
    pub fill: Colour,
    pub text_colour: Colour,
    pub text_x: f32,
    pub baseline: f32,
    pub metrics: TextMetrics,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChipLayout {
    pub chips: Vec<Chip>,
    /// First free y below the chips
    pub next_y: f32,
}

/// Lay out tag chips in rows starting at `origin`, wrapping before `max_x`.
///
/// Labels are trimmed, blanks skipped and duplicates dropped (first wins).
/// A chip only wraps if it is not the first one on its row.
pub fn layout_chips<S: AsRef<str>>(
    labels: &[S],
    origin: Point,
    max_x: f32,
    style: &TextStyle,
    tags: &TagStyles,
    measurer: &dyn TextMeasurer,
) -> ChipLayout {
    let height = style.size + 2.0 * PAD_Y;
    let mut seen: Vec<&str> = Vec::new();
    let mut chips = Vec::new();
    let (mut x, mut y) = (origin.x, origin.y);

    for label in labels {
        let label = label.as_ref().trim();
        if label.is_empty() || seen.contains(&label) {
            continue;
        }
        seen.push(label);

        let metrics = measurer.measure(label, style);
        let width = metrics.width + 2.0 * PAD_X;
        if x + width > max_x && x > origin.x {
            x = origin.x;
            y += height + ROW_GAP;
        }

        let rect = Rect::new(x, y, width, height);
        let fill = tags.resolve(label);
        chips.push(Chip {
            label: label.to_string(),
            rect,
            fill,
            text_colour: fill.contrasting_text(),
            text_x: x + PAD_X,
            baseline: centred_baseline(&rect, &metrics),
            metrics,
        });
        x += width + GAP;
    }

    let next_y = chips
        .iter()
        .map(|c| c.rect.bottom())
        .reduce(f32::max)
        .map_or(origin.y, |bottom| bottom + TRAILING_SPACE);
    ChipLayout { chips, next_y }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FontBook;
    use pretty_assertions::assert_eq;
    use roadmapper_core::DEFAULT_TAG_PALETTE;

    fn style() -> TextStyle {
        TextStyle::new("Helvetica", 10.0)
    }

    #[test]
    fn duplicates_collapse() {
        let fonts = FontBook::new();
        let tags = TagStyles::new();
        let layout = layout_chips(
            &["Alpha", "Beta", "Alpha"],
            Point::new(40.0, 100.0),
            1000.0,
            &style(),
            &tags,
            &fonts,
        );
        let labels: Vec<_> = layout.chips.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Beta"]);
        assert_eq!(layout.chips[0].rect.y, layout.chips[1].rect.y);
        assert_eq!(layout.next_y, 100.0 + 16.0 + 10.0);
    }

    #[test]
    fn wraps_only_when_needed() {
        let fonts = FontBook::new();
        let tags = TagStyles::new();
        let alpha = fonts.width("Alpha", &style()) + 12.0;
        let beta = fonts.width("Beta", &style()) + 12.0;

        // Just enough room for both on one row
        let fits = 40.0 + alpha + GAP + beta + 0.01;
        let one_row = layout_chips(&["Alpha", "Beta"], Point::new(40.0, 0.0), fits, &style(), &tags, &fonts);
        assert_eq!(one_row.chips[1].rect.y, 0.0);

        let two_rows = layout_chips(
            &["Alpha", "Beta"],
            Point::new(40.0, 0.0),
            fits - 1.0,
            &style(),
            &tags,
            &fonts,
        );
        assert_eq!(two_rows.chips[1].rect.x, 40.0);
        assert_eq!(two_rows.chips[1].rect.y, 16.0 + ROW_GAP);
    }

    #[test]
    fn first_chip_never_wraps() {
        let fonts = FontBook::new();
        let layout = layout_chips(
            &["A very long tag label"],
            Point::new(40.0, 0.0),
            50.0,
            &style(),
            &TagStyles::new(),
            &fonts,
        );
        assert_eq!(layout.chips[0].rect.y, 0.0);
    }

    #[test]
    fn empty_input_keeps_start() {
        let fonts = FontBook::new();
        let layout = layout_chips(&["", "  "], Point::new(0.0, 42.0), 100.0, &style(), &TagStyles::new(), &fonts);
        assert!(layout.chips.is_empty());
        assert_eq!(layout.next_y, 42.0);
    }

    #[test]
    fn colours_are_stable_and_idempotent() {
        let fonts = FontBook::new();
        let tags = TagStyles::new();
        let first = layout_chips(&["Beta", "Alpha"], Point::default(), 500.0, &style(), &tags, &fonts);
        let second = layout_chips(&["Beta", "Alpha"], Point::default(), 500.0, &style(), &tags, &fonts);
        assert_eq!(first, second);
        assert_eq!(first.chips[0].fill, DEFAULT_TAG_PALETTE[0]);
        // Reversed order keeps the colours assigned above
        let reversed = layout_chips(&["Alpha", "Beta"], Point::default(), 500.0, &style(), &tags, &fonts);
        assert_eq!(reversed.chips[0].fill, DEFAULT_TAG_PALETTE[1]);
        assert_eq!(reversed.chips[0].text_colour, Colour::WHITE);
    }
}
