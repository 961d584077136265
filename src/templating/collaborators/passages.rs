//! Human-readable passage references.

use super::PassageFormatter;
use crate::models::BiblePassage;

/// Formats passage pairs the way they are usually written:
///
/// | start / end | output |
/// |---|---|
/// | John 3:16 / John 3:16 | `John 3:16` |
/// | John 3:16 / John 3:21 | `John 3:16-21` |
/// | John 3:16 / John 4:2 | `John 3:16-4:2` |
/// | John 21:1 / Acts 1:5 | `John 21:1 - Acts 1:5` |
///
/// An end with no book is treated as equal to the start. A start with no book
/// renders as empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPassageFormatter;

impl PassageFormatter for StandardPassageFormatter {
    fn format(&self, start: &BiblePassage, end: &BiblePassage) -> String {
        let book = start.book.trim();
        if book.is_empty() {
            return String::new();
        }

        let end_book = end.book.trim();
        let same_verse =
            end_book == book && end.chapter == start.chapter && end.verse == start.verse;
        if end_book.is_empty() || same_verse {
            return format!("{book} {}:{}", start.chapter, start.verse);
        }

        if end_book != book {
            return format!(
                "{book} {}:{} - {end_book} {}:{}",
                start.chapter, start.verse, end.chapter, end.verse
            );
        }

        if end.chapter == start.chapter {
            format!("{book} {}:{}-{}", start.chapter, start.verse, end.verse)
        } else {
            format!("{book} {}:{}-{}:{}", start.chapter, start.verse, end.chapter, end.verse)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(start: (&str, u32, u32), end: (&str, u32, u32)) -> String {
        StandardPassageFormatter.format(
            &BiblePassage::new(start.0, start.1, start.2),
            &BiblePassage::new(end.0, end.1, end.2),
        )
    }

    #[test]
    fn test_single_verse() {
        assert_eq!(fmt(("John", 3, 16), ("John", 3, 16)), "John 3:16");
        assert_eq!(fmt(("John", 3, 16), ("", 0, 0)), "John 3:16");
    }

    #[test]
    fn test_same_chapter_range() {
        assert_eq!(fmt(("John", 3, 16), ("John", 3, 21)), "John 3:16-21");
    }

    #[test]
    fn test_cross_chapter_range() {
        assert_eq!(fmt(("John", 3, 16), ("John", 4, 2)), "John 3:16-4:2");
    }

    #[test]
    fn test_cross_book_range() {
        assert_eq!(fmt(("John", 21, 1), ("Acts", 1, 5)), "John 21:1 - Acts 1:5");
    }

    #[test]
    fn test_missing_book_is_empty() {
        assert_eq!(fmt(("", 3, 16), ("John", 3, 21)), "");
    }
}
