//! Paragraph and word tokenization.

/// Split source text into trimmed, non-empty paragraphs on newline runs.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}

/// Split one paragraph into words on whitespace runs, dropping empties.
pub fn split_words(paragraph: &str) -> Vec<&str> {
    paragraph.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_split_on_newline_runs() {
        let text = "first paragraph\n\n\n  second paragraph  \nthird";
        assert_eq!(
            split_paragraphs(text),
            ["first paragraph", "second paragraph", "third"],
        );
    }

    #[test]
    fn blank_and_whitespace_paragraphs_are_dropped() {
        assert_eq!(split_paragraphs(""), Vec::<&str>::new());
        assert_eq!(split_paragraphs("\n \n\t\n"), Vec::<&str>::new());
    }

    #[test]
    fn words_split_on_whitespace_runs() {
        assert_eq!(split_words("uno  dos\t tres"), ["uno", "dos", "tres"]);
        assert_eq!(split_words("   "), Vec::<&str>::new());
    }
}
