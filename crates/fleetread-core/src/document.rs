//! Paragraph/chunk hierarchy with word-offset addressing.

use log::debug;

use crate::{
    chunk::{self, ChunkText},
    range::{self, WordRange},
    text,
    walker::{CursorChange, Walker},
};

/// Chunks of one newline-delimited block, with their offset ranges and a
/// chunk cursor. The cursor keeps highlight state in step: moving it
/// unhighlights the old chunk and highlights the new one.
pub struct Paragraph {
    chunks: Walker<ChunkText>,
    span: WordRange,
    chunk_ranges: Vec<WordRange>,
}

impl Paragraph {
    fn new(chunks: Vec<ChunkText>, chunk_ranges: Vec<WordRange>) -> Self {
        let span = WordRange {
            begin: chunk_ranges.first().map(|range| range.begin).unwrap_or(1),
            end: chunk_ranges.last().map(|range| range.end).unwrap_or(0),
        };
        Self {
            chunks: Walker::new(chunks),
            span,
            chunk_ranges,
        }
    }

    pub fn span(&self) -> WordRange {
        self.span
    }

    pub fn chunk_ranges(&self) -> &[WordRange] {
        &self.chunk_ranges
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk_index(&self) -> isize {
        self.chunks.index()
    }

    pub fn chunks(&self) -> &[ChunkText] {
        self.chunks.items()
    }

    pub fn set_chunk_index(&mut self, index: isize) -> Option<CursorChange> {
        let change = self.chunks.set_index(index)?;
        if let Some(old) = self.chunks.item_mut(change.old_index) {
            old.set_highlighted(false);
        }
        if let Some(new) = self.chunks.item_mut(change.new_index) {
            new.set_highlighted(true);
        }
        Some(change)
    }

    pub fn current_chunk(&self) -> Option<&ChunkText> {
        self.chunks.current()
    }

    pub fn next_chunk(&mut self) -> Option<&ChunkText> {
        let _ = self.set_chunk_index(self.chunks.index() + 1);
        self.current_chunk()
    }

    pub fn previous_chunk(&mut self) -> Option<&ChunkText> {
        let _ = self.set_chunk_index(self.chunks.index() - 1);
        self.current_chunk()
    }

    pub fn to_first_chunk(&mut self) -> Option<&ChunkText> {
        let _ = self.set_chunk_index(0);
        self.current_chunk()
    }

    pub fn to_last_chunk(&mut self) -> Option<&ChunkText> {
        let _ = self.set_chunk_index(self.chunks.len() as isize - 1);
        self.current_chunk()
    }

    /// Unhighlight every chunk and park the cursor before the first.
    pub fn rewind_chunks(&mut self) {
        for chunk in self.chunks.items_mut() {
            chunk.set_highlighted(false);
        }
        self.chunks.rewind();
    }

    pub fn has_next_chunk(&self) -> bool {
        self.chunks.has_next()
    }

    pub fn has_previous_chunk(&self) -> bool {
        self.chunks.has_previous()
    }

    pub fn is_chunk_in_range(&self) -> bool {
        self.chunks.is_in_range()
    }
}

/// All paragraphs of one loaded text, the paragraph cursor, and the span
/// table used for offset lookups.
pub struct Document {
    paragraphs: Walker<Paragraph>,
    paragraph_spans: Vec<WordRange>,
    total_words: u32,
}

impl Document {
    /// Tokenize and chunk `text` under the given character budget, deriving
    /// chunk and paragraph ranges from the cumulative word count.
    pub fn build(source: &str, max_chunk_chars: f32) -> Self {
        let mut paragraphs = Vec::new();
        let mut paragraph_spans = Vec::new();
        let mut offset = 0u32;

        for paragraph_text in text::split_paragraphs(source) {
            let words = text::split_words(paragraph_text);
            let grouped = chunk::chunk_words(&words, max_chunk_chars);

            let mut chunks = Vec::with_capacity(grouped.len());
            let mut chunk_ranges = Vec::with_capacity(grouped.len());
            for chunk_words in &grouped {
                let begin = offset + 1;
                offset += chunk_words.len() as u32;
                chunk_ranges.push(WordRange { begin, end: offset });
                chunks.push(ChunkText::new(chunk_words));
            }

            let paragraph = Paragraph::new(chunks, chunk_ranges);
            paragraph_spans.push(paragraph.span());
            paragraphs.push(paragraph);
        }

        let mut paragraphs = Walker::new(paragraphs);
        paragraphs.set_change_hook(Box::new(|change| {
            debug!(
                "document: paragraph cursor {} -> {}",
                change.old_index, change.new_index
            );
        }));

        Self {
            paragraphs,
            paragraph_spans,
            total_words: offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        self.paragraphs.items()
    }

    pub fn total_words(&self) -> u32 {
        self.total_words
    }

    pub fn paragraph_index(&self) -> isize {
        self.paragraphs.index()
    }

    pub fn current_paragraph(&self) -> Option<&Paragraph> {
        self.paragraphs.current()
    }

    pub fn current_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        self.paragraphs.current_mut()
    }

    /// Move the paragraph cursor; the paragraph being left has its chunk
    /// cursor rewound so its highlight does not linger.
    pub fn set_paragraph_index(&mut self, index: isize) -> Option<CursorChange> {
        let change = self.paragraphs.set_index(index)?;
        if let Some(old) = self.paragraphs.item_mut(change.old_index) {
            old.rewind_chunks();
        }
        Some(change)
    }

    pub fn next_paragraph(&mut self) -> Option<&Paragraph> {
        let _ = self.set_paragraph_index(self.paragraphs.index() + 1);
        self.paragraphs.current()
    }

    pub fn previous_paragraph(&mut self) -> Option<&Paragraph> {
        let _ = self.set_paragraph_index(self.paragraphs.index() - 1);
        self.paragraphs.current()
    }

    /// Step to the next chunk, crossing into the next paragraph's first
    /// chunk at a paragraph boundary.
    pub fn to_next_chunk(&mut self) -> Option<&ChunkText> {
        if self
            .current_paragraph()
            .is_some_and(Paragraph::has_next_chunk)
        {
            return self.current_paragraph_mut().and_then(Paragraph::next_chunk);
        }
        let _ = self.set_paragraph_index(self.paragraphs.index() + 1);
        self.current_paragraph_mut()
            .and_then(Paragraph::to_first_chunk)
    }

    /// Step to the previous chunk, crossing into the previous paragraph's
    /// last chunk at a paragraph boundary.
    pub fn to_previous_chunk(&mut self) -> Option<&ChunkText> {
        if self
            .current_paragraph()
            .is_some_and(Paragraph::has_previous_chunk)
        {
            return self
                .current_paragraph_mut()
                .and_then(Paragraph::previous_chunk);
        }
        let _ = self.set_paragraph_index(self.paragraphs.index() - 1);
        self.current_paragraph_mut()
            .and_then(Paragraph::to_last_chunk)
    }

    pub fn current_chunk(&self) -> Option<&ChunkText> {
        self.current_paragraph().and_then(Paragraph::current_chunk)
    }

    pub fn has_next_paragraph(&self) -> bool {
        self.paragraphs.has_next()
    }

    pub fn has_previous_paragraph(&self) -> bool {
        self.paragraphs.has_previous()
    }

    pub fn has_next_chunk(&self) -> bool {
        self.current_paragraph()
            .is_some_and(Paragraph::has_next_chunk)
    }

    pub fn has_previous_chunk(&self) -> bool {
        self.current_paragraph()
            .is_some_and(Paragraph::has_previous_chunk)
    }

    /// Unhighlight everything and park both cursor levels before-first.
    pub fn rewind(&mut self) {
        for paragraph in self.paragraphs.items_mut() {
            paragraph.rewind_chunks();
        }
        self.paragraphs.rewind();
    }

    /// Linear 1-based offset of the current chunk's first word. Defaults to
    /// 1 when no paragraph is in range; a paragraph without an in-range
    /// chunk cursor reports its first chunk.
    pub fn word_offset(&self) -> u32 {
        const DEFAULT_OFFSET: u32 = 1;

        let Some(paragraph) = self.current_paragraph() else {
            return DEFAULT_OFFSET;
        };
        let chunk = if paragraph.is_chunk_in_range() {
            paragraph.chunk_index() as usize
        } else {
            0
        };
        paragraph
            .chunk_ranges()
            .get(chunk)
            .map(|range| range.begin)
            .unwrap_or(DEFAULT_OFFSET)
    }

    /// Map a linear offset back to a (paragraph, chunk) position and move
    /// both cursors there. A miss leaves the document untouched.
    pub fn set_word_offset(&mut self, offset: u32) -> bool {
        let Some(paragraph_index) = range::find_index_in_ranges(&self.paragraph_spans, offset)
        else {
            return false;
        };
        let Some(chunk_index) = self
            .paragraphs
            .item(paragraph_index as isize)
            .and_then(|paragraph| range::find_index_in_ranges(paragraph.chunk_ranges(), offset))
        else {
            return false;
        };

        let _ = self.set_paragraph_index(paragraph_index as isize);
        if let Some(paragraph) = self.current_paragraph_mut() {
            let _ = paragraph.set_chunk_index(chunk_index as isize);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PARAGRAPHS: &str = "uno dos tres cuatro cinco seis\nsiete ocho nueve";

    fn doc() -> Document {
        Document::build(TWO_PARAGRAPHS, 11.4)
    }

    #[test]
    fn empty_text_builds_empty_document() {
        let doc = Document::build("", 11.4);
        assert!(doc.is_empty());
        assert_eq!(doc.total_words(), 0);
        assert_eq!(doc.word_offset(), 1);
        assert!(!doc.has_next_paragraph());
    }

    #[test]
    fn chunks_partition_the_tokenized_words() {
        let doc = doc();
        let direct: Vec<&str> = text::split_paragraphs(TWO_PARAGRAPHS)
            .into_iter()
            .flat_map(|paragraph| text::split_words(paragraph))
            .collect();

        let mut from_chunks = Vec::new();
        for paragraph in doc.paragraphs() {
            for chunk in paragraph.chunks() {
                from_chunks.extend(chunk.text().split(' ').map(str::to_string));
            }
        }

        assert_eq!(from_chunks, direct);
        assert_eq!(doc.total_words(), direct.len() as u32);
    }

    #[test]
    fn ranges_are_contiguous_and_increasing() {
        let doc = doc();
        let mut previous_end = 0u32;
        for paragraph in doc.paragraphs() {
            for range in paragraph.chunk_ranges() {
                assert_eq!(range.begin, previous_end + 1);
                assert!(range.end >= range.begin);
                previous_end = range.end;
            }
        }
        assert_eq!(previous_end, doc.total_words());

        let spans: Vec<WordRange> = doc.paragraphs().iter().map(Paragraph::span).collect();
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].begin);
        }
    }

    #[test]
    fn word_offset_round_trips_to_chunk_begin() {
        let mut doc = doc();
        for offset in 1..=doc.total_words() {
            assert!(doc.set_word_offset(offset));
            let restored = doc.word_offset();
            let paragraph = doc.current_paragraph().unwrap();
            let chunk_range =
                paragraph.chunk_ranges()[paragraph.chunk_index() as usize];
            assert!(chunk_range.contains(offset));
            assert_eq!(restored, chunk_range.begin);
        }
    }

    #[test]
    fn offset_miss_is_a_no_op() {
        let mut doc = doc();
        doc.set_word_offset(3);
        let before = (doc.paragraph_index(), doc.word_offset());
        assert!(!doc.set_word_offset(0));
        assert!(!doc.set_word_offset(doc.total_words() + 1));
        assert_eq!((doc.paragraph_index(), doc.word_offset()), before);
    }

    #[test]
    fn chunk_stepping_crosses_paragraphs() {
        let mut doc = doc();
        let mut seen = Vec::new();
        while let Some(chunk) = doc.to_next_chunk() {
            seen.push(chunk.text().to_string());
        }
        assert!(doc.current_paragraph().is_none());
        assert!(seen.len() >= 4);

        doc.rewind();
        doc.set_word_offset(1);
        assert!(doc.to_previous_chunk().is_none());
        assert!(doc.current_paragraph().is_none());
    }

    #[test]
    fn moving_the_chunk_cursor_tracks_highlight() {
        let mut doc = doc();
        let _ = doc.to_next_chunk();
        let _ = doc.to_next_chunk();
        let paragraph = doc.current_paragraph().unwrap();
        assert!(paragraph.chunks()[1].is_highlighted());
        assert!(!paragraph.chunks()[0].is_highlighted());
    }

    #[test]
    fn leaving_a_paragraph_rewinds_its_chunks() {
        let mut doc = doc();
        doc.set_word_offset(1);
        let last = doc.total_words();
        doc.set_word_offset(last);
        let first = &doc.paragraphs()[0];
        assert!(first.chunk_index() == -1);
        assert!(first.chunks().iter().all(|chunk| !chunk.is_highlighted()));
    }

    #[test]
    fn rewind_clears_all_highlights() {
        let mut doc = doc();
        let _ = doc.to_next_chunk();
        let _ = doc.to_next_chunk();
        doc.rewind();
        assert_eq!(doc.paragraph_index(), -1);
        for paragraph in doc.paragraphs() {
            assert_eq!(paragraph.chunk_index(), -1);
            assert!(paragraph.chunks().iter().all(|chunk| !chunk.is_highlighted()));
        }
    }
}
