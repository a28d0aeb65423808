use super::normalize::{decode_entities, normalize_text, trim_caption};
use super::{FormatOptions, TranscriptFragment};

/// Turn fragments into readable text, either as one block or as paragraphs
/// separated by blank lines.
///
/// Fragments are expected in ascending `timestamp` order; they are not re-sorted.
pub fn format_transcript_text(fragments: &[TranscriptFragment], options: &FormatOptions) -> String {
    if !options.enable_paragraphs {
        let joined = fragments
            .iter()
            .map(|fragment| decode_entities(&fragment.text))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        return normalize_text(&joined);
    }

    let mut segmenter = ParagraphSegmenter::new(options);
    for fragment in fragments {
        segmenter.push(fragment);
    }
    segmenter.finish().join("\n\n")
}

/// Groups fragments into paragraphs one fragment at a time.
///
/// A paragraph is closed before a fragment is appended when the silence since
/// the previous fragment exceeds the threshold, when the previous fragment ends
/// a sentence and the new one starts with an uppercase letter, or when the
/// paragraph is already full.
#[derive(Debug)]
pub struct ParagraphSegmenter<'a> {
    options: &'a FormatOptions,
    current: Vec<String>,
    paragraphs: Vec<String>,
    last_end_time: f64,
}

impl<'a> ParagraphSegmenter<'a> {
    pub fn new(options: &'a FormatOptions) -> Self {
        Self {
            options,
            current: Vec::new(),
            paragraphs: Vec::new(),
            last_end_time: 0.0,
        }
    }

    /// Feed the next fragment. Fragments with no text after decoding are ignored.
    pub fn push(&mut self, fragment: &TranscriptFragment) {
        let text = decode_entities(trim_caption(&fragment.text));
        if text.is_empty() {
            return;
        }

        if self.should_break_before(fragment.timestamp, &text) {
            self.flush();
        }

        self.current.push(text);
        self.last_end_time = fragment.timestamp + fragment.duration;
    }

    /// End time of the last fragment that was kept
    pub fn last_end_time(&self) -> f64 {
        self.last_end_time
    }

    /// Close the open paragraph and return every paragraph produced.
    pub fn finish(mut self) -> Vec<String> {
        self.flush();
        self.paragraphs
    }

    fn should_break_before(&self, timestamp: f64, text: &str) -> bool {
        let time_gap = timestamp - self.last_end_time;
        let previous = self.current.last().map(String::as_str).unwrap_or("");

        let is_time_gap = time_gap > self.options.time_gap_threshold;
        let is_new_sentence =
            previous.ends_with('.') && text.starts_with(|c: char| c.is_ascii_uppercase());
        let is_full = self.current.len() >= self.options.max_fragments_per_paragraph;

        is_time_gap || is_new_sentence || is_full
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let paragraph = normalize_text(&self.current.join(" "));
        tracing::trace!(fragments = self.current.len(), "closing paragraph");
        self.paragraphs.push(paragraph);
        self.current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TranscriptFragment> {
        vec![
            TranscriptFragment::new("Hello world.", 0.0, 2.0),
            TranscriptFragment::new("This is a test.", 2.0, 3.0),
            TranscriptFragment::new("Another sentence.", 8.0, 2.0),
        ]
    }

    fn paragraphs() -> FormatOptions {
        FormatOptions::default().paragraphs(true)
    }

    #[test]
    fn test_flat_mode() {
        let text = format_transcript_text(&sample(), &FormatOptions::default());
        assert_eq!(text, "Hello world. This is a test. Another sentence.");
    }

    #[test]
    fn test_flat_mode_output_is_already_normalized() {
        let fragments = vec![
            TranscriptFragment::new("so  what&#39;s   up ?", 0.0, 1.0),
            TranscriptFragment::new("&nbsp;", 1.0, 1.0),
            TranscriptFragment::new("nothing much .", 2.0, 1.0),
        ];
        let text = format_transcript_text(&fragments, &FormatOptions::default());
        assert_eq!(text, "so what's up? nothing much.");
        assert_eq!(normalize_text(&text), text);
    }

    #[test]
    fn test_paragraph_mode_breaks_on_time_gap() {
        let text = format_transcript_text(&sample(), &paragraphs());
        assert!(text.contains("\n\n"));
    }

    #[test]
    fn test_paragraph_mode_sentence_boundary() {
        let text = format_transcript_text(&sample(), &paragraphs());
        assert_eq!(text, "Hello world.\n\nThis is a test.\n\nAnother sentence.");
    }

    #[test]
    fn test_lowercase_continuation_stays_in_paragraph() {
        let fragments = vec![
            TranscriptFragment::new("we went to the store.", 0.0, 1.0),
            TranscriptFragment::new("and then home", 1.0, 1.0),
        ];
        let text = format_transcript_text(&fragments, &paragraphs());
        assert_eq!(text, "we went to the store. and then home");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_transcript_text(&[], &FormatOptions::default()), "");
        assert_eq!(format_transcript_text(&[], &paragraphs()), "");
    }

    #[test]
    fn test_paragraph_cap() {
        let options = paragraphs();
        let words = ["one", "two", "three", "four", "five", "six"];
        let fragments: Vec<_> = words
            .iter()
            .enumerate()
            .map(|(i, word)| TranscriptFragment::new(*word, i as f64, 1.0))
            .collect();
        assert_eq!(fragments.len(), options.max_fragments_per_paragraph + 1);

        let text = format_transcript_text(&fragments, &options);
        assert_eq!(text, "one two three four five\n\nsix");
    }

    #[test]
    fn test_empty_fragment_does_not_move_end_time() {
        let options = paragraphs();
        let mut segmenter = ParagraphSegmenter::new(&options);
        segmenter.push(&TranscriptFragment::new("first", 0.0, 1.0));
        segmenter.push(&TranscriptFragment::new("  &nbsp; ", 1.0, 50.0));
        assert_eq!(segmenter.last_end_time(), 1.0);

        segmenter.push(&TranscriptFragment::new("second", 2.5, 1.0));
        assert_eq!(segmenter.finish(), vec!["first second".to_string()]);
    }

    #[test]
    fn test_last_end_time_is_monotonic_for_sorted_input() {
        let options = paragraphs();
        let fragments = vec![
            TranscriptFragment::new("a", 0.0, 1.5),
            TranscriptFragment::new("b", 1.0, 2.0),
            TranscriptFragment::new("c", 3.0, 0.5),
            TranscriptFragment::new("d", 9.0, 1.0),
        ];
        let mut segmenter = ParagraphSegmenter::new(&options);
        let mut previous = segmenter.last_end_time();
        for fragment in &fragments {
            segmenter.push(fragment);
            assert!(segmenter.last_end_time() >= previous);
            previous = segmenter.last_end_time();
        }
    }

    #[test]
    fn test_leading_gap_does_not_emit_empty_paragraph() {
        let fragments = vec![
            TranscriptFragment::new("Hi", 10.0, 1.0),
            TranscriptFragment::new("there", 11.0, 1.0),
        ];
        let text = format_transcript_text(&fragments, &paragraphs());
        assert_eq!(text, "Hi there");
    }

    #[test]
    fn test_zero_cap_gives_one_fragment_per_paragraph() {
        let options = FormatOptions {
            max_fragments_per_paragraph: 0,
            ..paragraphs()
        };
        let fragments = vec![
            TranscriptFragment::new("Hi", 10.0, 1.0),
            TranscriptFragment::new("there", 11.0, 1.0),
        ];

        let mut segmenter = ParagraphSegmenter::new(&options);
        for fragment in &fragments {
            segmenter.push(fragment);
        }
        let paragraphs = segmenter.finish();
        assert_eq!(paragraphs, vec!["Hi".to_string(), "there".to_string()]);
        assert!(paragraphs.iter().all(|p| !p.is_empty()));

        assert_eq!(format_transcript_text(&fragments, &options), "Hi\n\nthere");
    }

    #[test]
    fn test_byte_order_marks_are_whitespace() {
        let fragments = vec![
            TranscriptFragment::new("a\u{feff}", 0.0, 1.0),
            TranscriptFragment::new("\u{feff}", 1.0, 1.0),
        ];
        assert_eq!(format_transcript_text(&fragments, &FormatOptions::default()), "a");
        assert_eq!(format_transcript_text(&fragments, &paragraphs()), "a");
    }

    #[test]
    fn test_custom_gap_threshold() {
        let options = FormatOptions {
            enable_paragraphs: true,
            time_gap_threshold: 10.0,
            max_fragments_per_paragraph: 5,
        };
        let fragments = vec![
            TranscriptFragment::new("one", 0.0, 1.0),
            TranscriptFragment::new("two", 5.0, 1.0),
            TranscriptFragment::new("three", 20.0, 1.0),
        ];
        let text = format_transcript_text(&fragments, &options);
        assert_eq!(text, "one two\n\nthree");
    }
}
