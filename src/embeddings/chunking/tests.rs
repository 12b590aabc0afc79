use super::*;

#[test]
fn splits_on_terminal_punctuation() {
    let sentences = split_sentences("First sentence. Second one! Third? Done.")
        .expect("split_sentences should succeed");

    assert_eq!(
        sentences,
        vec!["First sentence.", "Second one!", "Third?", "Done."]
    );
}

#[test]
fn splits_on_newline_runs() {
    let sentences =
        split_sentences("heading without punctuation\n\nbody line").expect("can split");

    assert_eq!(sentences, vec!["heading without punctuation", "body line"]);
}

#[test]
fn empty_input_yields_no_sentences() {
    assert!(
        split_sentences("").expect("can split empty input").is_empty()
    );
    assert!(
        split_sentences("  \n\n  ")
            .expect("can split whitespace input")
            .is_empty()
    );
}

#[test]
fn empty_input_yields_no_chunks() {
    let chunks = chunk_text("", &ChunkingConfig::default()).expect("can chunk empty input");
    assert!(chunks.is_empty());
}

#[test]
fn small_text_is_one_chunk() {
    let chunks = chunk_text("One sentence. Another one.", &ChunkingConfig::default())
        .expect("can chunk");

    assert_eq!(chunks, vec!["One sentence. Another one."]);
}

// Pins the flush timing to the character: the buffer is flushed before the
// sentence that would overflow it, so each two-character sentence fits alone
// under max_chars = 3 but no two fit together.
#[test]
fn flush_happens_before_overflowing_sentence() {
    let config = ChunkingConfig {
        max_chars: 3,
        overlap_sentences: 0,
    };

    let chunks = chunk_text("A. B. C.", &config).expect("can chunk");

    assert_eq!(chunks, vec!["A.", "B.", "C."]);
}

#[test]
fn oversized_sentence_is_never_split() {
    let config = ChunkingConfig {
        max_chars: 10,
        overlap_sentences: 0,
    };
    let long = "This single sentence is far longer than the configured cap.";
    let text = format!("Short. {} Tail.", long);

    let chunks = chunk_text(&text, &config).expect("can chunk");

    assert_eq!(chunks, vec!["Short.", long, "Tail."]);
    // The oversized chunk exceeds max_chars; that is the documented overflow
    assert!(chunks[1].chars().count() > config.max_chars);
}

#[test]
fn leading_oversized_sentence_does_not_emit_empty_chunk() {
    let config = ChunkingConfig {
        max_chars: 5,
        overlap_sentences: 1,
    };

    let chunks = chunk_text("A very long opening sentence. Tail.", &config).expect("can chunk");

    assert!(chunks.iter().all(|c| !c.is_empty()));
    assert_eq!(chunks[0], "A very long opening sentence.");
}

#[test]
fn overlap_repeats_trailing_sentences() {
    let config = ChunkingConfig {
        max_chars: 30,
        overlap_sentences: 1,
    };

    let chunks = chunk_text(
        "First sentence here. Second sentence here. Third sentence here.",
        &config,
    )
    .expect("can chunk");

    assert!(chunks.len() > 1);
    for pair in chunks.windows(2) {
        let last_sentence = pair[0]
            .rsplit_once(". ")
            .map_or(pair[0].as_str(), |(_, tail)| tail);
        assert!(
            pair[1].starts_with(last_sentence),
            "chunk {:?} should start with the previous chunk's last sentence {:?}",
            pair[1],
            last_sentence
        );
    }
}

#[test]
fn zero_overlap_shares_no_sentences() {
    let config = ChunkingConfig {
        max_chars: 25,
        overlap_sentences: 0,
    };
    let text = "Alpha sentence one. Beta sentence two. Gamma sentence three.";

    let chunks = chunk_text(text, &config).expect("can chunk");

    assert_eq!(
        chunks,
        vec![
            "Alpha sentence one.",
            "Beta sentence two.",
            "Gamma sentence three."
        ]
    );
}

// Ignoring overlap duplication, concatenating the chunks reconstructs the
// original sentence sequence in order.
#[test]
fn chunking_preserves_sentence_sequence() {
    let text = "One two three. Four five six. Seven eight nine. Ten eleven twelve. \
                Thirteen fourteen fifteen. Sixteen seventeen eighteen.";
    let config = ChunkingConfig {
        max_chars: 40,
        overlap_sentences: 0,
    };

    let sentences = split_sentences(text).expect("can split");
    let chunks = chunk_text(text, &config).expect("can chunk");

    let reconstructed = chunks.join(" ");
    assert_eq!(reconstructed, sentences.join(" "));
}

#[test]
fn soft_cap_holds_for_multi_sentence_chunks() {
    let text = "Aa bb cc. Dd ee ff. Gg hh ii. Jj kk ll. Mm nn oo.";
    let config = ChunkingConfig {
        max_chars: 25,
        overlap_sentences: 0,
    };

    let chunks = chunk_text(text, &config).expect("can chunk");

    for chunk in &chunks {
        let sentence_chars: usize = split_sentences(chunk)
            .expect("can split chunk")
            .iter()
            .map(|s| s.chars().count())
            .sum();
        // The cap applies to sentence characters; joining spaces are the
        // allowed overflow
        assert!(sentence_chars <= config.max_chars);
    }
}

#[test]
fn identical_input_yields_identical_output() {
    let text = "Deterministic chunking. Same input. Same output. Every time.";
    let config = ChunkingConfig {
        max_chars: 30,
        overlap_sentences: 1,
    };

    let first = chunk_text(text, &config).expect("can chunk");
    let second = chunk_text(text, &config).expect("can chunk");

    assert_eq!(first, second);
}
