//! Fuzz target for the message tokenizer
//!
//! # Invariants
//!
//! - NEVER panic on any string
//! - Token sources concatenate back to the input
//! - No empty tokens and no adjacent plain tokens
//! - Code text is a slice of its own token source

#![no_main]

use chatwho_core::markup::{tokenize_with_source, Span};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|content: &str| {
    let tokens = tokenize_with_source(content);

    let joined: String = tokens.iter().map(|token| token.source).collect();
    assert_eq!(joined, content);

    for pair in tokens.windows(2) {
        assert!(
            !(matches!(pair[0].span, Span::Plain(_)) && matches!(pair[1].span, Span::Plain(_))),
            "adjacent plain tokens: {pair:?}"
        );
    }

    for token in &tokens {
        assert!(!token.source.is_empty());
        if token.span.is_code() {
            assert!(token.source.contains(token.span.text()));
            assert!(token.source.starts_with('`') && token.source.ends_with('`'));
        } else {
            assert_eq!(token.span.text(), token.source);
        }
    }
});
