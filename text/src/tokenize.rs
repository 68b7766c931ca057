use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Case-fold a word and strip its combining diacritical marks, so that "Café", "CAFE" and "cafe"
/// all normalise to "cafe".
pub fn normalise(word: &str) -> String {
    let lowered = word.to_lowercase();
    lowered.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

fn is_word_char(c: char) -> bool { c.is_alphanumeric() || c == '_' || is_combining_mark(c) }

fn is_punctuation(c: char) -> bool {
    matches!(c, '¡' | '§' | '«' | '¶' | '·' | '»' | '¿' | '\u{2010}'..='\u{2027}' | '\u{2030}'..='\u{205E}' | '\u{3001}'..='\u{3003}' | '\u{3008}'..='\u{3011}')
}

/// Currency, math and other symbol characters. Each one is a token of its own.
fn is_symbol(c: char) -> bool {
    if c.is_ascii() {
        return matches!(c, '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~');
    }
    !(is_word_char(c) || c.is_whitespace() || c.is_control() || is_punctuation(c))
}

/// Split text into tokens and normalise each of them. A token is either a maximal run of word
/// characters or a single symbol character. Whitespace and punctuation only ever act as boundaries.
pub fn tokenise(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        if is_word_char(c) {
            start.get_or_insert(i);
            continue;
        }
        if let Some(from) = start.take() {
            tokens.push(normalise(&text[from..i]));
        }
        if is_symbol(c) {
            tokens.push(normalise(&text[i..i + c.len_utf8()]));
        }
    }
    if let Some(from) = start {
        tokens.push(normalise(&text[from..]));
    }
    tokens
}
