//! Generic Devanagari-to-Latin phonetic fallback.
//!
//! Used for words that miss the lexicon. The goal is a readable, deterministic
//! romanization, not a linguistic authority: canonical spellings belong in the
//! lexicon, which is consulted first.

const CANDRABINDU: char = '\u{0901}';
const ANUSVARA: char = '\u{0902}';
const VISARGA: char = '\u{0903}';
const NUKTA: char = '\u{093C}';
const AVAGRAHA: char = '\u{093D}';
const VIRAMA: char = '\u{094D}';
const OM: char = '\u{0950}';
const DANDA: char = '\u{0964}';
const DOUBLE_DANDA: char = '\u{0965}';

/// Transliterate a run of Devanagari text into lower-case Latin script.
///
/// Total function: characters without a mapping pass through unchanged, so no
/// input can make this fail.
pub fn transliterate(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(base) = consonant(c) {
            let mut base = base;
            // Fold a decomposed nukta into its precomposed consonant.
            if chars.get(i + 1) == Some(&NUKTA) {
                if let Some(with_nukta) = nukta_form(c) {
                    base = with_nukta;
                }
                i += 1;
            }
            out.push_str(base);

            let next = chars.get(i + 1).copied();
            if next == Some(VIRAMA) {
                // Conjunct: the virama kills the inherent vowel.
                i += 2;
                continue;
            }
            if let Some(v) = next.and_then(matra) {
                out.push_str(v);
                i += 2;
                continue;
            }
            // Inherent vowel is kept between letters and dropped word-finally.
            if next.map_or(false, keeps_inherent_vowel) {
                out.push('a');
            }
            i += 1;
            continue;
        }

        if let Some(v) = vowel(c) {
            out.push_str(v);
            i += 1;
            continue;
        }

        if let Some(v) = matra(c) {
            // Orphaned vowel sign (malformed input): emit its value anyway.
            out.push_str(v);
            i += 1;
            continue;
        }

        if ('\u{0966}'..='\u{096F}').contains(&c) {
            let n = (c as u32) - 0x0966;
            out.push(char::from_digit(n, 10).unwrap_or('0'));
            i += 1;
            continue;
        }

        match c {
            ANUSVARA | CANDRABINDU => out.push('n'),
            VISARGA => out.push('h'),
            VIRAMA | NUKTA | AVAGRAHA => {}
            DANDA | DOUBLE_DANDA => out.push('.'),
            OM => out.push_str("om"),
            other => out.push(other),
        }
        i += 1;
    }

    out
}

/// Whether a consonant keeps its inherent 'a' when followed by `next`.
fn keeps_inherent_vowel(next: char) -> bool {
    consonant(next).is_some()
        || vowel(next).is_some()
        || matches!(next, ANUSVARA | CANDRABINDU | VISARGA)
        || next.is_alphanumeric()
}

fn consonant(c: char) -> Option<&'static str> {
    Some(match c {
        'क' => "k",
        'ख' => "kh",
        'ग' => "g",
        'घ' => "gh",
        'ङ' => "n",
        'च' => "ch",
        'छ' => "chh",
        'ज' => "j",
        'झ' => "jh",
        'ञ' => "n",
        'ट' => "t",
        'ठ' => "th",
        'ड' => "d",
        'ढ' => "dh",
        'ण' => "n",
        'त' => "t",
        'थ' => "th",
        'द' => "d",
        'ध' => "dh",
        'न' => "n",
        'प' => "p",
        'फ' => "ph",
        'ब' => "b",
        'भ' => "bh",
        'म' => "m",
        'य' => "y",
        'र' => "r",
        'ल' => "l",
        'ळ' => "l",
        'व' => "v",
        'श' => "sh",
        'ष' => "sh",
        'स' => "s",
        'ह' => "h",
        '\u{0958}' => "q",  // क़
        '\u{0959}' => "kh", // ख़
        '\u{095A}' => "g",  // ग़
        '\u{095B}' => "z",  // ज़
        '\u{095C}' => "r",  // ड़
        '\u{095D}' => "rh", // ढ़
        '\u{095E}' => "f",  // फ़
        '\u{095F}' => "y",  // य़
        _ => return None,
    })
}

/// Precomposed form of consonant + nukta, for decomposed input.
fn nukta_form(c: char) -> Option<&'static str> {
    Some(match c {
        'क' => "q",
        'ख' => "kh",
        'ग' => "g",
        'ज' => "z",
        'ड' => "r",
        'ढ' => "rh",
        'फ' => "f",
        'य' => "y",
        _ => return None,
    })
}

fn vowel(c: char) -> Option<&'static str> {
    Some(match c {
        'अ' => "a",
        'आ' => "aa",
        'इ' => "i",
        'ई' => "ee",
        'उ' => "u",
        'ऊ' => "oo",
        'ऋ' => "ri",
        'ऍ' => "e",
        'ऎ' => "e",
        'ए' => "e",
        'ऐ' => "ai",
        'ऑ' => "o",
        'ऒ' => "o",
        'ओ' => "o",
        'औ' => "au",
        _ => return None,
    })
}

fn matra(c: char) -> Option<&'static str> {
    Some(match c {
        '\u{093E}' => "aa",
        '\u{093F}' => "i",
        '\u{0940}' => "ee",
        '\u{0941}' => "u",
        '\u{0942}' => "oo",
        '\u{0943}' => "ri",
        '\u{0945}' => "a",
        '\u{0946}' => "e",
        '\u{0947}' => "e",
        '\u{0948}' => "ai",
        '\u{0949}' => "o",
        '\u{094A}' => "o",
        '\u{094B}' => "o",
        '\u{094C}' => "au",
        _ => return None,
    })
}
