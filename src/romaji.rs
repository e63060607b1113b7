//! Hepburn romanization of kana. Anything that is not kana passes through.

fn katakana_to_hiragana(c: char) -> char {
    match c {
        'ァ'..='ヶ' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
        _ => c,
    }
}

#[rustfmt::skip]
fn digraph(pair: &str) -> Option<&'static str> {
    Some(match pair {
        "きゃ" => "kya", "きゅ" => "kyu", "きょ" => "kyo",
        "ぎゃ" => "gya", "ぎゅ" => "gyu", "ぎょ" => "gyo",
        "しゃ" => "sha", "しゅ" => "shu", "しょ" => "sho", "しぇ" => "she",
        "じゃ" => "ja", "じゅ" => "ju", "じょ" => "jo", "じぇ" => "je",
        "ちゃ" => "cha", "ちゅ" => "chu", "ちょ" => "cho", "ちぇ" => "che",
        "ぢゃ" => "ja", "ぢゅ" => "ju", "ぢょ" => "jo",
        "にゃ" => "nya", "にゅ" => "nyu", "にょ" => "nyo",
        "ひゃ" => "hya", "ひゅ" => "hyu", "ひょ" => "hyo",
        "びゃ" => "bya", "びゅ" => "byu", "びょ" => "byo",
        "ぴゃ" => "pya", "ぴゅ" => "pyu", "ぴょ" => "pyo",
        "みゃ" => "mya", "みゅ" => "myu", "みょ" => "myo",
        "りゃ" => "rya", "りゅ" => "ryu", "りょ" => "ryo",
        "ふぁ" => "fa", "ふぃ" => "fi", "ふぇ" => "fe", "ふぉ" => "fo",
        "てぃ" => "ti", "でぃ" => "di", "とぅ" => "tu", "どぅ" => "du",
        "うぃ" => "wi", "うぇ" => "we", "うぉ" => "wo",
        "ゔぁ" => "va", "ゔぃ" => "vi", "ゔぇ" => "ve", "ゔぉ" => "vo",
        "つぁ" => "tsa", "つぇ" => "tse", "つぉ" => "tso",
        _ => return None,
    })
}

#[rustfmt::skip]
fn monograph(c: char) -> Option<&'static str> {
    Some(match c {
        'あ' => "a", 'い' => "i", 'う' => "u", 'え' => "e", 'お' => "o",
        'か' => "ka", 'き' => "ki", 'く' => "ku", 'け' => "ke", 'こ' => "ko",
        'が' => "ga", 'ぎ' => "gi", 'ぐ' => "gu", 'げ' => "ge", 'ご' => "go",
        'さ' => "sa", 'し' => "shi", 'す' => "su", 'せ' => "se", 'そ' => "so",
        'ざ' => "za", 'じ' => "ji", 'ず' => "zu", 'ぜ' => "ze", 'ぞ' => "zo",
        'た' => "ta", 'ち' => "chi", 'つ' => "tsu", 'て' => "te", 'と' => "to",
        'だ' => "da", 'ぢ' => "ji", 'づ' => "zu", 'で' => "de", 'ど' => "do",
        'な' => "na", 'に' => "ni", 'ぬ' => "nu", 'ね' => "ne", 'の' => "no",
        'は' => "ha", 'ひ' => "hi", 'ふ' => "fu", 'へ' => "he", 'ほ' => "ho",
        'ば' => "ba", 'び' => "bi", 'ぶ' => "bu", 'べ' => "be", 'ぼ' => "bo",
        'ぱ' => "pa", 'ぴ' => "pi", 'ぷ' => "pu", 'ぺ' => "pe", 'ぽ' => "po",
        'ま' => "ma", 'み' => "mi", 'む' => "mu", 'め' => "me", 'も' => "mo",
        'や' => "ya", 'ゆ' => "yu", 'よ' => "yo",
        'ら' => "ra", 'り' => "ri", 'る' => "ru", 'れ' => "re", 'ろ' => "ro",
        'わ' => "wa", 'ゐ' => "i", 'ゑ' => "e", 'を' => "o",
        'ゔ' => "vu",
        'ぁ' => "a", 'ぃ' => "i", 'ぅ' => "u", 'ぇ' => "e", 'ぉ' => "o",
        'ゃ' => "ya", 'ゅ' => "yu", 'ょ' => "yo", 'ゎ' => "wa",
        'ゕ' => "ka", 'ゖ' => "ke",
        '、' => ",", '。' => ".", '「' => "\"", '」' => "\"", '・' => " ",
        '　' => " ", '！' => "!", '？' => "?",
        _ => return None,
    })
}

/// Romanize one kana syllable at the start of `chars`, returning the
/// romaji and how many chars were consumed.
fn syllable(chars: &[char]) -> Option<(&'static str, usize)> {
    if chars.len() >= 2 {
        let pair: String = chars[..2].iter().collect();
        if let Some(romaji) = digraph(&pair) {
            return Some((romaji, 2));
        }
    }
    monograph(chars[0]).map(|romaji| (romaji, 1))
}

pub fn romanize(text: &str) -> String {
    let chars: Vec<char> = text.chars().map(katakana_to_hiragana).collect();
    let mut out = String::with_capacity(text.len() * 2);
    let mut geminate = false;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            'っ' => {
                geminate = true;
                i += 1;
                continue;
            }
            'ん' => {
                out.push('n');
                let next = chars
                    .get(i + 1..)
                    .filter(|rest| !rest.is_empty())
                    .and_then(syllable);
                if next.is_some_and(|(romaji, _)| romaji.starts_with(['a', 'i', 'u', 'e', 'o', 'y'])) {
                    out.push('\'');
                }
                i += 1;
                continue;
            }
            'ー' => {
                if let Some(vowel) = out.chars().last().filter(|c| "aiueo".contains(*c)) {
                    out.push(vowel);
                }
                i += 1;
                continue;
            }
            _ => {}
        }

        match syllable(&chars[i..]) {
            Some((romaji, used)) => {
                if geminate {
                    if romaji.starts_with("ch") {
                        out.push('t');
                    } else if let Some(first) = romaji.chars().next().filter(|c| !"aiueo".contains(*c)) {
                        out.push(first);
                    }
                }
                out.push_str(romaji);
                i += used;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
        geminate = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_words() {
        assert_eq!(romanize("さくら"), "sakura");
        assert_eq!(romanize("しんぶん"), "shinbun");
        assert_eq!(romanize("とうきょう"), "toukyou");
    }

    #[test]
    fn test_sokuon_and_n_apostrophe() {
        assert_eq!(romanize("きって"), "kitte");
        assert_eq!(romanize("まっちゃ"), "matcha");
        assert_eq!(romanize("きんえん"), "kin'en");
        assert_eq!(romanize("こんや"), "kon'ya");
    }

    #[test]
    fn test_katakana_and_long_vowel() {
        assert_eq!(romanize("カウボーイ"), "kaubooi");
        assert_eq!(romanize("パーティー"), "paatii");
        assert_eq!(romanize("ファン"), "fan");
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(romanize("ONE PIECE ワンピース"), "ONE PIECE wanpiisu");
        assert_eq!(romanize("漢字"), "漢字");
    }
}
