use unicode_normalization::UnicodeNormalization;

/// NFKC-folds fragment text and collapses runs of whitespace.
///
/// Ligatures such as "ﬁ" become plain letters, dash and quote variants map to
/// their ASCII forms so downstream patterns only need to match one spelling.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .nfkc()
        .map(|c| match c {
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_bold_font_name(font_name: &str) -> bool {
    font_name.to_lowercase().contains("bold")
}
