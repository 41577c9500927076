use serde::Serialize;
use std::fmt;

/// The one-word recommendation extracted from the model's HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Buy,
    Avoid,
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Buy => write!(f, "Buy"),
            Verdict::Avoid => write!(f, "Avoid"),
            Verdict::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Strip tags, leaving text with a space where each tag stood
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

/// Find the word after "Recommendation:" and map it to a verdict
pub fn parse_verdict(html: &str) -> Verdict {
    let text = strip_tags(html).to_lowercase();
    let Some(index) = text.find("recommendation:") else {
        return Verdict::Unknown;
    };

    let word: String = text[index + "recommendation:".len()..]
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect();

    match word.as_str() {
        "buy" => Verdict::Buy,
        "avoid" => Verdict::Avoid,
        _ => Verdict::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict() {
        assert_eq!(parse_verdict("<p><strong>Recommendation:</strong> Buy</p>"), Verdict::Buy);
        assert_eq!(parse_verdict("<p><strong>Recommendation:</strong>AVOID.</p>"), Verdict::Avoid);
        assert_eq!(parse_verdict("<p>Recommendation: <em>buy</em></p>"), Verdict::Buy);
        assert_eq!(parse_verdict("<p><strong>Recommendation:</strong> Hold</p>"), Verdict::Unknown);
        assert_eq!(parse_verdict("<h2>Bitcoin</h2>"), Verdict::Unknown);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<h2>Bit</h2>coin").trim(), "Bit coin");
    }
}
