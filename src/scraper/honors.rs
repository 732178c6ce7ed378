use ::scraper::{Html, Selector};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::model::Honors;
use crate::scraper::comments;

static PRO_BOWL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)\s*x\s*pro[\s-]?bowl").expect("valid regex"));
static ALL_PRO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)\s*x\s*all[\s-]?pro").expect("valid regex"));

/// Locate the block of page text that lists a player's honors.
///
/// The recognition section ships as a comment; the summary panel (`div#meta`)
/// carries the same badges and is used when no such comment exists.
pub(crate) fn recognition_text(document: &Html) -> Result<Option<String>> {
    if let Some(comment) = comments(document).find(|c| c.contains("Recognition")) {
        return Ok(Some(comment.to_string()));
    }

    let meta_selector = Selector::parse("div#meta")?;
    Ok(document
        .select(&meta_selector)
        .next()
        .map(|meta| meta.text().collect::<Vec<_>>().join(" ")))
}

/// Count honors in recognition text. Absent honors are zero, never unknown.
pub fn parse_honors(text: &str) -> Honors {
    let count = |re: &Regex| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let lower = text.to_lowercase();

    Honors {
        pro_bowls: count(&PRO_BOWL),
        all_pros: count(&ALL_PRO),
        opoy: lower.contains("opoy") || lower.contains("offensive player of the year"),
    }
}

/// Count honors from a draft-table awards summary such as `PB AP-1 OPoY PB`.
pub fn parse_awards_summary(awards: &str) -> Honors {
    let count = |needle: &str| awards.matches(needle).count() as u32;
    Honors {
        pro_bowls: count("PB"),
        all_pros: count("AP-1") + count("AP-2"),
        opoy: awards.contains("OPoY"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_without_opoy() {
        let honors = parse_honors("Recognition: 3x Pro Bowl, 2x All-Pro, 2015 PFWA All-Rookie");
        assert_eq!(
            honors,
            Honors {
                pro_bowls: 3,
                all_pros: 2,
                opoy: false
            }
        );
    }

    #[test]
    fn test_case_insensitive_and_opoy() {
        let honors = parse_honors("5X PRO BOWL 1x all-pro. 2021 Offensive Player of the Year");
        assert_eq!(honors.pro_bowls, 5);
        assert_eq!(honors.all_pros, 1);
        assert!(honors.opoy);

        assert!(parse_honors("AP OPOY 2021").opoy);
    }

    #[test]
    fn test_year_is_not_a_count() {
        let honors = parse_honors("2016 Pro Bowl");
        assert_eq!(honors.pro_bowls, 0);
    }

    #[test]
    fn test_absent_honors_default_to_zero() {
        assert_eq!(parse_honors(""), Honors::default());
    }

    #[test]
    fn test_recognition_prefers_comment_then_meta() {
        let with_comment = Html::parse_document(
            r#"<div id="meta">7x Pro Bowl</div><!-- <h2>Recognition</h2> 2x Pro Bowl -->"#,
        );
        let text = recognition_text(&with_comment).unwrap().unwrap();
        assert_eq!(parse_honors(&text).pro_bowls, 2);

        let meta_only = Html::parse_document(
            r#"<div id="meta"><ul id="bling"><li>4x Pro Bowl</li><li>1x All-Pro</li></ul></div>"#,
        );
        let text = recognition_text(&meta_only).unwrap().unwrap();
        assert_eq!(parse_honors(&text).pro_bowls, 4);
        assert_eq!(parse_honors(&text).all_pros, 1);

        let neither = Html::parse_document("<p>plain</p>");
        assert_eq!(recognition_text(&neither).unwrap(), None);
    }

    #[test]
    fn test_awards_summary() {
        let honors = parse_awards_summary("PB AP-1 PB AP-2 OPoY");
        assert_eq!(honors.pro_bowls, 2);
        assert_eq!(honors.all_pros, 2);
        assert!(honors.opoy);
    }
}
