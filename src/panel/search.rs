//! External search links.

use url::Url;

use crate::protocol::{Question, option_letter};

/// Default search engine base.
pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";

/// Builds `"<question> A) <opt> B) <opt> ..."`.
#[must_use]
pub fn search_query(question: &Question) -> String {
    let mut query = question.question.trim().to_string();

    for (index, option) in question.options.iter().enumerate() {
        let Some(letter) = option_letter(index) else {
            break;
        };
        query.push(' ');
        query.push(letter);
        query.push_str(") ");
        query.push_str(option.trim());
    }

    query
}

/// Returns `base?q=<percent-encoded query>`.
#[must_use]
pub fn search_url(base: &Url, question: &Question) -> Url {
    let mut url = base.clone();
    let query = format!("q={}", urlencoding::encode(&search_query(question)));
    url.set_query(Some(&query));
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            question: "What is 2+2?".into(),
            options: vec!["3".into(), "4".into()],
            correct_option: 1,
            reasoning: Some("math".into()),
            confidence: Some(95.0),
            model_responses: None,
        }
    }

    #[test]
    fn test_query() {
        assert_eq!(search_query(&question()), "What is 2+2? A) 3 B) 4");
    }

    #[test]
    fn test_url_is_encoded() {
        let base = Url::parse(DEFAULT_SEARCH_URL).expect("url");
        assert_eq!(
            search_url(&base, &question()).as_str(),
            "https://www.google.com/search?q=What%20is%202%2B2%3F%20A%29%203%20B%29%204"
        );
    }

    #[test]
    fn test_query_without_options() {
        let mut q = question();
        q.options.clear();
        assert_eq!(search_query(&q), "What is 2+2?");
    }
}
