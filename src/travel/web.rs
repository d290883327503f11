//! 模拟网页检索：关键词匹配的固定语料
//!
//! 查询中的任一单词命中某个语料键的单词即视为相关；无命中时返回一条通用结果。

use rand::Rng;

use crate::travel::models::WebSearchResult;

struct MockPage {
    title: &'static str,
    url: &'static str,
    snippet: &'static str,
}

const CORPUS: &[(&str, &[MockPage])] = &[
    (
        "weather Los Angeles",
        &[
            MockPage {
                title: "Los Angeles Weather Forecast",
                url: "weather.com/la",
                snippet: "Sunny, 24°C with 10% chance of rain. Humidity 55%. Perfect weather for outdoor activities.",
            },
            MockPage {
                title: "LA Weather This Week",
                url: "accuweather.com/la",
                snippet: "Expect clear skies throughout the week with temperatures ranging from 20-26°C.",
            },
        ],
    ),
    (
        "things to do Los Angeles",
        &[
            MockPage {
                title: "Top 10 LA Attractions",
                url: "tripadvisor.com/la",
                snippet: "Visit Hollywood Sign, Getty Center, Universal Studios, and Santa Monica Pier.",
            },
            MockPage {
                title: "Best Activities in LA",
                url: "visitcalifornia.com/la",
                snippet: "Explore museums, beaches, hiking trails, and world-class dining options.",
            },
        ],
    ),
    (
        "flights JFK to LAX",
        &[MockPage {
            title: "Compare Flights JFK-LAX",
            url: "kayak.com/flights",
            snippet: "Find cheap flights from New York JFK to Los Angeles LAX. Prices starting at $275.",
        }],
    ),
    (
        "Miami travel tips",
        &[MockPage {
            title: "Best Time to Visit Miami",
            url: "miamivisit.com/best-time",
            snippet: "The dry season (November to April) is the most pleasant time to visit Miami.",
        }],
    ),
];

/// 过于常见、不参与匹配的词
const STOP_WORDS: &[&str] = &["to", "do", "the", "a", "in", "of", "for"];

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// 执行模拟检索；max_results 需事先校验在 1..=10
pub fn mock_web_search(query: &str, max_results: u32) -> Vec<WebSearchResult> {
    let max = max_results as usize;
    let query_words = words(query);
    let mut rng = rand::thread_rng();

    let mut results: Vec<WebSearchResult> = CORPUS
        .iter()
        .filter(|(key, _)| words(key).iter().any(|k| query_words.contains(k)))
        .flat_map(|(_, pages)| pages.iter().take(max))
        .map(|page| WebSearchResult {
            title: page.title.to_string(),
            url: page.url.to_string(),
            snippet: page.snippet.to_string(),
            relevance_score: rng.gen_range(0.7..0.95),
        })
        .collect();

    if results.is_empty() {
        results.push(WebSearchResult {
            title: format!("Results for: {query}"),
            url: "search.com/results".to_string(),
            snippet: format!("Information about {query} from various sources."),
            relevance_score: 0.6,
        });
    }

    results.truncate(max);
    results
}
