//! User engagement and news content statistics.

use super::{contain, Block, ViewReport};
use crate::charts::{bar_chart, donut_chart, line_chart, word_cloud, Tint};
use crate::config::Config;
use crate::error::{MindError, Result};
use crate::stats::{impression_stats, title_length_distribution, value_counts, word_frequencies, STOPWORDS};
use crate::table::{load_behaviors, load_news, BehaviorRecord, NewsRecord, Preview};

const VIEW: &str = "behavior_news";

const INTRO: &str = "User behavior and news content side by side: which articles get clicked, \
how the catalogue is spread over categories, and what the headlines talk about.";

fn loaded<T>(table: &Result<Vec<T>>) -> Result<&[T]> {
    table.as_ref().map(|v| v.as_slice()).map_err(MindError::for_report)
}

fn as_bars(counts: &[(String, usize)], n: usize) -> Vec<(String, f64)> {
    counts.iter().take(n).map(|(k, c)| (k.clone(), *c as f64)).collect()
}

pub fn render(cfg: &Config) -> ViewReport {
    let behaviors: Result<Vec<BehaviorRecord>> = load_behaviors(&cfg.behaviors_csv());
    let news: Result<Vec<NewsRecord>> = load_news(&cfg.news_csv());
    let mut report = ViewReport::new("Behavior-News Analysis", INTRO);

    report.push(contain(VIEW, "User Click History", || {
        let rows = loaded(&behaviors)?;
        let clicks = value_counts(rows.iter().flat_map(|b| b.history.iter()));
        let title = format!("Top {} Clicked Articles", cfg.top_clicked);
        Ok(vec![
            Block::Chart(bar_chart(
                "top_clicked",
                &title,
                "Click Count",
                &as_bars(&clicks, cfg.top_clicked),
                Tint::Sky,
            )?),
            Block::Text(
                "The most clicked articles across all user histories show what content is in \
                 demand and anchor user interest profiles."
                    .to_string(),
            ),
        ])
    }));

    report.push(contain(VIEW, "Impression Click-Through", || {
        let stats = impression_stats(loaded(&behaviors)?);
        let table = Preview {
            columns: vec!["Metric".to_string(), "Value".to_string()],
            rows: vec![
                vec!["Impressions".to_string(), stats.impressions.to_string()],
                vec!["Articles shown".to_string(), stats.shown.to_string()],
                vec!["Articles clicked".to_string(), stats.clicked.to_string()],
                vec!["Unlabeled".to_string(), stats.unlabeled.to_string()],
                vec!["Click-through rate".to_string(), format!("{:.4}", stats.click_through_rate)],
                vec!["Mean history length".to_string(), format!("{:.2}", stats.mean_history_len)],
            ],
        };
        Ok(vec![Block::Table(table)])
    }));

    report.push(contain(VIEW, "News Categories", || {
        let rows = loaded(&news)?;
        let counts = value_counts(rows.iter().map(|n| n.category.as_str()));
        Ok(vec![
            Block::Chart(donut_chart(
                "categories",
                "Distribution of News Categories",
                &as_bars(&counts, counts.len()),
            )?),
            Block::Text(
                "The category mix shows where the catalogue is deep and which topics are \
                 underrepresented."
                    .to_string(),
            ),
        ])
    }));

    report.push(contain(VIEW, "Top Subcategories", || {
        let rows = loaded(&news)?;
        let counts = value_counts(rows.iter().map(|n| n.subcategory.as_str()));
        let title = format!("Top {} News Subcategories", cfg.top_subcategories);
        Ok(vec![Block::Chart(bar_chart(
            "subcategories",
            &title,
            "Count",
            &as_bars(&counts, cfg.top_subcategories),
            Tint::Salmon,
        )?)])
    }));

    report.push(contain(VIEW, "Length of News Titles", || {
        let dist = title_length_distribution(loaded(&news)?);
        let points: Vec<(f64, f64)> = dist.iter().map(|&(len, c)| (len as f64, c as f64)).collect();
        Ok(vec![Block::Chart(line_chart(
            "title_length",
            "Title Length Distribution",
            "Title Length (characters)",
            "Articles",
            &points,
        )?)])
    }));

    report.push(contain(VIEW, "Word Cloud for Titles", || {
        let rows = loaded(&news)?;
        let freq = word_frequencies(rows.iter().map(|n| n.title.as_str()), STOPWORDS);
        let top: Vec<(String, usize)> = freq.into_iter().take(cfg.wordcloud_words).collect();
        Ok(vec![Block::Chart(word_cloud("wordcloud_titles", "Word Cloud for Titles", &top)?)])
    }));

    report.push(contain(VIEW, "Word Cloud for Abstracts", || {
        let rows = loaded(&news)?;
        let freq = word_frequencies(rows.iter().filter_map(|n| n.abstract_text.as_deref()), STOPWORDS);
        let top: Vec<(String, usize)> = freq.into_iter().take(cfg.wordcloud_words).collect();
        Ok(vec![Block::Chart(word_cloud("wordcloud_abstracts", "Word Cloud for Abstracts", &top)?)])
    }));

    report
}
