// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use linkscout::config::settings::Settings;
use linkscout::infrastructure::search::StructuredSearchOptions;
use std::time::Duration;

#[test]
fn bundled_config_file_matches_defaults() {
    let loaded = Settings::new().expect("config/default.toml should load");
    let defaults = Settings::defaults().unwrap();

    assert_eq!(loaded.server.port, defaults.server.port);
    assert_eq!(loaded.search.endpoint, defaults.search.endpoint);
    assert_eq!(loaded.llm.model, defaults.llm.model);
    assert_eq!(
        loaded.suggestions.max_suggestions,
        defaults.suggestions.max_suggestions
    );
    assert_eq!(
        loaded.summarizer.max_concurrency,
        defaults.summarizer.max_concurrency
    );
}

#[test]
fn search_settings_convert_to_query_options() {
    let mut settings = Settings::defaults().unwrap();
    settings.search.results_per_query = 50;
    settings.search.site_search = Some("census.gov".to_string());

    let options = StructuredSearchOptions::from(&settings.search);
    assert_eq!(options.results_per_query, 10);
    assert_eq!(options.start, 1);
    assert_eq!(options.queries_per_topic, 2);
    assert_eq!(options.site_search.as_deref(), Some("census.gov"));
    assert_eq!(options.request_delay, Duration::from_millis(250));
}
