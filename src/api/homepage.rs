use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{DEFAULT_FEATURED_LIMIT, no_such_method, reply};
use crate::db::models::{CaravanRoute, FeatureCard, HeroSection, Post};
use crate::error::KaptanError;
use crate::router::KaptanState;

#[derive(Debug, Serialize)]
struct HomepageData {
    hero: Option<HeroSection>,
    features: Vec<FeatureCard>,
    posts: Vec<Post>,
    routes: Vec<CaravanRoute>,
    settings: BTreeMap<String, String>,
}

async fn load(state: &KaptanState) -> Result<HomepageData, KaptanError> {
    let store = &state.store;
    let hero_sections = store.hero_sections();
    let feature_cards = store.feature_cards();
    let posts = store.posts();
    let routes = store.routes();
    let settings = store.settings();

    let (hero, features, posts, routes, settings) = tokio::try_join!(
        hero_sections.active(),
        feature_cards.list(true),
        posts.featured(DEFAULT_FEATURED_LIMIT),
        routes.featured(DEFAULT_FEATURED_LIMIT),
        settings.all(),
    )?;

    let settings = settings
        .into_iter()
        .filter_map(|s| s.value.map(|v| (s.key, v)))
        .collect();

    Ok(HomepageData {
        hero,
        features,
        posts,
        routes,
        settings,
    })
}

pub(super) async fn call(state: &KaptanState, method: &str) -> Result<Value, KaptanError> {
    match method {
        "getData" => reply(load(state).await?),
        _ => Err(no_such_method()),
    }
}
