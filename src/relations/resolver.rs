use super::{MediaKind, Platform, Relations};
use crate::providers::animeapi::AnimeApiRelations;
use crate::providers::kitsu::KitsuMediaType;
use crate::providers::simkl::{SimklIdType, SimklMediaType, SimklTitle};
use crate::providers::trakt::{TraktIdType, TraktMediaType, TraktSearchHit};
use crate::providers::{Providers, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

/// The lookups [`resolve`] needs. Implemented by [`Providers`]; tests use
/// in-memory fakes.
#[async_trait]
pub trait RelationSource: Send + Sync {
    async fn animeapi(&self, platform: Platform, id: &str) -> Result<AnimeApiRelations>;

    /// SIMKL cross-reference, returning the full record of the first match.
    async fn simkl(
        &self,
        id_type: SimklIdType,
        id: &str,
        kind: MediaKind,
    ) -> Result<Option<SimklTitle>>;

    async fn trakt(
        &self,
        id_type: TraktIdType,
        id: &str,
        kind: TraktMediaType,
    ) -> Result<Option<TraktSearchHit>>;

    async fn kitsu_slug(&self, slug: &str) -> Result<String>;
}

#[async_trait]
impl RelationSource for Providers {
    async fn animeapi(&self, platform: Platform, id: &str) -> Result<AnimeApiRelations> {
        self.animeapi.relations(platform.slug(), id).await
    }

    async fn simkl(
        &self,
        id_type: SimklIdType,
        id: &str,
        kind: MediaKind,
    ) -> Result<Option<SimklTitle>> {
        let requested = match kind {
            MediaKind::Anime => SimklMediaType::Anime,
            MediaKind::Show => SimklMediaType::Tv,
            MediaKind::Movie => SimklMediaType::Movie,
        };
        let hits = self.simkl.search_by_id(id_type, id, requested).await?;
        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };
        let Some(simkl_id) = hit.simkl_id() else {
            return Ok(Some(hit));
        };

        // search results carry only a few ids; the title record has them all
        let media_type = hit
            .kind
            .as_deref()
            .and_then(|k| k.parse().ok())
            .unwrap_or(requested);
        match self.simkl.title(&simkl_id, media_type).await {
            Ok(full) => Ok(Some(full)),
            Err(e) => {
                warn!("SIMKL title {} lookup failed, using search hit: {}", simkl_id, e);
                Ok(Some(hit))
            }
        }
    }

    async fn trakt(
        &self,
        id_type: TraktIdType,
        id: &str,
        kind: TraktMediaType,
    ) -> Result<Option<TraktSearchHit>> {
        self.trakt.lookup(id_type, id, kind).await
    }

    async fn kitsu_slug(&self, slug: &str) -> Result<String> {
        self.kitsu.resolve_slug(slug, KitsuMediaType::Anime).await
    }
}

/// Input id after platform-specific clean-up.
#[derive(Debug, PartialEq, Eq)]
struct NormalizedId {
    id: String,
    trakt_type: Option<String>,
    trakt_season: Option<String>,
    tmdb_type: Option<String>,
}

impl NormalizedId {
    fn plain(id: &str) -> Self {
        Self {
            id: id.to_string(),
            trakt_type: None,
            trakt_season: None,
            tmdb_type: None,
        }
    }
}

/// Accepts `123`, `shows/123`, `movies/123` and `shows/123/seasons/2`.
fn split_trakt(id: &str) -> NormalizedId {
    let parts: Vec<&str> = id.trim_matches('/').split('/').collect();
    match parts.as_slice() {
        [kind @ ("shows" | "movies"), id, "seasons", season] => NormalizedId {
            id: id.to_string(),
            trakt_type: Some(kind.to_string()),
            trakt_season: Some(season.to_string()),
            tmdb_type: None,
        },
        [kind @ ("shows" | "movies"), id] => NormalizedId {
            trakt_type: Some(kind.to_string()),
            ..NormalizedId::plain(id)
        },
        _ => NormalizedId::plain(id),
    }
}

/// Accepts `123`, `tv/123` and `movie/123`.
fn split_tmdb(id: &str) -> NormalizedId {
    match id.trim_matches('/').split_once('/') {
        Some((kind @ ("tv" | "movie"), id)) => NormalizedId {
            tmdb_type: Some(kind.to_string()),
            ..NormalizedId::plain(id)
        },
        _ => NormalizedId::plain(id),
    }
}

async fn normalize(
    source: &dyn RelationSource,
    platform: Platform,
    id: &str,
) -> Option<NormalizedId> {
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    match platform {
        Platform::Kitsu if !id.chars().all(|c| c.is_ascii_digit()) => {
            match source.kitsu_slug(id).await {
                Ok(numeric) => Some(NormalizedId::plain(&numeric)),
                Err(e) => {
                    warn!("Could not resolve Kitsu slug {}: {}", id, e);
                    None
                }
            }
        }
        // Shikimori prefixes some ids with a letter (`z123`)
        Platform::Shikimori => {
            let stripped = id.trim_start_matches(|c: char| c.is_ascii_alphabetic());
            (!stripped.is_empty()).then(|| NormalizedId::plain(stripped))
        }
        Platform::Trakt => Some(split_trakt(id)),
        Platform::Tmdb => Some(split_tmdb(id)),
        _ => Some(NormalizedId::plain(id)),
    }
}

/// The first known id SIMKL can be searched by.
fn simkl_query(rel: &Relations) -> Option<(SimklIdType, String)> {
    [
        (SimklIdType::Simkl, &rel.simkl),
        (SimklIdType::Mal, &rel.myanimelist),
        (SimklIdType::Anidb, &rel.anidb),
        (SimklIdType::Anilist, &rel.anilist),
        (SimklIdType::Kitsu, &rel.kitsu),
        (SimklIdType::Imdb, &rel.imdb),
        (SimklIdType::Tmdb, &rel.tmdb),
        (SimklIdType::Tvdb, &rel.tvdb),
    ]
    .into_iter()
    .find_map(|(id_type, id)| id.clone().map(|id| (id_type, id)))
}

fn trakt_media_type(rel: &Relations, kind: MediaKind) -> TraktMediaType {
    let movie = kind == MediaKind::Movie
        || rel.tmdb_type.as_deref() == Some("movie")
        || rel.trakt_type.as_deref() == Some("movies");
    if movie {
        TraktMediaType::Movie
    } else {
        TraktMediaType::Show
    }
}

/// Searches SIMKL by the best id in `rel` and merges the match.
async fn merge_simkl(source: &dyn RelationSource, rel: &mut Relations, kind: MediaKind) -> bool {
    let Some((id_type, query)) = simkl_query(rel) else {
        return false;
    };
    let kind = match rel.tmdb_type.as_deref() {
        Some("movie") if id_type == SimklIdType::Tmdb => MediaKind::Movie,
        _ => kind,
    };
    match source.simkl(id_type, &query, kind).await {
        Ok(Some(title)) => {
            rel.merge_simkl(&title);
            true
        }
        Ok(None) => {
            debug!("SIMKL has no entry for {} {}", id_type.as_str(), query);
            false
        }
        Err(e) => {
            warn!("SIMKL lookup for {} {} failed: {}", id_type.as_str(), query, e);
            false
        }
    }
}

/// Resolve every known id for `id` on `platform`.
///
/// Lookups that fail are logged and skipped. When no lookup succeeds the
/// result [`is_empty`](Relations::is_empty).
pub async fn resolve(
    source: &dyn RelationSource,
    platform: Platform,
    id: &str,
    kind: MediaKind,
) -> Relations {
    let Some(input) = normalize(source, platform, id).await else {
        return Relations::default();
    };

    let mut rel = Relations {
        trakt_type: input.trakt_type,
        trakt_season: input.trakt_season,
        tmdb_type: input.tmdb_type,
        ..Default::default()
    };
    rel.set_if_missing(platform, &input.id);
    let mut found = false;

    if platform.is_animeapi_source() {
        match source.animeapi(platform, &input.id).await {
            Ok(ids) => {
                rel.merge_animeapi(&ids);
                found = true;
            }
            Err(e) => warn!("AnimeAPI lookup for {} {} failed: {}", platform, input.id, e),
        }
    }

    let mut simkl_asked = false;
    if platform == Platform::Simkl || !rel.is_known(Platform::Simkl) {
        simkl_asked = simkl_query(&rel).is_some();
        found |= merge_simkl(source, &mut rel, kind).await;
    }

    let external = [
        (TraktIdType::Imdb, rel.imdb.clone()),
        (TraktIdType::Tmdb, rel.tmdb.clone()),
        (TraktIdType::Tvdb, rel.tvdb.clone()),
    ]
    .into_iter()
    .find_map(|(id_type, id)| id.map(|id| (id_type, id)));
    let trakt_query = match (&rel.trakt, external) {
        (None, Some(by_external)) => Some(by_external),
        (Some(trakt), None) => Some((TraktIdType::Trakt, trakt.clone())),
        _ => None,
    };
    if let Some((id_type, query)) = trakt_query {
        let media_type = trakt_media_type(&rel, kind);
        match source.trakt(id_type, &query, media_type).await {
            Ok(Some(hit)) => {
                rel.merge_trakt(&hit);
                found = true;
            }
            Ok(None) => debug!("Trakt has no entry for {} {}", id_type.as_str(), query),
            Err(e) => warn!("Trakt lookup for {} {} failed: {}", id_type.as_str(), query, e),
        }
    }

    // Trakt may have supplied the first id SIMKL can be searched by
    if !simkl_asked && !rel.is_known(Platform::Simkl) {
        found |= merge_simkl(source, &mut rel, kind).await;
    }

    // started outside AnimeAPI but picked up an anime id on the way
    if !platform.is_animeapi_source() && found {
        if let Some(mal) = rel.myanimelist.clone() {
            match source.animeapi(Platform::MyAnimeList, &mal).await {
                Ok(ids) => rel.merge_animeapi(&ids),
                Err(e) => debug!("AnimeAPI backfill for MyAnimeList {} failed: {}", mal, e),
            }
        }
    }

    if found {
        rel
    } else {
        Relations::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use crate::providers::trakt::{TraktIds, TraktItem};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Fake {
        animeapi: HashMap<(Platform, String), AnimeApiRelations>,
        simkl: HashMap<String, SimklTitle>,
        trakt: HashMap<String, TraktSearchHit>,
        slugs: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl Fake {
        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl RelationSource for Fake {
        async fn animeapi(&self, platform: Platform, id: &str) -> Result<AnimeApiRelations> {
            self.log(format!("animeapi {} {}", platform, id));
            self.animeapi
                .get(&(platform, id.to_string()))
                .cloned()
                .ok_or_else(|| ProviderError::NotFound(id.to_string()))
        }

        async fn simkl(
            &self,
            id_type: SimklIdType,
            id: &str,
            _kind: MediaKind,
        ) -> Result<Option<SimklTitle>> {
            self.log(format!("simkl {} {}", id_type.as_str(), id));
            Ok(self.simkl.get(id).cloned())
        }

        async fn trakt(
            &self,
            id_type: TraktIdType,
            id: &str,
            _kind: TraktMediaType,
        ) -> Result<Option<TraktSearchHit>> {
            self.log(format!("trakt {} {}", id_type.as_str(), id));
            Ok(self.trakt.get(id).cloned())
        }

        async fn kitsu_slug(&self, slug: &str) -> Result<String> {
            self.slugs
                .get(slug)
                .cloned()
                .ok_or_else(|| ProviderError::NotFound(slug.to_string()))
        }
    }

    fn bebop() -> AnimeApiRelations {
        AnimeApiRelations {
            title: Some("Cowboy Bebop".into()),
            anilist: Some("1".into()),
            myanimelist: Some("1".into()),
            kitsu: Some("1".into()),
            shikimori: Some("1".into()),
            simkl: Some("37089".into()),
            themoviedb: Some("30991".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_anilist_id_resolves_myanimelist() {
        let mut fake = Fake::default();
        fake.animeapi.insert((Platform::AniList, "1".into()), bebop());

        let rel = resolve(&fake, Platform::AniList, "1", MediaKind::Anime).await;
        assert!(!rel.is_empty());
        assert_eq!(rel.myanimelist.as_deref(), Some("1"));
        assert_eq!(rel.title.as_deref(), Some("Cowboy Bebop"));
        // SIMKL id came from AnimeAPI, so SIMKL is not asked
        assert!(!fake
            .calls
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.starts_with("simkl")));
    }

    #[tokio::test]
    async fn test_everything_failing_is_empty() {
        let fake = Fake::default();
        let rel = resolve(&fake, Platform::MyAnimeList, "999999", MediaKind::Anime).await;
        assert!(rel.is_empty());
        assert_eq!(rel, Relations::default());
    }

    #[tokio::test]
    async fn test_kitsu_slug_and_shikimori_prefix() {
        let mut fake = Fake::default();
        fake.slugs.insert("cowboy-bebop".into(), "1".into());
        fake.animeapi.insert((Platform::Kitsu, "1".into()), bebop());
        fake.animeapi.insert((Platform::Shikimori, "1".into()), bebop());

        let rel = resolve(&fake, Platform::Kitsu, "cowboy-bebop", MediaKind::Anime).await;
        assert_eq!(rel.kitsu.as_deref(), Some("1"));

        let rel = resolve(&fake, Platform::Shikimori, "z1", MediaKind::Anime).await;
        assert_eq!(rel.shikimori.as_deref(), Some("1"));
        assert_eq!(rel.anilist.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_imdb_goes_through_simkl_and_trakt() {
        let mut fake = Fake::default();
        let simkl: SimklTitle = serde_json::from_value(serde_json::json!({
            "title": "Cowboy Bebop",
            "type": "anime",
            "ids": { "simkl": 37089, "mal": "1", "imdb": "tt0213338", "tvdb": "76885" }
        }))
        .unwrap();
        fake.simkl.insert("tt0213338".into(), simkl);
        fake.trakt.insert(
            "tt0213338".into(),
            TraktSearchHit {
                kind: "show".into(),
                show: Some(TraktItem {
                    title: Some("Cowboy Bebop".into()),
                    year: Some(1998),
                    ids: TraktIds {
                        trakt: Some("30857".into()),
                        imdb: Some("tt0213338".into()),
                        ..Default::default()
                    },
                }),
                movie: None,
            },
        );
        fake.animeapi.insert((Platform::MyAnimeList, "1".into()), bebop());

        let rel = resolve(&fake, Platform::Imdb, "tt0213338", MediaKind::Show).await;
        assert_eq!(rel.simkl.as_deref(), Some("37089"));
        assert_eq!(rel.trakt.as_deref(), Some("30857"));
        assert_eq!(rel.trakt_type.as_deref(), Some("shows"));
        assert_eq!(rel.tvdb.as_deref(), Some("76885"));
        // backfilled from AnimeAPI through the MyAnimeList id
        assert_eq!(rel.anilist.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_trakt_id_reaches_simkl_and_backfills() {
        let mut fake = Fake::default();
        fake.trakt.insert(
            "30857".into(),
            TraktSearchHit {
                kind: "show".into(),
                show: Some(TraktItem {
                    title: Some("Cowboy Bebop".into()),
                    year: Some(1998),
                    ids: TraktIds {
                        trakt: Some("30857".into()),
                        imdb: Some("tt0213338".into()),
                        ..Default::default()
                    },
                }),
                movie: None,
            },
        );
        let simkl: SimklTitle = serde_json::from_value(serde_json::json!({
            "title": "Cowboy Bebop",
            "type": "anime",
            "ids": { "simkl": 37089, "mal": "1", "imdb": "tt0213338" }
        }))
        .unwrap();
        fake.simkl.insert("tt0213338".into(), simkl);
        fake.animeapi.insert((Platform::MyAnimeList, "1".into()), bebop());

        let rel = resolve(&fake, Platform::Trakt, "shows/30857", MediaKind::Show).await;
        assert_eq!(rel.trakt.as_deref(), Some("30857"));
        assert_eq!(rel.simkl.as_deref(), Some("37089"));
        assert_eq!(rel.myanimelist.as_deref(), Some("1"));
        assert_eq!(rel.anilist.as_deref(), Some("1"));

        let calls = fake.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            [
                "trakt trakt 30857",
                "simkl imdb tt0213338",
                "animeapi myanimelist 1",
            ]
        );
    }

    #[tokio::test]
    async fn test_trakt_season_path() {
        let mut fake = Fake::default();
        fake.trakt.insert(
            "30857".into(),
            TraktSearchHit {
                kind: "show".into(),
                show: Some(TraktItem {
                    title: None,
                    year: None,
                    ids: TraktIds {
                        trakt: Some("30857".into()),
                        tmdb: Some("30991".into()),
                        ..Default::default()
                    },
                }),
                movie: None,
            },
        );

        let rel = resolve(
            &fake,
            Platform::Trakt,
            "shows/30857/seasons/1",
            MediaKind::Show,
        )
        .await;
        assert_eq!(rel.trakt.as_deref(), Some("30857"));
        assert_eq!(rel.trakt_season.as_deref(), Some("1"));
        assert_eq!(rel.tmdb.as_deref(), Some("30991"));
    }

    #[test]
    fn test_split_helpers() {
        assert_eq!(split_trakt("123"), NormalizedId::plain("123"));
        assert_eq!(split_trakt("movies/9").trakt_type.as_deref(), Some("movies"));
        assert_eq!(split_tmdb("movie/603").tmdb_type.as_deref(), Some("movie"));
        assert_eq!(split_tmdb("603").id, "603");
    }
}
