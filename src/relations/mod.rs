//! Cross-platform identifier mapping for a single title.
//!
//! [`resolve`] walks AnimeAPI, SIMKL and Trakt starting from one known id and
//! collects every id the three services agree on.

mod resolver;

pub use resolver::{resolve, RelationSource};

use crate::providers::animeapi::AnimeApiRelations;
use crate::providers::simkl::SimklTitle;
use crate::providers::trakt::TraktSearchHit;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, poise::ChoiceParameter)]
pub enum Platform {
    #[name = "AniDB"]
    AniDb,
    #[name = "AniList"]
    AniList,
    #[name = "Anime-Planet"]
    AnimePlanet,
    #[name = "aniSearch"]
    AniSearch,
    #[name = "Annict"]
    Annict,
    #[name = "IMDb"]
    Imdb,
    #[name = "Kaize"]
    Kaize,
    #[name = "Kitsu"]
    Kitsu,
    #[name = "LiveChart"]
    LiveChart,
    #[name = "MyAnimeList"]
    MyAnimeList,
    #[name = "Notify.moe"]
    NotifyMoe,
    #[name = "Otak Otaku"]
    Otakotaku,
    #[name = "Shikimori"]
    Shikimori,
    #[name = "Shoboi Calendar"]
    Shoboi,
    #[name = "SilverYasha"]
    SilverYasha,
    #[name = "SIMKL"]
    Simkl,
    #[name = "The Movie Database"]
    Tmdb,
    #[name = "Trakt"]
    Trakt,
    #[name = "TheTVDB"]
    Tvdb,
}

impl Platform {
    pub const ALL: [Platform; 19] = [
        Platform::AniDb,
        Platform::AniList,
        Platform::AnimePlanet,
        Platform::AniSearch,
        Platform::Annict,
        Platform::Imdb,
        Platform::Kaize,
        Platform::Kitsu,
        Platform::LiveChart,
        Platform::MyAnimeList,
        Platform::NotifyMoe,
        Platform::Otakotaku,
        Platform::Shikimori,
        Platform::Shoboi,
        Platform::SilverYasha,
        Platform::Simkl,
        Platform::Tmdb,
        Platform::Trakt,
        Platform::Tvdb,
    ];

    /// Path segment AnimeAPI uses for this platform.
    pub fn slug(self) -> &'static str {
        match self {
            Platform::AniDb => "anidb",
            Platform::AniList => "anilist",
            Platform::AnimePlanet => "animeplanet",
            Platform::AniSearch => "anisearch",
            Platform::Annict => "annict",
            Platform::Imdb => "imdb",
            Platform::Kaize => "kaize",
            Platform::Kitsu => "kitsu",
            Platform::LiveChart => "livechart",
            Platform::MyAnimeList => "myanimelist",
            Platform::NotifyMoe => "notify",
            Platform::Otakotaku => "otakotaku",
            Platform::Shikimori => "shikimori",
            Platform::Shoboi => "shoboi",
            Platform::SilverYasha => "silveryasha",
            Platform::Simkl => "simkl",
            Platform::Tmdb => "themoviedb",
            Platform::Trakt => "trakt",
            Platform::Tvdb => "tvdb",
        }
    }

    pub fn label(self) -> &'static str {
        poise::ChoiceParameter::name(&self)
    }

    /// Anime databases AnimeAPI can be queried by directly.
    pub fn is_animeapi_source(self) -> bool {
        !matches!(
            self,
            Platform::Imdb | Platform::Simkl | Platform::Tmdb | Platform::Trakt | Platform::Tvdb
        )
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace(['-', '_', ' ', '.'], "");
        let alias = match needle.as_str() {
            "mal" => Some(Platform::MyAnimeList),
            "al" => Some(Platform::AniList),
            "tmdb" => Some(Platform::Tmdb),
            "notifymoe" => Some(Platform::NotifyMoe),
            "syoboi" | "syobocal" => Some(Platform::Shoboi),
            "thetvdb" => Some(Platform::Tvdb),
            _ => None,
        };
        alias
            .or_else(|| Platform::ALL.into_iter().find(|p| p.slug() == needle))
            .ok_or_else(|| format!("unknown platform '{}'", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, poise::ChoiceParameter)]
pub enum MediaKind {
    #[default]
    Anime,
    #[name = "TV Show"]
    Show,
    Movie,
}

/// Every id known for one title. A field is `None` when no service knew it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    pub title: Option<String>,
    pub anidb: Option<String>,
    pub anilist: Option<String>,
    pub animeplanet: Option<String>,
    pub anisearch: Option<String>,
    pub annict: Option<String>,
    pub imdb: Option<String>,
    pub kaize: Option<String>,
    pub kitsu: Option<String>,
    pub livechart: Option<String>,
    pub myanimelist: Option<String>,
    pub notify: Option<String>,
    pub otakotaku: Option<String>,
    pub shikimori: Option<String>,
    pub shoboi: Option<String>,
    pub silveryasha: Option<String>,
    pub simkl: Option<String>,
    pub tmdb: Option<String>,
    pub trakt: Option<String>,
    pub tvdb: Option<String>,
    /// `shows` or `movies`
    pub trakt_type: Option<String>,
    pub trakt_season: Option<String>,
    /// `tv` or `movie`
    pub tmdb_type: Option<String>,
}

fn fill(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            *slot = Some(v.to_string());
        }
    }
}

impl Relations {
    fn slot(&mut self, platform: Platform) -> &mut Option<String> {
        match platform {
            Platform::AniDb => &mut self.anidb,
            Platform::AniList => &mut self.anilist,
            Platform::AnimePlanet => &mut self.animeplanet,
            Platform::AniSearch => &mut self.anisearch,
            Platform::Annict => &mut self.annict,
            Platform::Imdb => &mut self.imdb,
            Platform::Kaize => &mut self.kaize,
            Platform::Kitsu => &mut self.kitsu,
            Platform::LiveChart => &mut self.livechart,
            Platform::MyAnimeList => &mut self.myanimelist,
            Platform::NotifyMoe => &mut self.notify,
            Platform::Otakotaku => &mut self.otakotaku,
            Platform::Shikimori => &mut self.shikimori,
            Platform::Shoboi => &mut self.shoboi,
            Platform::SilverYasha => &mut self.silveryasha,
            Platform::Simkl => &mut self.simkl,
            Platform::Tmdb => &mut self.tmdb,
            Platform::Trakt => &mut self.trakt,
            Platform::Tvdb => &mut self.tvdb,
        }
    }

    pub fn get(&self, platform: Platform) -> Option<&str> {
        let value = match platform {
            Platform::AniDb => &self.anidb,
            Platform::AniList => &self.anilist,
            Platform::AnimePlanet => &self.animeplanet,
            Platform::AniSearch => &self.anisearch,
            Platform::Annict => &self.annict,
            Platform::Imdb => &self.imdb,
            Platform::Kaize => &self.kaize,
            Platform::Kitsu => &self.kitsu,
            Platform::LiveChart => &self.livechart,
            Platform::MyAnimeList => &self.myanimelist,
            Platform::NotifyMoe => &self.notify,
            Platform::Otakotaku => &self.otakotaku,
            Platform::Shikimori => &self.shikimori,
            Platform::Shoboi => &self.shoboi,
            Platform::SilverYasha => &self.silveryasha,
            Platform::Simkl => &self.simkl,
            Platform::Tmdb => &self.tmdb,
            Platform::Trakt => &self.trakt,
            Platform::Tvdb => &self.tvdb,
        };
        value.as_deref()
    }

    /// Record `value` for `platform` unless an id is already known.
    pub fn set_if_missing(&mut self, platform: Platform, value: &str) {
        fill(self.slot(platform), Some(value));
    }

    pub fn is_known(&self, platform: Platform) -> bool {
        self.get(platform).is_some()
    }

    /// No platform id is known: the title was not found anywhere.
    pub fn is_empty(&self) -> bool {
        Platform::ALL.iter().all(|p| !self.is_known(*p))
    }

    pub fn merge_animeapi(&mut self, found: &AnimeApiRelations) {
        fill(&mut self.title, found.title.as_deref());
        let pairs = [
            (Platform::AniDb, &found.anidb),
            (Platform::AniList, &found.anilist),
            (Platform::AnimePlanet, &found.animeplanet),
            (Platform::AniSearch, &found.anisearch),
            (Platform::Annict, &found.annict),
            (Platform::Imdb, &found.imdb),
            (Platform::Kaize, &found.kaize),
            (Platform::Kitsu, &found.kitsu),
            (Platform::LiveChart, &found.livechart),
            (Platform::MyAnimeList, &found.myanimelist),
            (Platform::NotifyMoe, &found.notify),
            (Platform::Otakotaku, &found.otakotaku),
            (Platform::Shikimori, &found.shikimori),
            (Platform::Shoboi, &found.shoboi),
            (Platform::SilverYasha, &found.silveryasha),
            (Platform::Simkl, &found.simkl),
            (Platform::Tmdb, &found.themoviedb),
            (Platform::Trakt, &found.trakt),
        ];
        for (platform, value) in pairs {
            fill(self.slot(platform), value.as_deref());
        }
        fill(&mut self.trakt_type, found.trakt_type.as_deref());
        fill(&mut self.trakt_season, found.trakt_season.as_deref());
    }

    pub fn merge_simkl(&mut self, found: &SimklTitle) {
        fill(&mut self.title, Some(found.title.as_str()));
        let simkl_id = found.simkl_id();
        fill(&mut self.simkl, simkl_id.as_deref());
        let pairs = [
            (Platform::MyAnimeList, "mal"),
            (Platform::AniDb, "anidb"),
            (Platform::AniList, "anilist"),
            (Platform::Kitsu, "kitsu"),
            (Platform::AnimePlanet, "animeplanet"),
            (Platform::LiveChart, "livechart"),
            (Platform::Imdb, "imdb"),
            (Platform::Tmdb, "tmdb"),
            (Platform::Tvdb, "tvdb"),
        ];
        for (platform, key) in pairs {
            let value = found.id(key);
            fill(self.slot(platform), value.as_deref());
        }
        let tmdb_type = match found.kind.as_deref() {
            Some("movie") => Some("movie"),
            Some(_) => Some("tv"),
            None => None,
        };
        fill(&mut self.tmdb_type, tmdb_type);
    }

    pub fn merge_trakt(&mut self, found: &TraktSearchHit) {
        let Some(item) = found.item() else {
            return;
        };
        fill(&mut self.title, item.title.as_deref());
        fill(&mut self.trakt, item.ids.trakt.as_deref());
        fill(&mut self.imdb, item.ids.imdb.as_deref());
        fill(&mut self.tmdb, item.ids.tmdb.as_deref());
        fill(&mut self.tvdb, item.ids.tvdb.as_deref());
        let (trakt_type, tmdb_type) = if found.kind == "movie" {
            ("movies", "movie")
        } else {
            ("shows", "tv")
        };
        fill(&mut self.trakt_type, Some(trakt_type));
        fill(&mut self.tmdb_type, Some(tmdb_type));
    }

    /// Page URL for a known id, or `None` when the platform id is unknown.
    pub fn url(&self, platform: Platform) -> Option<String> {
        let id = self.get(platform)?;
        let movie = self.tmdb_type.as_deref() == Some("movie")
            || self.trakt_type.as_deref() == Some("movies");
        let url = match platform {
            Platform::AniDb => format!("https://anidb.net/anime/{}", id),
            Platform::AniList => format!("https://anilist.co/anime/{}", id),
            Platform::AnimePlanet => format!("https://www.anime-planet.com/anime/{}", id),
            Platform::AniSearch => format!("https://www.anisearch.com/anime/{}", id),
            Platform::Annict => format!("https://annict.com/works/{}", id),
            Platform::Imdb => format!("https://www.imdb.com/title/{}", id),
            Platform::Kaize => format!("https://kaize.io/anime/{}", id),
            Platform::Kitsu => format!("https://kitsu.app/anime/{}", id),
            Platform::LiveChart => format!("https://www.livechart.me/anime/{}", id),
            Platform::MyAnimeList => format!("https://myanimelist.net/anime/{}", id),
            Platform::NotifyMoe => format!("https://notify.moe/anime/{}", id),
            Platform::Otakotaku => format!("https://otakotaku.com/anime/view/{}", id),
            Platform::Shikimori => format!("https://shikimori.one/animes/{}", id),
            Platform::Shoboi => format!("https://cal.syoboi.jp/tid/{}", id),
            Platform::SilverYasha => format!("https://db.silveryasha.id/anime/{}", id),
            Platform::Simkl => {
                let kind = if movie {
                    "movies"
                } else if self.myanimelist.is_some() || self.anidb.is_some() {
                    "anime"
                } else {
                    "tv"
                };
                format!("https://simkl.com/{}/{}", kind, id)
            }
            Platform::Tmdb => {
                format!("https://www.themoviedb.org/{}/{}", if movie { "movie" } else { "tv" }, id)
            }
            Platform::Trakt => {
                let kind = if movie { "movies" } else { "shows" };
                match &self.trakt_season {
                    Some(season) if !movie => {
                        format!("https://trakt.tv/{}/{}/seasons/{}", kind, id, season)
                    }
                    _ => format!("https://trakt.tv/{}/{}", kind, id),
                }
            }
            Platform::Tvdb => format!("https://www.thetvdb.com/dereferrer/series/{}", id),
        };
        Some(url)
    }

    /// `(platform, url)` for every known id, in display order.
    pub fn links(&self) -> Vec<(Platform, String)> {
        Platform::ALL
            .into_iter()
            .filter_map(|p| self.url(p).map(|url| (p, url)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parsing() {
        assert_eq!("MAL".parse::<Platform>().unwrap(), Platform::MyAnimeList);
        assert_eq!("anime-planet".parse::<Platform>().unwrap(), Platform::AnimePlanet);
        assert_eq!("themoviedb".parse::<Platform>().unwrap(), Platform::Tmdb);
        assert_eq!("Notify.moe".parse::<Platform>().unwrap(), Platform::NotifyMoe);
        assert!("crunchyroll".parse::<Platform>().is_err());
        for platform in Platform::ALL {
            assert_eq!(platform.to_string().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn test_fill_never_overwrites() {
        let mut rel = Relations::default();
        assert!(rel.is_empty());
        rel.set_if_missing(Platform::AniList, "1");
        rel.set_if_missing(Platform::AniList, "2");
        rel.set_if_missing(Platform::Kitsu, "  ");
        assert_eq!(rel.get(Platform::AniList), Some("1"));
        assert!(!rel.is_known(Platform::Kitsu));
        assert!(!rel.is_empty());
    }

    #[test]
    fn test_trakt_url_with_season() {
        let rel = Relations {
            trakt: Some("30857".into()),
            trakt_type: Some("shows".into()),
            trakt_season: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(
            rel.url(Platform::Trakt).as_deref(),
            Some("https://trakt.tv/shows/30857/seasons/1")
        );
        assert!(rel.url(Platform::Imdb).is_none());
        assert_eq!(rel.links().len(), 1);
    }
}
