//! Movie detail page
//!
//! Loads a movie with its credits and recommendations. Only the detail
//! request is mandatory; credits and recommendations degrade to empty.

use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use crate::api::TmdbClient;
use crate::models::{CastMember, Credits, CrewCredit, CrewMember, Movie, MovieDetail};

/// Cast members at or below this popularity are hidden
pub const MIN_CAST_POPULARITY: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailOptions {
    pub include_credits: bool,
    pub include_recommended: bool,
}

impl Default for DetailOptions {
    fn default() -> Self {
        Self {
            include_credits: true,
            include_recommended: true,
        }
    }
}

/// Everything shown on a movie's detail page
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetailPage {
    pub movie: MovieDetail,
    pub credits: Option<Credits>,
    pub recommended: Vec<Movie>,
}

impl MovieDetailPage {
    pub async fn load(client: &TmdbClient, id: u64, options: DetailOptions) -> Result<Self> {
        let movie = client.movie_detail(id).await?;

        let credits = if options.include_credits {
            match client.movie_credits(id).await {
                Ok(credits) => Some(filter_cast(credits)),
                Err(e) => {
                    warn!(movie_id = id, error = %e, "failed to fetch credits");
                    None
                }
            }
        } else {
            None
        };

        let recommended = if options.include_recommended {
            match client.recommendations(id, 1).await {
                Ok(page) => page.results,
                Err(e) => {
                    warn!(movie_id = id, error = %e, "failed to fetch recommended movies");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            movie,
            credits,
            recommended,
        })
    }

    pub fn crew_summary(&self) -> CrewSummary {
        self.credits
            .as_ref()
            .map(|c| CrewSummary::from_crew(&c.crew))
            .unwrap_or_default()
    }
}

/// Keep only cast members popular enough to be recognisable
pub fn filter_cast(mut credits: Credits) -> Credits {
    credits.cast.retain(|c: &CastMember| c.popularity > MIN_CAST_POPULARITY);
    credits
}

/// Directors and writers, each with all of their jobs on the film
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrewSummary {
    pub directors: Vec<CrewCredit>,
    pub writers: Vec<CrewCredit>,
}

impl CrewSummary {
    pub fn from_crew(crew: &[CrewMember]) -> Self {
        let directors = people_with_job(crew, "Director");
        let writers = people_with_job(crew, "Writer")
            .into_iter()
            .filter(|w| !directors.iter().any(|d| d.id == w.id))
            .collect();
        Self { directors, writers }
    }
}

/// Unique jobs held by `person_id`, in first-seen order
pub fn roles_for(crew: &[CrewMember], person_id: u64) -> Vec<String> {
    let mut roles: Vec<String> = Vec::new();
    for member in crew.iter().filter(|c| c.id == person_id) {
        if !roles.contains(&member.job) {
            roles.push(member.job.clone());
        }
    }
    roles
}

fn people_with_job(crew: &[CrewMember], job: &str) -> Vec<CrewCredit> {
    let mut people: Vec<CrewCredit> = Vec::new();
    for member in crew.iter().filter(|c| c.job == job) {
        if people.iter().any(|p| p.id == member.id) {
            continue;
        }
        people.push(CrewCredit {
            id: member.id,
            name: member.name.clone(),
            roles: roles_for(crew, member.id),
        });
    }
    people
}
