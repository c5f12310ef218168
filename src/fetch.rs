//! The fetch pipeline: list the project's outputs, enrich each Pure ID
//! into a [`Publication`], and emit the whole list as one YAML document.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, error, info};

use crate::client::{ApiError, PublicationApi};
use crate::config::{Config, MAX_IN_FLIGHT_REQUESTS};
use crate::publication::Publication;

/// Fetch and enrich all publications for the configured project.
///
/// Detail lookups run with at most [`MAX_IN_FLIGHT_REQUESTS`] requests in
/// flight; the API's output order is preserved. Any failed lookup aborts
/// the whole fetch, so a partial list is never returned.
pub async fn fetch_publications(
    api: &dyn PublicationApi,
    config: &Config,
) -> Result<Vec<Publication>> {
    let pure_ids = api
        .project_outputs(&config.project_id)
        .await
        .context("could not retrieve publication IDs")?;
    info!(
        project_id = %config.project_id,
        count = pure_ids.len(),
        "Retrieved project output IDs"
    );

    let publications: Vec<Publication> = stream::iter(pure_ids)
        .map(|pure_id| async move {
            let details = api.output_details(&pure_id).await.map_err(|e| {
                error!(pure_id = %pure_id, error = %e, "Could not retrieve details for publication");
                e
            })?;
            Ok::<_, ApiError>(Publication::from_details(&pure_id, details))
        })
        .buffered(MAX_IN_FLIGHT_REQUESTS)
        .try_collect()
        .await
        .context("could not retrieve publication details")?;

    info!(count = publications.len(), "Enriched all publications");
    Ok(publications)
}

/// Run the fetch pipeline and write the YAML document to `output`, or to
/// stdout when no output path is given.
///
/// The document is fully built before the file is opened: a failed fetch
/// never partially overwrites an existing publication list. A successful
/// run replaces the file wholesale.
pub async fn run(
    api: &dyn PublicationApi,
    config: &Config,
    output: Option<&Path>,
) -> Result<()> {
    let publications = fetch_publications(api, config).await?;
    let document =
        serde_yaml::to_string(&publications).context("failed to serialise publication list")?;
    match serde_json::to_string(&publications) {
        Ok(json) => debug!(json = %json, "Publication list (full debug)"),
        Err(e) => debug!(error = %e, "Could not serialise publication list as JSON"),
    }

    match output {
        Some(path) => {
            fs::write(path, &document).with_context(|| {
                format!("failed to write publication list to {}", path.display())
            })?;
            info!(
                path = %path.display(),
                count = publications.len(),
                "Publication list written"
            );
        }
        None => print!("{document}"),
    }
    Ok(())
}
