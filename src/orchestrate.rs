//! The orchestrate pipeline: pull the website repository, regenerate its
//! publication list via the fetch pipeline, then stage, commit and push.
//!
//! Git runs as a subprocess in the repository directory and is assumed to
//! have passwordless push access to the configured remote. There is no
//! rollback: a failed push leaves the local commit in place, and the
//! failure is logged.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{error, info};

use crate::client::PublicationApi;
use crate::config::{Config, BRANCH, COMMIT_MESSAGE, PUBLIST_REL_PATH, REMOTE};
use crate::fetch;

/// Update, commit and push the publication list in the repository at
/// `repo_dir`. The publication file lives at [`PUBLIST_REL_PATH`] and the
/// publishing branch is [`BRANCH`].
pub async fn run(api: &dyn PublicationApi, config: &Config, repo_dir: &Path) -> Result<()> {
    info!(repo = %repo_dir.display(), "Updating publications in repository");

    if !repo_dir.is_dir() {
        error!(repo = %repo_dir.display(), "Repository directory does not exist");
        bail!("repository directory {} does not exist", repo_dir.display());
    }
    let publist_path = repo_dir.join(PUBLIST_REL_PATH);
    let data_dir = publist_path
        .parent()
        .context("publication list path has no parent directory")?;
    if !data_dir.is_dir() {
        error!(
            repo = %repo_dir.display(),
            expected = %data_dir.display(),
            "Repository has no publication data directory"
        );
        bail!(
            "repository {} has no {} directory",
            repo_dir.display(),
            data_dir.display()
        );
    }

    git(repo_dir, &["pull"])?;

    fetch::run(api, config, Some(&publist_path))
        .await
        .context("publication update failed")?;

    if !publist_changed(repo_dir)? {
        info!("Publication list unchanged, nothing to push");
        return Ok(());
    }

    git(repo_dir, &["add", PUBLIST_REL_PATH])?;
    git(repo_dir, &["commit", "-m", COMMIT_MESSAGE])?;
    git(repo_dir, &["push", REMOTE, BRANCH])?;

    info!("Publication update pushed");
    Ok(())
}

/// Run one git command in the repository directory, failing on a non-zero
/// exit status.
fn git(repo_dir: &Path, args: &[&str]) -> Result<()> {
    let status = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .status()
        .with_context(|| format!("failed to launch git {}", args.join(" ")))?;
    if !status.success() {
        error!(
            command = %format!("git {}", args.join(" ")),
            status = ?status.code(),
            "Git exited with non-zero code"
        );
        bail!("git {} exited with status {}", args.join(" "), status);
    }
    info!(command = %format!("git {}", args.join(" ")), "Git command succeeded");
    Ok(())
}

/// Whether the working tree reports any change to the publication file.
fn publist_changed(repo_dir: &Path) -> Result<bool> {
    let output = Command::new("git")
        .args(["status", "--porcelain", "--", PUBLIST_REL_PATH])
        .current_dir(repo_dir)
        .output()
        .context("failed to launch git status")?;
    if !output.status.success() {
        error!(status = ?output.status.code(), "Git status exited with non-zero code");
        bail!("git status exited with status {}", output.status);
    }
    Ok(!output.stdout.is_empty())
}
