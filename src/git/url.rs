use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HTTPS_REMOTE: Regex =
        Regex::new(r"^https?://github\.com/([^/]+)/([^/.]+)(?:\.git)?/?$").expect("valid regex");
    static ref SSH_REMOTE: Regex =
        Regex::new(r"^git@github\.com:([^/]+)/([^/.]+)(?:\.git)?$").expect("valid regex");
}

/// Owner and repository name extracted from a GitHub remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    pub owner: String,
    pub repo: String,
}

impl RemoteUrl {
    /// Canonical HTTPS clone URL for this repository
    pub fn https_clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.repo)
    }
}

/// Recognizes `https://github.com/<owner>/<repo>[.git]` and
/// `git@github.com:<owner>/<repo>[.git]`. Anything else yields `None`.
pub fn parse_remote_url(url: &str) -> Option<RemoteUrl> {
    let url = url.trim();
    [&*HTTPS_REMOTE, &*SSH_REMOTE].iter().find_map(|pattern| {
        pattern.captures(url).map(|caps| RemoteUrl {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
        })
    })
}
