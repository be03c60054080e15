//! Lists the available site profiles.

use crate::config::Config;
use crate::scrape::{Site, SiteProfile, StrategyKind};

/// Renders built-in and configured profiles as a table.
pub fn list_sites(config: &Config) -> String {
    let builtin: Vec<SiteProfile> = Site::all().iter().map(|s| s.profile()).collect();

    let mut lines = Vec::new();
    lines.push("Site profiles:\n".to_string());
    lines.push(format!("{:<14} {:<22} {:<20} {}", "Name", "Domain", "Strategies", "Source"));
    lines.push(format!("{:-<14} {:-<22} {:-<20} {:-<8}", "", "", "", ""));

    let rows = builtin
        .iter()
        .map(|p| (p, "built-in"))
        .chain(config.profiles.iter().map(|p| (p, "config")));
    for (profile, source) in rows {
        lines.push(format!(
            "{:<14} {:<22} {:<20} {}",
            profile.name,
            profile.domain.as_deref().unwrap_or("-"),
            strategies(profile),
            source
        ));
    }

    lines.join("\n")
}

fn strategies(profile: &SiteProfile) -> String {
    profile
        .strategies
        .iter()
        .map(|s| match s {
            StrategyKind::Containers => "containers",
            StrategyKind::Anchors => "anchors",
        })
        .collect::<Vec<_>>()
        .join(" > ")
}
