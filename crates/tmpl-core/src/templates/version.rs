//! Version comparison between the CLI and a template's manifest

use semver::Version;

/// Warn when a template asks for a newer CLI than the one running.
///
/// Unparseable versions on either side produce no warning.
pub fn check_compatibility(
    cli_version: &str,
    template_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli = parse_version(cli_version)?;
    let wanted = parse_version(template_version)?;

    (cli < wanted).then(|| {
        format!(
            "This template expects version {} or newer, you are running {}.\n\
             Consider updating: {}",
            wanted, cli, upgrade_command
        )
    })
}

/// Parse a version string, accepting an optional leading `v`
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim();
    Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed)).ok()
}
