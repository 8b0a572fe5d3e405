//! Conversions between Riot patch numbers (`15.7.1`) and wiki patch
//! labels (`V25.07`). From 2025 the wiki labels majors by year, ten ahead
//! of Riot's numbering.

/// First wiki major that uses year numbering.
const YEAR_LABEL_MAJOR: u32 = 25;
const YEAR_OFFSET: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} patch '{input}': {reason}")]
pub struct PatchVersionError {
    pub kind: &'static str,
    pub input: String,
    pub reason: &'static str,
}

fn riot_error(input: &str, reason: &'static str) -> PatchVersionError {
    PatchVersionError {
        kind: "riot",
        input: input.to_string(),
        reason,
    }
}

fn wiki_error(input: &str, reason: &'static str) -> PatchVersionError {
    PatchVersionError {
        kind: "wiki",
        input: input.to_string(),
        reason,
    }
}

fn number(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// `"15.7.1"` to `"V25.07"`.
pub fn riot_to_wiki_patch(riot: &str) -> Result<String, PatchVersionError> {
    let mut parts = riot.trim().split('.');
    let major = parts
        .next()
        .and_then(number)
        .ok_or_else(|| riot_error(riot, "major is not a number"))?;
    let minor = parts
        .next()
        .and_then(number)
        .ok_or_else(|| riot_error(riot, "minor is not a number"))?;
    let major = if major + YEAR_OFFSET >= YEAR_LABEL_MAJOR {
        major + YEAR_OFFSET
    } else {
        major
    };
    Ok(format!("V{major}.{minor:02}"))
}

/// `"V25.07"` to `"15.7.1"`; season labels like `"V25.S1.3"` use their
/// last part as the minor.
pub fn wiki_to_riot_patch(wiki: &str) -> Result<String, PatchVersionError> {
    let trimmed = wiki.trim();
    let body = trimmed
        .strip_prefix(['V', 'v'])
        .ok_or_else(|| wiki_error(wiki, "missing 'V' prefix"))?;
    let parts: Vec<&str> = body.split('.').collect();
    let major = parts
        .first()
        .copied()
        .and_then(number)
        .ok_or_else(|| wiki_error(wiki, "major is not a number"))?;
    let minor = match parts.get(1) {
        Some(season) if season.starts_with(['S', 's']) => parts.get(2).copied().and_then(number),
        Some(minor) => number(minor),
        None => None,
    }
    .ok_or_else(|| wiki_error(wiki, "minor is not a number"))?;
    let major = if major >= YEAR_LABEL_MAJOR {
        major - YEAR_OFFSET
    } else {
        major
    };
    Ok(format!("{major}.{minor}.1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn riot_patches_map_to_year_labels() {
        assert_eq!(riot_to_wiki_patch("15.7.1").unwrap(), "V25.07");
        assert_eq!(riot_to_wiki_patch("15.10.2").unwrap(), "V25.10");
        assert_eq!(riot_to_wiki_patch("14.10.1").unwrap(), "V14.10");
    }

    #[test]
    fn malformed_riot_patches_are_rejected() {
        for input in ["15.", "abc.2.1", "15.abc.1", ""] {
            assert!(riot_to_wiki_patch(input).is_err(), "{input}");
        }
    }

    #[test]
    fn wiki_labels_map_back() {
        assert_eq!(wiki_to_riot_patch("V25.07").unwrap(), "15.7.1");
        assert_eq!(wiki_to_riot_patch("v14.10").unwrap(), "14.10.1");
        assert_eq!(wiki_to_riot_patch("V25.S1.3").unwrap(), "15.3.1");
    }

    #[test]
    fn malformed_wiki_labels_are_rejected() {
        for input in ["25.07", "V25", "V25.abc", "V", ""] {
            assert!(wiki_to_riot_patch(input).is_err(), "{input}");
        }
    }
}
