use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entry of a remote emote set, as handed over by a dictionary source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEmoteEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub host_url: Option<String>,
    #[serde(default)]
    pub animated: Option<bool>,
    #[serde(default)]
    pub owner_display_name: Option<String>,
    #[serde(default)]
    pub owner_username: Option<String>,
}

impl RawEmoteEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            host_url: None,
            animated: None,
            owner_display_name: None,
            owner_username: None,
        }
    }

    pub fn host_url(mut self, url: impl Into<String>) -> Self {
        self.host_url = Some(url.into());
        self
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = Some(animated);
        self
    }

    pub fn owner(mut self, display_name: Option<&str>, username: Option<&str>) -> Self {
        self.owner_display_name = display_name.map(str::to_string);
        self.owner_username = username.map(str::to_string);
        self
    }
}

/// A validated emote, immutable once built by the dictionary builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmoteRecord {
    name: String,
    source_id: String,
    asset_base_url: String,
    asset_url: String,
    preview_url: String,
    animated: bool,
    creator_label: String,
}

impl EmoteRecord {
    pub(crate) fn new(
        name: String,
        source_id: String,
        asset_base_url: String,
        asset_url: String,
        preview_url: String,
        animated: bool,
        creator_label: String,
    ) -> Self {
        Self {
            name,
            source_id,
            asset_base_url,
            asset_url,
            preview_url,
            animated,
            creator_label,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// `https:` host URL without any scale/format suffix
    pub fn asset_base_url(&self) -> &str {
        &self.asset_base_url
    }

    /// Inline display image
    pub fn asset_url(&self) -> &str {
        &self.asset_url
    }

    /// Larger image shown in hover previews
    pub fn preview_url(&self) -> &str {
        &self.preview_url
    }

    pub fn animated(&self) -> bool {
        self.animated
    }

    pub fn creator_label(&self) -> &str {
        &self.creator_label
    }
}

/// Rule set deciding what counts as an occurrence of an emote name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Case-sensitive, whitespace-delimited
    #[default]
    Word,

    /// Whitespace-delimited, case-folded
    #[serde(alias = "insensitive")]
    CaseInsensitive,

    /// Wrapped in colons, `:name:`
    Colon,
}

impl MatchPolicy {
    pub const ALL: [MatchPolicy; 3] = [Self::Word, Self::CaseInsensitive, Self::Colon];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::CaseInsensitive => "case_insensitive",
            Self::Colon => "colon",
        }
    }

    pub fn is_case_insensitive(self) -> bool {
        matches!(self, Self::CaseInsensitive)
    }

    pub fn requires_whitespace_boundary(self) -> bool {
        !matches!(self, Self::Colon)
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" => Ok(Self::Word),
            "case_insensitive" | "case-insensitive" | "insensitive" => Ok(Self::CaseInsensitive),
            "colon" => Ok(Self::Colon),
            other => Err(format!(
                "unknown match policy '{other}' (expected word|case_insensitive|colon)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!("word".parse::<MatchPolicy>(), Ok(MatchPolicy::Word));
        assert_eq!(
            "insensitive".parse::<MatchPolicy>(),
            Ok(MatchPolicy::CaseInsensitive)
        );
        assert_eq!(" Colon ".parse::<MatchPolicy>(), Ok(MatchPolicy::Colon));
        assert!("regex".parse::<MatchPolicy>().is_err());
    }

    #[test]
    fn test_policy_roundtrips_through_display() {
        for policy in MatchPolicy::ALL {
            assert_eq!(policy.to_string().parse::<MatchPolicy>(), Ok(policy));
        }
    }

    #[test]
    fn test_policy_serde_accepts_legacy_alias() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: MatchPolicy,
        }
        let parsed: Wrapper = toml::from_str("policy = \"insensitive\"").unwrap();
        assert_eq!(parsed.policy, MatchPolicy::CaseInsensitive);
    }
}
