use crate::{Result, SourceError};
use emote_core::RawEmoteEntry;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SevenTvEmote {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    data: Option<SevenTvEmoteData>,
}

#[derive(Debug, Default, Deserialize)]
struct SevenTvEmoteData {
    #[serde(default)]
    animated: Option<bool>,
    #[serde(default)]
    host: Option<SevenTvHost>,
    #[serde(default)]
    owner: Option<SevenTvOwner>,
}

#[derive(Debug, Deserialize)]
struct SevenTvHost {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SevenTvOwner {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

impl From<SevenTvEmote> for RawEmoteEntry {
    fn from(emote: SevenTvEmote) -> Self {
        let data = emote.data.unwrap_or_default();
        let (display_name, username) = data
            .owner
            .map(|owner| (owner.display_name, owner.username))
            .unwrap_or_default();
        Self {
            id: emote.id,
            name: emote.name,
            host_url: data.host.and_then(|host| host.url),
            animated: data.animated,
            owner_display_name: display_name,
            owner_username: username,
        }
    }
}

/// Parse a 7TV `emote-sets/<id>` response body.
///
/// The `emotes` list must be present; individual entries that do not even carry a
/// name are dropped here, entries without a host are left for the dictionary builder.
pub fn parse_emote_set(body: &[u8]) -> Result<Vec<RawEmoteEntry>> {
    let mut root: Value = serde_json::from_slice(body)?;
    let emotes = match root.get_mut("emotes").map(Value::take) {
        Some(Value::Array(emotes)) => emotes,
        Some(Value::Null) | None => {
            return Err(SourceError::Malformed("missing 'emotes' list".to_string()))
        }
        Some(_) => {
            return Err(SourceError::Malformed("'emotes' is not a list".to_string()))
        }
    };

    let total = emotes.len();
    let entries: Vec<RawEmoteEntry> = emotes
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<SevenTvEmote>(value) {
            Ok(emote) => Some(emote.into()),
            Err(err) => {
                log::debug!("Dropping unreadable emote entry: {err}");
                None
            }
        })
        .collect();

    if entries.len() < total {
        log::warn!(
            "Dropped {} of {} emote entries with unreadable shape",
            total - entries.len(),
            total
        );
    }
    Ok(entries)
}
