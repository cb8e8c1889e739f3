// Video url resolution for the learning player.

use reqwest::Url;

const YOUTUBE_EMBED: &str = "https://www.youtube.com/embed/";

/// Resolve a module's `videoUrl` into something an iframe can play.
///
/// YouTube watch, short and embed links are rewritten to the embed form;
/// any other absolute http(s) url is used as-is. Returns `None` when the
/// value cannot be played at all.
pub fn embed_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let youtube_id = match host {
        "youtube.com" => {
            if url.path() == "/watch" {
                let v = url.query_pairs().find(|(k, _)| k == "v");
                Some(v.map(|(_, v)| v.into_owned()).unwrap_or_default())
            } else {
                url.path().strip_prefix("/embed/").map(first_segment)
            }
        }
        "youtu.be" => Some(first_segment(url.path().trim_start_matches('/'))),
        _ => None,
    };

    match youtube_id {
        Some(id) if is_video_id(&id) => Some(format!("{YOUTUBE_EMBED}{id}")),
        Some(_) => None,
        None => Some(url.to_string()),
    }
}

pub fn is_embeddable(raw: &str) -> bool {
    embed_url(raw).is_some()
}

fn first_segment(path: &str) -> String {
    path.split('/').next().unwrap_or_default().to_string()
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
