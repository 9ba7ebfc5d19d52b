//! Turns the links people paste into the URLs that actually embed.

use url::Url;

const YOUTUBE_CHAT: &str = "https://www.youtube.com/live_chat";
const TWITCH_POPOUT: &str = "https://www.twitch.tv/popout";
const ALERT_BOX: &str = "https://streamlabs.com/alert-box/v3";

/// Rewrites YouTube and Twitch stream links to their popout chat. Anything
/// else, including unparseable input, is returned trimmed but unchanged.
pub fn embed_url(input: &str) -> String {
    let input = input.trim();
    let Ok(url) = Url::parse(input) else {
        return input.to_string();
    };

    let host = url.host_str().unwrap_or_default().trim_start_matches("www.");
    let rewritten = match host {
        "youtube.com" | "m.youtube.com" => youtube_video_id(&url).map(youtube_chat),
        "youtu.be" => first_segment(&url).map(youtube_chat),
        "twitch.tv" => twitch_channel(&url).map(|channel| format!("{TWITCH_POPOUT}/{channel}/chat")),
        _ => None,
    };

    rewritten.unwrap_or_else(|| input.to_string())
}

/// Expands a bare alert-box token. Full URLs pass through.
pub fn alert_box_url(token: &str) -> String {
    let token = token.trim();
    if token.starts_with("http://") || token.starts_with("https://") {
        token.to_string()
    } else {
        format!("{ALERT_BOX}/{token}")
    }
}

fn youtube_chat(id: String) -> String {
    format!("{YOUTUBE_CHAT}?is_popout=1&v={id}")
}

fn youtube_video_id(url: &Url) -> Option<String> {
    // The chat page itself must not be rewritten again.
    if url.path().starts_with("/live_chat") {
        return None;
    }

    if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
        return (!id.is_empty()).then(|| id.into_owned());
    }

    let mut segments = url.path_segments()?;
    match segments.next() {
        Some("live") => segments
            .next()
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn first_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn twitch_channel(url: &Url) -> Option<String> {
    let channel = first_segment(url)?;
    // Already a popout or some other non-channel page.
    match channel.as_str() {
        "popout" | "embed" | "directory" | "videos" => None,
        _ => Some(channel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_links_become_popout_chat() {
        let expected = "https://www.youtube.com/live_chat?is_popout=1&v=abc123";
        assert_eq!(embed_url("https://www.youtube.com/watch?v=abc123"), expected);
        assert_eq!(embed_url("https://youtu.be/abc123"), expected);
        assert_eq!(embed_url("https://youtube.com/live/abc123?feature=share"), expected);
    }

    #[test]
    fn twitch_channel_becomes_popout_chat() {
        assert_eq!(
            embed_url("https://www.twitch.tv/somechannel"),
            "https://www.twitch.tv/popout/somechannel/chat"
        );
        assert_eq!(
            embed_url("https://www.twitch.tv/popout/somechannel/chat"),
            "https://www.twitch.tv/popout/somechannel/chat"
        );
    }

    #[test]
    fn other_input_passes_through() {
        assert_eq!(embed_url("  https://example.com/widget "), "https://example.com/widget");
        assert_eq!(embed_url("not a url"), "not a url");
        assert_eq!(embed_url(""), "");
        let chat = "https://www.youtube.com/live_chat?is_popout=1&v=abc";
        assert_eq!(embed_url(chat), chat);
    }

    #[test]
    fn alert_box_token_expands() {
        assert_eq!(alert_box_url("tok"), "https://streamlabs.com/alert-box/v3/tok");
        assert_eq!(alert_box_url("https://x/y"), "https://x/y");
    }
}
