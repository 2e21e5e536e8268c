use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// Structure representing a Slack slash command invocation.
/// This contains the fields Slack sends when a user invokes `/lucidlayer`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SlackCommandEvent {
    pub team_id: String,
    pub channel_id: String,
    pub user_id: String,
    pub user_name: String,
    pub command: String,
    pub text: String,
    pub response_url: String,
    pub trigger_id: String,
}

/// Decodes a URL-encoded form component.
///
/// `+` is treated as a space before percent-decoding, so an encoded `%2B`
/// survives as a literal plus sign.
///
/// # Examples
///
/// ```
/// use lucidlayer::slack::command_parser::decode_url_component;
///
/// assert_eq!(decode_url_component("hello%20world").unwrap(), "hello world");
/// assert_eq!(decode_url_component("hello+world").unwrap(), "hello world");
/// assert_eq!(decode_url_component("1%2B1").unwrap(), "1+1");
/// ```
///
/// # Errors
///
/// Returns an error message if the decoded bytes are not valid UTF-8.
pub fn decode_url_component(input: &str) -> Result<String, String> {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.to_string())
        .map_err(|e| format!("Failed to decode URL component: {e}"))
}

/// Parses URL-encoded form data into a `SlackCommandEvent`.
///
/// Missing fields default to empty strings.
///
/// # Examples
///
/// ```
/// use lucidlayer::slack::command_parser::parse_form_data;
///
/// let form_data = "team_id=T123&channel_id=C123&user_id=U123&\
///                  user_name=username&command=%2Flucidlayer&text=genz+hello&\
///                  response_url=https%3A%2F%2Fhooks.slack.com%2F&\
///                  trigger_id=123.456";
///
/// let event = parse_form_data(form_data).unwrap();
/// assert_eq!(event.command, "/lucidlayer");
/// assert_eq!(event.text, "genz hello");
/// ```
///
/// # Errors
///
/// Returns an error message if a key or value cannot be decoded.
pub fn parse_form_data(form_data: &str) -> Result<SlackCommandEvent, String> {
    let mut map: HashMap<String, String> = HashMap::new();

    for pair in form_data.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_url_component(raw_key).map_err(|e| format!("Failed to decode key: {e}"))?;
        let value =
            decode_url_component(raw_value).map_err(|e| format!("Failed to decode value: {e}"))?;
        map.insert(key, value);
    }

    let mut take = |name: &str| map.remove(name).unwrap_or_default();

    Ok(SlackCommandEvent {
        team_id: take("team_id"),
        channel_id: take("channel_id"),
        user_id: take("user_id"),
        user_name: take("user_name"),
        command: take("command"),
        text: take("text"),
        response_url: take("response_url"),
        trigger_id: take("trigger_id"),
    })
}
