//! Deep links: `trackgym://session/<id>` routes straight to a session.

use url::Url;

pub const SCHEME: &str = "trackgym";

/// Build the link for a session.
pub fn session_link(session_id: i64) -> String {
  format!("{}://session/{}", SCHEME, session_id)
}

/// Extract the session id from a deep link. Anything that does not match the
/// scheme and shape yields `None`, routing the caller to the default screen.
pub fn parse_session_link(input: &str) -> Option<i64> {
  let url = Url::parse(input).ok()?;
  if url.scheme() != SCHEME || url.host_str() != Some("session") {
    return None;
  }

  let mut segments = url.path_segments()?;
  let id = segments.next()?.parse::<i64>().ok()?;
  if segments.next().is_some() {
    return None;
  }
  Some(id)
}
