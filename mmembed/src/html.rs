//! Player pages for the embedded web view
//!
//! The IFrame API page posts `ready`, `state:<n>` and `error:<code>` to the
//! host. The fallback page is a plain iframe embed without any callback.

use serde::{Deserialize, Serialize};

/// Domain serving the embedded player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmbedHost {
    /// `www.youtube.com`
    Standard,
    /// `www.youtube-nocookie.com` (privacy-enhanced mode)
    NoCookie,
}

impl EmbedHost {
    pub fn origin(&self) -> &'static str {
        match self {
            Self::Standard => "https://www.youtube.com",
            Self::NoCookie => "https://www.youtube-nocookie.com",
        }
    }

    /// The other host, tried when this one fails
    pub fn alternate(&self) -> Self {
        match self {
            Self::Standard => Self::NoCookie,
            Self::NoCookie => Self::Standard,
        }
    }

    pub fn embed_url(&self, video_id: &str) -> String {
        format!("{}/embed/{}?playsinline=1&rel=0", self.origin(), video_id)
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}

fn html_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// IFrame API player reporting its lifecycle to the host
pub fn render_iframe_api_player(video_id: &str, host: EmbedHost) -> String {
    API_TEMPLATE
        .replace("{{HOST}}", &js_string(host.origin()))
        .replace("{{VIDEO_ID}}", &js_string(video_id))
}

/// Plain iframe embed, last resort when the API player keeps failing
pub fn render_fallback_iframe(video_id: &str) -> String {
    FALLBACK_TEMPLATE.replace("{{SRC}}", &html_attr(&EmbedHost::Standard.embed_url(video_id)))
}

const API_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1, maximum-scale=1">
<style>
  html, body { margin: 0; padding: 0; background: #000; height: 100%; overflow: hidden; }
  #player { position: absolute; top: 0; left: 0; width: 100%; height: 100%; }
</style>
</head>
<body>
<div id="player"></div>
<script>
  function post(message) {
    if (window.ipc && window.ipc.postMessage) {
      window.ipc.postMessage(message);
    } else if (window.parent && window.parent !== window) {
      window.parent.postMessage(message, '*');
    }
  }

  var tag = document.createElement('script');
  tag.src = 'https://www.youtube.com/iframe_api';
  tag.onerror = function () { post('error:api-unavailable'); };
  document.head.appendChild(tag);

  function onYouTubeIframeAPIReady() {
    new YT.Player('player', {
      host: {{HOST}},
      videoId: {{VIDEO_ID}},
      width: '100%',
      height: '100%',
      playerVars: { playsinline: 1, rel: 0, modestbranding: 1 },
      events: {
        onReady: function () { post('ready'); },
        onStateChange: function (event) { post('state:' + event.data); },
        onError: function (event) { post('error:' + event.data); }
      }
    });
  }
</script>
</body>
</html>
"#;

const FALLBACK_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1, maximum-scale=1">
<style>
  html, body { margin: 0; padding: 0; background: #000; height: 100%; overflow: hidden; }
  iframe { position: absolute; top: 0; left: 0; width: 100%; height: 100%; border: 0; }
</style>
</head>
<body>
<iframe src="{{SRC}}"
        allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"
        allowfullscreen></iframe>
</body>
</html>
"#;
