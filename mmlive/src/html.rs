//! Player page for the embedded web view
//!
//! The page plays HLS (natively or through hls.js) and posts the player
//! lifecycle to the host as plain strings: `loadstart`, `loadedmetadata`,
//! `canplay`, `playing`, `waiting`, `stalled`, `error:<code>`. The host
//! switches streams by evaluating [`load_script`].

/// hls.js build loaded by the page
pub const HLS_JS_URL: &str = "https://cdn.jsdelivr.net/npm/hls.js@1";

/// Encode a string as a JavaScript literal safe inside `<script>`
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}

/// Render the live player page, starting on `url`
pub fn render_live_player(url: &str) -> String {
    TEMPLATE
        .replace("{{HLS_JS_URL}}", HLS_JS_URL)
        .replace("{{STREAM_URL}}", &js_string(url))
}

/// Script switching the page to another stream URL
pub fn load_script(url: &str) -> String {
    format!("window.loadStream({});", js_string(url))
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1, maximum-scale=1">
<style>
  html, body { margin: 0; padding: 0; background: #000; height: 100%; }
  video { width: 100%; height: 100%; object-fit: contain; background: #000; }
</style>
<script src="{{HLS_JS_URL}}"></script>
</head>
<body>
<video id="live" playsinline autoplay controls></video>
<script>
(function () {
  var video = document.getElementById('live');
  var hls = null;

  function post(message) {
    if (window.ipc && window.ipc.postMessage) {
      window.ipc.postMessage(message);
    } else if (window.parent && window.parent !== window) {
      window.parent.postMessage(message, '*');
    }
  }

  ['loadstart', 'loadedmetadata', 'canplay', 'playing', 'waiting', 'stalled']
    .forEach(function (name) {
      video.addEventListener(name, function () { post(name); });
    });

  video.addEventListener('error', function () {
    var code = video.error ? video.error.code : 0;
    post('error:' + code);
  });

  window.loadStream = function (url) {
    if (hls) {
      hls.destroy();
      hls = null;
    }
    if (video.canPlayType('application/vnd.apple.mpegurl')) {
      video.src = url;
    } else if (window.Hls && window.Hls.isSupported()) {
      hls = new window.Hls({ lowLatencyMode: true });
      hls.on(window.Hls.Events.ERROR, function (_event, data) {
        if (data && data.fatal) {
          post('error:hls-' + data.type);
        }
      });
      hls.loadSource(url);
      hls.attachMedia(video);
    } else {
      post('error:unsupported');
      return;
    }
    var started = video.play();
    if (started && started.catch) {
      started.catch(function () {});
    }
  };

  window.loadStream({{STREAM_URL}});
})();
</script>
</body>
</html>
"#;
