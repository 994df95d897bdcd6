//! Stylesheet and script for the dashboard, compiled into the binary.
//!
//! No external assets, no build tools, no CDN dependencies.

/// `GET /static/app.css`
pub const APP_CSS: &str = r#":root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}
a { color: var(--accent); text-decoration: none; }
a:hover { text-decoration: underline; }
code { font-family: var(--mono); }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  flex-wrap: wrap;
  gap: 12px;
  max-width: 1200px;
  margin: 0 auto;
  padding: 16px 24px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 22px; font-weight: 600; }
header h1 a { color: var(--text); }
header h1 .logo { color: var(--accent); font-family: var(--mono); }
nav { display: flex; align-items: center; gap: 14px; flex-wrap: wrap; }
nav .who { color: var(--text-muted); }

main { max-width: 1200px; margin: 0 auto; padding: 24px; }
main > h2 { margin-bottom: 16px; }
footer.debug {
  max-width: 1200px;
  margin: 0 auto;
  padding: 8px 24px;
  color: var(--text-muted);
  font-size: 12px;
}

.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(340px, 1fr)); gap: 16px; margin-bottom: 16px; }
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card.narrow { max-width: 420px; margin: 40px auto; }
.card h2, .card h3 { margin-bottom: 12px; }
.muted, .empty { color: var(--text-muted); }

.stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(140px, 1fr)); gap: 12px; margin-bottom: 16px; }
.stat {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 14px;
  display: flex;
  flex-direction: column;
}
.stat .label { color: var(--text-muted); font-size: 12px; text-transform: uppercase; }
.stat .value { font-size: 22px; font-weight: 600; }
.stat .sub { color: var(--text-muted); font-size: 12px; }
.progress { height: 6px; background: var(--border); border-radius: 3px; margin-top: 8px; overflow: hidden; }
.progress .bar { height: 100%; background: var(--green); }

.notice { padding: 10px 14px; border-radius: var(--radius); margin-bottom: 12px; border: 1px solid; }
.notice.success { border-color: var(--green); color: var(--green); }
.notice.error { border-color: var(--red); color: var(--red); }
.notice.info { border-color: var(--accent); color: var(--accent); }

form label { display: block; margin-bottom: 10px; color: var(--text-muted); }
form.inline { display: inline; }
input, select, textarea {
  display: block;
  width: 100%;
  margin-top: 4px;
  padding: 8px 10px;
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  font: inherit;
}
button, .button {
  display: inline-block;
  padding: 8px 16px;
  background: var(--accent);
  color: var(--bg);
  border: none;
  border-radius: 6px;
  font: inherit;
  font-weight: 600;
  cursor: pointer;
}
button.secondary, .button.secondary { background: var(--border); color: var(--text); }
button.danger, a.danger { color: var(--red); }
button.danger { background: var(--red); color: var(--bg); }
nav button { padding: 4px 10px; background: var(--border); color: var(--text); }
.actions { display: flex; gap: 8px; }

table { width: 100%; border-collapse: collapse; margin-top: 8px; }
th, td { padding: 6px 8px; border-bottom: 1px solid var(--border); text-align: left; }
th { color: var(--text-muted); font-weight: 500; font-size: 12px; text-transform: uppercase; }
td.num { text-align: right; font-family: var(--mono); }
.tag { padding: 2px 8px; border-radius: 10px; background: var(--border); font-size: 12px; }

.search { margin-bottom: 12px; }
.results { list-style: none; margin-top: 8px; max-height: 260px; overflow-y: auto; }
.results li { padding: 6px 0; border-bottom: 1px solid var(--border); }
.brand { color: var(--yellow); font-size: 12px; }
.preview { border: 1px solid var(--accent); border-radius: var(--radius); padding: 12px; margin-bottom: 12px; }
.preview ul.macros, ul.macros { list-style: none; display: flex; gap: 14px; flex-wrap: wrap; }

.tabs { display: flex; gap: 10px; margin-bottom: 12px; }
.tabs a { padding: 4px 12px; border-radius: 12px; border: 1px solid var(--border); }
.tabs a.active { background: var(--accent); color: var(--bg); }
.insights { display: grid; gap: 10px; margin-top: 12px; }
.insight { display: flex; gap: 10px; padding: 10px; border-radius: var(--radius); border: 1px solid var(--border); }
.insight.warning { border-color: var(--yellow); }
.insight.success { border-color: var(--green); }
.cluster { border-left: 4px solid var(--accent); padding-left: 10px; font-size: 18px; }
dl.goals, dl.features { display: grid; grid-template-columns: auto 1fr; gap: 4px 16px; }
dl dt { color: var(--text-muted); }
.recommendations { margin: 6px 0 0 18px; }

.chart svg { width: 100%; height: auto; }
.chart text { fill: var(--text-muted); font-size: 11px; }
.chart .axis { stroke: var(--border); }
.chart .history { fill: none; stroke: var(--accent); stroke-width: 2; }
.chart .predicted { fill: none; stroke: var(--yellow); stroke-width: 2; stroke-dasharray: 5 4; }
.chart .predicted-dot { fill: var(--yellow); }
.chart .band { fill: var(--yellow); opacity: 0.15; }
"#;

/// `GET /static/app.js`
///
/// Debounces the food search box and ignores responses that arrive after a
/// newer search was started.
pub const APP_JS: &str = r#"(function () {
  'use strict';

  var input = document.getElementById('food-search');
  var results = document.getElementById('search-results');
  if (!input || !results) return;

  var debounceMs = parseInt(input.getAttribute('data-debounce-ms'), 10) || 300;
  var minChars = parseInt(input.getAttribute('data-min-chars'), 10) || 2;
  var timer = null;
  var latest = 0;

  input.addEventListener('input', function () {
    clearTimeout(timer);
    var query = input.value.trim();
    if (query.length < minChars) {
      latest++;
      results.innerHTML = '';
      return;
    }
    timer = setTimeout(function () { search(query); }, debounceMs);
  });

  function search(query) {
    var ticket = ++latest;
    fetch('/food/search?q=' + encodeURIComponent(query), { credentials: 'same-origin' })
      .then(function (res) {
        if (res.redirected && res.url.indexOf('/login') !== -1) {
          window.location.href = res.url;
          return null;
        }
        return res.text();
      })
      .then(function (html) {
        if (html === null || ticket !== latest) return;
        results.innerHTML = html;
      })
      .catch(function () {
        if (ticket !== latest) return;
        results.innerHTML = '<div class="notice error">Search failed. Check your connection.</div>';
      });
  }
})();
"#;
