//! HTML dashboard page.

use std::fmt::Write;

use crate::monitor::{Credentials, RuntimeConfig, MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES};
use crate::scheduler::{JobInfo, SchedulerState};

/// Banner shown above the form after a config update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    None,
    Success,
    Error(String),
}

/// Everything the page shows, read once per request.
pub struct DashboardView<'a> {
    pub service: &'a str,
    pub version: &'a str,
    pub config: &'a RuntimeConfig,
    pub monitoring_active: bool,
    pub credentials: Credentials,
    pub scheduler: SchedulerState,
    pub job: Option<JobInfo>,
    pub banner: Banner,
}

/// Escape text for HTML element and attribute content.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn flag(on: bool, yes: &str, no: &str) -> String {
    if on {
        format!(r#"<span class="ok">{}</span>"#, yes)
    } else {
        format!(r#"<span class="bad">{}</span>"#, no)
    }
}

pub fn render(view: &DashboardView<'_>) -> String {
    let mut html = String::with_capacity(4096);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{service} dashboard</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; color: #222; }}
h1 {{ font-size: 1.5rem; }}
table {{ border-collapse: collapse; width: 100%; margin-bottom: 1.5rem; }}
td {{ padding: .4rem .6rem; border-bottom: 1px solid #eee; }}
td:first-child {{ color: #666; width: 40%; }}
.ok {{ color: #1a7f37; }}
.bad {{ color: #cf222e; }}
.banner {{ padding: .75rem 1rem; border-radius: 4px; margin-bottom: 1rem; }}
.banner.success {{ background: #dafbe1; }}
.banner.error {{ background: #ffebe9; }}
label {{ display: block; margin-top: .75rem; }}
input {{ width: 100%; padding: .4rem; box-sizing: border-box; }}
button {{ margin-top: 1rem; padding: .5rem 1rem; }}
footer {{ color: #888; font-size: .8rem; margin-top: 2rem; }}
</style>
</head>
<body>
<h1>{service}</h1>
"#,
        service = escape_html(view.service),
    );

    match &view.banner {
        Banner::None => {}
        Banner::Success => {
            html.push_str(r#"<div class="banner success">Configuration updated.</div>"#);
            html.push('\n');
        }
        Banner::Error(message) => {
            let _ = writeln!(
                html,
                r#"<div class="banner error">Error: {}</div>"#,
                escape_html(message)
            );
        }
    }

    let app = if view.config.monitored_entity.is_empty() {
        "<em>not set</em>".to_string()
    } else {
        format!("<code>{}</code>", escape_html(&view.config.monitored_entity))
    };
    let next_job = match &view.job {
        Some(job) => format!(
            "every {}m since {}",
            job.interval_minutes,
            job.registered_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => "none".to_string(),
    };

    let _ = write!(
        html,
        r#"<table>
<tr><td>Monitored app</td><td>{app}</td></tr>
<tr><td>Slack channel</td><td>{channel}</td></tr>
<tr><td>Check interval</td><td>{interval} minutes</td></tr>
<tr><td>Monitoring</td><td>{active}</td></tr>
<tr><td>Heroku API key</td><td>{platform}</td></tr>
<tr><td>Slack token</td><td>{notifier}</td></tr>
<tr><td>Scheduler</td><td>{scheduler} ({job})</td></tr>
</table>
"#,
        app = app,
        channel = escape_html(&view.config.notification_channel),
        interval = view.config.poll_interval_minutes,
        active = flag(view.monitoring_active, "active", "inactive"),
        platform = flag(view.credentials.platform, "set", "missing"),
        notifier = flag(view.credentials.notifier, "set", "missing"),
        scheduler = view.scheduler.as_str(),
        job = escape_html(&next_job),
    );

    let _ = write!(
        html,
        r#"<form method="post" action="/update-config">
<label>App name <input name="app_name" value="{app}" required></label>
<label>Slack channel <input name="slack_channel" value="{channel}" required></label>
<label>Check interval (minutes) <input name="check_interval" type="number" min="{min}" max="{max}" value="{interval}" required></label>
<button type="submit">Save</button>
</form>
<footer>{service} {version}</footer>
</body>
</html>
"#,
        app = escape_html(&view.config.monitored_entity),
        channel = escape_html(&view.config.notification_channel),
        interval = view.config.poll_interval_minutes,
        min = MIN_INTERVAL_MINUTES,
        max = MAX_INTERVAL_MINUTES,
        service = escape_html(view.service),
        version = escape_html(view.version),
    );

    html
}
