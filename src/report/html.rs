use super::types::RunReport;
use crate::runner::state::{TestEvent, TestStatus};
use anyhow::Result;
use std::path::Path;

/// Generate HTML report
pub async fn generate(report: &RunReport, output: Option<&Path>) -> Result<()> {
    let html = render(report);

    if let Some(path) = output {
        std::fs::write(path, html)?;
        println!("HTML report saved to: {}", path.display());
    } else {
        println!("{}", html);
    }

    Ok(())
}

/// Render a sealed run as a standalone HTML document
pub fn render(report: &RunReport) -> String {
    let summary = &report.summary;
    let pass_rate = if summary.total > 0 {
        (summary.passed as f64 / summary.total as f64 * 100.0) as u32
    } else {
        0
    };

    let system_html: String = report
        .system_info
        .iter()
        .map(|info| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                html_escape(&info.name),
                html_escape(&info.value)
            )
        })
        .collect();

    let contexts_html: String = report
        .contexts
        .iter()
        .map(|ctx| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                html_escape(&ctx.name),
                html_escape(ctx.operating_system.as_deref().unwrap_or("-")),
                html_escape(ctx.browser.as_deref().unwrap_or("-")),
                html_escape(&ctx.groups.join(", "))
            )
        })
        .collect();

    let categories_html: String = report
        .categories()
        .iter()
        .map(|(name, counts)| {
            format!(
                r#"<tr><td>{}</td><td class="passed">{}</td><td class="failed">{}</td><td class="skipped">{}</td></tr>"#,
                html_escape(name),
                counts.passed,
                counts.failed,
                counts.skipped
            )
        })
        .collect();

    let events_html: String = report.events.iter().map(render_event).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        :root {{
            --bg-primary: #0a0f1d;
            --bg-secondary: #141b2d;
            --bg-tertiary: #1f2937;
            --border: #374151;
            --text-primary: #f9fafb;
            --text-secondary: #9ca3af;
            --green: #10b981;
            --red: #ef4444;
            --yellow: #f59e0b;
            --blue: #3b82f6;
            --purple: #8b5cf6;
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: system-ui, -apple-system, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.5;
            padding: 3rem 1rem;
        }}
        .container {{ max-width: 1100px; margin: 0 auto; }}
        header {{
            margin-bottom: 3rem;
            display: flex;
            justify-content: space-between;
            align-items: flex-end;
        }}
        .eyebrow {{
            font-size: 0.875rem;
            font-weight: 600;
            color: var(--purple);
            text-transform: uppercase;
            letter-spacing: 0.1em;
            margin-bottom: 0.5rem;
        }}
        h1 {{ font-size: 2.25rem; font-weight: 800; letter-spacing: -0.025em; }}
        h2 {{ font-size: 1.25rem; font-weight: 700; margin-bottom: 1rem; }}
        .summary {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 1.5rem;
            margin-bottom: 3rem;
        }}
        .stat {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            padding: 1.5rem;
            border-radius: 1rem;
        }}
        .stat-value {{ font-size: 2.5rem; font-weight: 800; }}
        .stat-label {{
            color: var(--text-secondary);
            font-size: 0.875rem;
            text-transform: uppercase;
            letter-spacing: 0.05em;
        }}
        .passed {{ color: var(--green); }}
        .failed {{ color: var(--red); }}
        .skipped {{ color: var(--yellow); }}
        .progress-bar {{
            background: var(--bg-secondary);
            height: 12px;
            border-radius: 6px;
            overflow: hidden;
            border: 1px solid var(--border);
            margin-bottom: 3rem;
        }}
        .progress-fill {{ height: 100%; background: var(--green); }}
        .panels {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
            gap: 1.5rem;
            margin-bottom: 3rem;
        }}
        .panel {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 1rem;
            padding: 1.5rem;
        }}
        table {{ width: 100%; border-collapse: collapse; font-size: 0.875rem; }}
        th, td {{ text-align: left; padding: 0.4rem 0.5rem; border-bottom: 1px solid var(--border); }}
        th {{ color: var(--text-secondary); font-weight: 600; }}
        .event {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-left-width: 4px;
            border-radius: 0.75rem;
            padding: 1rem 1.25rem;
            margin-bottom: 0.75rem;
        }}
        .event.pass {{ border-left-color: var(--green); }}
        .event.fail {{ border-left-color: var(--red); }}
        .event.skip {{ border-left-color: var(--yellow); }}
        .event-header {{ display: flex; justify-content: space-between; gap: 1rem; }}
        .event-name {{ font-family: monospace; font-weight: 600; }}
        .badge {{
            padding: 0.1rem 0.6rem;
            border-radius: 9999px;
            font-size: 0.75rem;
            font-weight: 700;
            background: var(--bg-tertiary);
        }}
        .event-meta {{ color: var(--text-secondary); font-size: 0.75rem; margin-top: 0.25rem; display: flex; gap: 1rem; }}
        .tag {{ color: var(--purple); }}
        .event-description {{ color: var(--text-secondary); font-size: 0.8rem; margin-top: 0.25rem; }}
        .message {{
            background: rgba(239, 68, 68, 0.1);
            border: 1px solid rgba(239, 68, 68, 0.2);
            border-radius: 0.5rem;
            padding: 0.75rem;
            margin-top: 0.75rem;
            color: #fca5a5;
            font-family: monospace;
            font-size: 0.8125rem;
            white-space: pre-wrap;
        }}
        .event.skip .message {{ background: rgba(245, 158, 11, 0.1); border-color: rgba(245, 158, 11, 0.2); color: #fcd34d; }}
        .screenshot-link {{ color: var(--blue); font-size: 0.75rem; font-weight: 600; cursor: pointer; }}
        .meta {{
            margin-top: 3rem;
            padding-top: 2rem;
            border-top: 1px solid var(--border);
            color: var(--text-secondary);
            font-size: 0.875rem;
            display: flex;
            justify-content: center;
            gap: 2rem;
        }}
        #modal {{
            display: none;
            position: fixed;
            z-index: 100;
            inset: 0;
            background: rgba(0, 0, 0, 0.9);
            padding: 2rem;
            align-items: center;
            justify-content: center;
        }}
        #modal img {{ max-width: 100%; max-height: 100%; border-radius: 0.5rem; }}
        #modal.active {{ display: flex; }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <div>
                <div class="eyebrow">{report_name}</div>
                <h1>{title}</h1>
            </div>
            <div style="text-align: right;">
                <div style="font-size: 0.875rem; color: var(--text-secondary);">Run Duration</div>
                <div style="font-size: 1.25rem; font-weight: 700;">{duration}</div>
            </div>
        </header>

        <div class="summary">
            <div class="stat"><div class="stat-value">{total}</div><div class="stat-label">Tests</div></div>
            <div class="stat"><div class="stat-value passed">{passed}</div><div class="stat-label">Passed</div></div>
            <div class="stat"><div class="stat-value failed">{failed}</div><div class="stat-label">Failed</div></div>
            <div class="stat"><div class="stat-value skipped">{skipped}</div><div class="stat-label">Skipped</div></div>
        </div>

        <div class="progress-bar"><div class="progress-fill" style="width: {pass_rate}%"></div></div>

        <div class="panels">
            <div class="panel">
                <h2>Environment</h2>
                <table>{system_html}</table>
            </div>
            <div class="panel">
                <h2>Contexts</h2>
                <table>
                    <tr><th>Name</th><th>OS</th><th>Browser</th><th>Groups</th></tr>
                    {contexts_html}
                </table>
            </div>
            <div class="panel">
                <h2>Categories</h2>
                <table>
                    <tr><th>Group</th><th>Passed</th><th>Failed</th><th>Skipped</th></tr>
                    {categories_html}
                </table>
            </div>
        </div>

        <h2>Tests</h2>
        {events_html}

        <div class="meta">
            <span>Run: {run_id}</span>
            <span>Started: {started}</span>
            <span>Finished: {finished}</span>
        </div>
    </div>

    <div id="modal" onclick="this.classList.remove('active')">
        <img id="modal-img" src="" alt="Screenshot">
    </div>

    <script>
        function showScreenshot(link) {{
            const modal = document.getElementById('modal');
            const img = document.getElementById('modal-img');
            img.src = link.dataset.src;
            modal.classList.add('active');
            event.stopPropagation();
        }}
    </script>
</body>
</html>"#,
        title = html_escape(&report.document_title),
        report_name = html_escape(&report.report_name),
        duration = format_duration(summary.total_duration_ms.unwrap_or(0)),
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        pass_rate = pass_rate,
        system_html = system_html,
        contexts_html = contexts_html,
        categories_html = categories_html,
        events_html = events_html,
        run_id = html_escape(&report.run_id),
        started = report.started_at.format("%Y-%m-%d %H:%M:%S"),
        finished = report.finished_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

fn render_event(event: &TestEvent) -> String {
    let class = match event.status {
        TestStatus::Pass => "pass",
        TestStatus::Fail => "fail",
        TestStatus::Skip => "skip",
    };

    let tags: String = event
        .groups
        .iter()
        .map(|g| format!(r#"<span class="tag">#{}</span>"#, html_escape(g)))
        .collect();

    let duration_html = event
        .duration_ms
        .map(|d| format!("<span>{}</span>", format_duration(d)))
        .unwrap_or_default();

    let message_html = event
        .message
        .as_deref()
        .map(|m| format!(r#"<div class="message">{}</div>"#, html_escape(m)))
        .unwrap_or_default();

    let screenshot_html = event
        .screenshot_path
        .as_deref()
        .map(|p| {
            format!(
                r#"<span class="screenshot-link" data-src="{}" onclick="showScreenshot(this)">View Screenshot</span>"#,
                html_escape(&p.replace('\\', "/"))
            )
        })
        .unwrap_or_default();

    let context_html = event
        .context
        .as_deref()
        .map(|c| format!("<span>{}</span>", html_escape(c)))
        .unwrap_or_default();

    let description_html = event
        .description
        .as_deref()
        .map(|d| format!(r#"<div class="event-description">{}</div>"#, html_escape(d)))
        .unwrap_or_default();

    format!(
        r#"
        <div class="event {class}">
            <div class="event-header">
                <span class="event-name">{identifier}</span>
                <span class="badge {class}">{label}</span>
            </div>
            {description_html}
            <div class="event-meta">
                <span>{headline}</span>
                {context_html}
                <span>{timestamp}</span>
                {duration_html}
                {tags}
                {screenshot_html}
            </div>
            {message_html}
        </div>"#,
        class = class,
        identifier = html_escape(&event.test_identifier),
        label = event.status.label(),
        headline = html_escape(&event.headline()),
        description_html = description_html,
        context_html = context_html,
        timestamp = event.timestamp.format("%H:%M:%S"),
        duration_html = duration_html,
        tags = tags,
        screenshot_html = screenshot_html,
        message_html = message_html,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60000;
        let seconds = (ms % 60000) as f64 / 1000.0;
        format!("{}m {:.0}s", minutes, seconds)
    }
}
