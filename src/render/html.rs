use crate::model::JobGraphDoc;

/// Render a self-contained HTML view of the job graph (document embedded as JSON).
///
/// Important: we avoid `format!()` because the page contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(doc: &JobGraphDoc) -> anyhow::Result<String> {
    // "</" would end the <script> element early; "<\/" is the same JSON string.
    let json = serde_json::to_string(doc)?.replace("</", "<\\/");

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Job Graph</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  .container { display: flex; height: calc(100vh - 58px); }
  .sidebar { width: 320px; border-right: 1px solid #ddd; padding: 12px; overflow: auto; }
  .main { flex: 1; padding: 12px; overflow: auto; }

  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .pill.source { border-color: #9fd49f; }
  .pill.sink { border-color: #f0b37e; }
  .pill.intermediate { border-color: #9cc1f0; }

  .job { cursor: pointer; user-select: none; padding: 4px 6px; border-radius: 4px; }
  .job:hover { background: #f3f3f3; }
  .job.selected { background: #e9f2ff; border: 1px solid #cfe3ff; }
  .muted { color: #777; font-size: 12px; }

  table { border-collapse: collapse; width: 100%; margin-top: 8px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; vertical-align: top; }
  th { position: sticky; top: 0; background: white; border-bottom: 1px solid #ddd; }
  code { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 13px; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>

<div class="container">
  <div class="sidebar">
    <input id="search" placeholder="Filter jobs..." style="width: 100%; box-sizing: border-box; padding: 6px 8px; border: 1px solid #ddd; border-radius: 6px; margin-bottom: 8px;">
    <div id="jobs"></div>
  </div>

  <div class="main">
    <h2 id="title">Select a job</h2>
    <div id="streams"></div>
    <table id="opsTable" style="display:none;">
      <thead>
        <tr><th>Operator</th><th>Op code</th><th>Next</th><th>Attributes</th><th>Source</th></tr>
      </thead>
      <tbody></tbody>
    </table>
  </div>
</div>

<script>
const DATA = __DATA__;

function esc(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function roleOf(streamId) {
  if (streamId in DATA.sourceStreams) return "source";
  if (streamId in DATA.sinkStreams) return "sink";
  if (streamId in DATA.intermediateStreams) return "intermediate";
  return "";
}

function renderSummary() {
  const count = (o) => Object.keys(o).length;
  document.getElementById("summary").innerHTML = [
    `<span class="pill"><b>${esc(DATA.applicationName)}</b> <span class="muted">${esc(DATA.applicationId)}</span></span>`,
    `<span class="pill">jobs: ${DATA.jobs.length}</span>`,
    `<span class="pill source">source streams: ${count(DATA.sourceStreams)}</span>`,
    `<span class="pill intermediate">intermediate streams: ${count(DATA.intermediateStreams)}</span>`,
    `<span class="pill sink">sink streams: ${count(DATA.sinkStreams)}</span>`,
    `<span class="pill">tables: ${count(DATA.tables)}</span>`,
  ].join("");
}

const state = { selected: null, filter: "" };

function renderJobs() {
  const el = document.getElementById("jobs");
  el.innerHTML = "";
  DATA.jobs.forEach((job, idx) => {
    const label = `${job.jobName}-${job.jobId}`;
    if (state.filter && !label.toLowerCase().includes(state.filter)) return;
    const div = document.createElement("div");
    div.className = "job" + (state.selected === idx ? " selected" : "");
    const ops = Object.keys(job.operatorGraph.operators).length;
    div.innerHTML = `${esc(job.jobName)} <span class="muted">id ${esc(job.jobId)}, ${ops} operators</span>`;
    div.onclick = () => selectJob(idx);
    el.appendChild(div);
  });
}

function streamPill(streamId) {
  return `<span class="pill ${roleOf(streamId)}"><code>${esc(streamId)}</code></span>`;
}

function selectJob(idx) {
  state.selected = idx;
  renderJobs();

  const job = DATA.jobs[idx];
  const graph = job.operatorGraph;
  document.getElementById("title").textContent = `${job.jobName} (id ${job.jobId})`;

  const inputs = graph.inputStreams
    .map((s) => `${streamPill(s.streamId)} &rarr; ${s.nextOperatorIds.map(esc).join(", ") || "<span class=\"muted\">no operators</span>"}`)
    .join("<br>");
  const outputs = graph.outputStreams.map((s) => streamPill(s.streamId)).join(" ");
  document.getElementById("streams").innerHTML =
    `<p><b>Inputs</b><br>${inputs || "<span class=\"muted\">none</span>"}</p>` +
    `<p><b>Outputs</b><br>${outputs || "<span class=\"muted\">none</span>"}</p>`;

  const table = document.getElementById("opsTable");
  const tbody = table.querySelector("tbody");
  tbody.innerHTML = "";
  const ops = Object.values(graph.operators);
  table.style.display = ops.length ? "" : "none";
  for (const op of ops) {
    const attrs = [];
    if (op.outputStreamId !== undefined) attrs.push(`output ${streamPill(op.outputStreamId)}`);
    if (op.tableId !== undefined) {
      const t = DATA.tables[op.tableId];
      attrs.push(`table <code>${esc(op.tableId)}</code>` + (t ? ` <span class="muted">${esc(t.providerFactory)}</span>` : ""));
    }
    if (op.ttlMs !== undefined) attrs.push(`ttl ${op.ttlMs} ms`);
    const tr = document.createElement("tr");
    tr.innerHTML =
      `<td><code>${esc(op.opId)}</code></td>` +
      `<td>${esc(op.opCode)}</td>` +
      `<td>${op.nextOperatorIds.map(esc).join(", ")}</td>` +
      `<td>${attrs.join("<br>")}</td>` +
      `<td class="muted">${esc(op.sourceLocation)}</td>`;
    tbody.appendChild(tr);
  }
}

document.getElementById("search").addEventListener("input", (e) => {
  state.filter = e.target.value.trim().toLowerCase();
  renderJobs();
});

renderSummary();
renderJobs();
if (DATA.jobs.length) selectJob(0);
</script>
</body>
</html>
"#;

    Ok(TEMPLATE.replace("__DATA__", &json))
}
