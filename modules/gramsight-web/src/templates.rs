//! Self-contained HTML graph view built from template strings and rendered
//! client-side with vis-network. Node/edge data is embedded as JSON.

use gramsight_graph::Subgraph;

/// Color, glow, and fixed size per node group. Post size is dynamic and
/// carried on each node.
const GROUP_STYLES: &str = r##"{
    "brand":      {"color": "#FF4500", "size": 50},
    "post":       {"color": "#1E90FF", "size": null},
    "hashtag":    {"color": "#00E676", "size": 14},
    "mention":    {"color": "#FF9800", "size": 16},
    "theme":      {"color": "#E040FB", "size": 22},
    "month":      {"color": "#FFD600", "size": 24},
    "media_type": {"color": "#26C6DA", "size": 20}
}"##;

const EDGE_COLORS: &str = r##"{
    "POSTED":      "#FF450060",
    "HAS_HASHTAG": "#00E67650",
    "MENTIONS":    "#FF980060",
    "THEME":       "#E040FB60",
    "BELONGS_TO":  "#FFD60050",
    "IS_TYPE":     "#26C6DA50"
}"##;

const EDGE_WIDTHS: &str = r#"{
    "POSTED":      2.5,
    "THEME":       2.0,
    "MENTIONS":    1.8,
    "HAS_HASHTAG": 1.2,
    "BELONGS_TO":  1.0,
    "IS_TYPE":     1.0
}"#;

/// Render the interactive graph page for a subgraph.
pub fn render_graph_view(title: &str, subgraph: &Subgraph) -> String {
    let nodes_json = serde_json::to_string(&subgraph.nodes).unwrap_or_else(|_| "[]".to_string());
    let edges_json = serde_json::to_string(&subgraph.edges).unwrap_or_else(|_| "[]".to_string());
    let meta = &subgraph.meta;

    let stats_html = format!(
        "Posts <span>{}</span> &nbsp; Hashtags <span>{}</span> &nbsp; \
         Mentions <span>{}</span> &nbsp; Themes <span>{}</span> &nbsp; \
         Nodes <span>{}</span> &nbsp; Edges <span>{}</span>",
        meta.total_posts,
        meta.total_hashtags,
        meta.total_mentions,
        meta.total_themes,
        subgraph.nodes.len(),
        subgraph.edges.len(),
    );

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script src="https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js"></script>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;background:#0b0e14;color:#e6e6e6;}}
.header{{background:#12161f;padding:12px 24px;display:flex;align-items:center;justify-content:space-between;border-bottom:1px solid #1e2430;}}
.header h1{{font-size:16px;font-weight:600;}}
.stats{{font-size:13px;color:#8a93a6;}}
.stats span{{color:#e6e6e6;font-weight:600;}}
.search{{background:#12161f;padding:8px 24px;border-bottom:1px solid #1e2430;}}
.search input{{background:#0b0e14;border:1px solid #2a3242;color:#e6e6e6;border-radius:4px;padding:6px 10px;width:260px;font-size:13px;}}
#graph{{height:calc(100vh - 96px);}}
</style>
</head>
<body>
<div class="header">
    <h1>{title}</h1>
    <div class="stats">{stats}</div>
</div>
<div class="search"><input id="q" placeholder="Find a node (hashtag, mention, theme...)"></div>
<div id="graph"></div>
<script>
const GROUP_STYLES = {group_styles};
const EDGE_COLORS  = {edge_colors};
const EDGE_WIDTHS  = {edge_widths};

const rawNodes = {nodes};
const rawEdges = {edges};

const nodes = new vis.DataSet(rawNodes.map(n => {{
    const style = GROUP_STYLES[n.group] || {{color: "#999", size: 16}};
    let tooltip = n.label;
    if (n.group === "post") {{
        tooltip = `${{n.like_count}} likes, ${{n.comment_count}} comments (${{n.media_type}})\n${{n.caption || ""}}`;
    }}
    return {{
        id: n.id,
        label: n.label,
        title: tooltip,
        color: {{background: style.color, border: style.color}},
        size: n.size || style.size || 16,
        shape: "dot",
        font: {{color: "#d7dce6", size: 12}},
    }};
}}));

const edges = new vis.DataSet(rawEdges.map((e, i) => ({{
    id: i,
    from: e.from,
    to: e.to,
    color: {{color: EDGE_COLORS[e.label] || "#55555540"}},
    width: EDGE_WIDTHS[e.label] || 1.0,
    arrows: {{to: {{enabled: true, scaleFactor: 0.4}}}},
}})));

const network = new vis.Network(
    document.getElementById("graph"),
    {{nodes, edges}},
    {{
        physics: {{
            solver: "forceAtlas2Based",
            forceAtlas2Based: {{gravitationalConstant: -60, springLength: 120}},
            stabilization: {{iterations: 150}},
        }},
        interaction: {{hover: true, tooltipDelay: 120}},
    }}
);

network.on("doubleClick", params => {{
    const id = params.nodes[0];
    if (!id) return;
    const node = rawNodes.find(n => n.id === id);
    if (node && node.url) window.open(node.url, "_blank");
}});

document.getElementById("q").addEventListener("keydown", ev => {{
    if (ev.key !== "Enter") return;
    const q = ev.target.value.trim().toLowerCase();
    if (!q) return;
    const hit = rawNodes.find(n => n.label.toLowerCase().includes(q) || n.id.toLowerCase().includes(q));
    if (hit) {{
        network.focus(hit.id, {{scale: 1.4, animation: true}});
        network.selectNodes([hit.id]);
    }}
}});
</script>
</body>
</html>"##,
        title = html_escape(title),
        stats = stats_html,
        group_styles = GROUP_STYLES,
        edge_colors = EDGE_COLORS,
        edge_widths = EDGE_WIDTHS,
        nodes = nodes_json,
        edges = edges_json,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
