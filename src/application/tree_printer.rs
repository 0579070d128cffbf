use colored::Colorize;
use supports_color::Stream;

use crate::tree::DisplayNode;

/// Turns colored output on only when stdout can show it.
pub fn enable_colors() {
    colored::control::set_override(supports_color::on(Stream::Stdout).is_some());
}

/// Renders display nodes as an indented tree, one entry per line.
pub fn render_display_tree(nodes: &[DisplayNode]) -> String {
    let mut out = String::new();
    render_level(nodes, "", &mut out);
    out
}

fn render_level(nodes: &[DisplayNode], prefix: &str, out: &mut String) {
    for (index, node) in nodes.iter().enumerate() {
        let last = index + 1 == nodes.len();
        let branch = if last { "└── " } else { "├── " };
        let title = if node.is_leaf {
            node.title.normal()
        } else {
            format!("{}/", node.title).blue().bold()
        };
        out.push_str(&format!("{prefix}{branch}{title}\n"));

        if let Some(children) = &node.children {
            let prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
            render_level(children, &prefix, out);
        }
    }
}
