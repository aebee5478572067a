//! Tree rendering for skeleton hierarchies

use console::Style;

/// A node in a rendered tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    pub metadata: Vec<(String, String)>,
}

/// Kinds of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Root,
    /// Plain transform node
    Node,
    /// Node driving skinned vertices
    Joint,
}

/// Options for tree rendering
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            no_color: false,
            show_metadata: true,
        }
    }
}

impl TreeNode {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add metadata, shown after the name in insertion order
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.push((key.to_string(), value.into()));
        self
    }
}

impl NodeType {
    pub fn marker(self) -> &'static str {
        match self {
            NodeType::Root => "◆",
            NodeType::Node => "○",
            NodeType::Joint => "●",
        }
    }

    /// Get color style for node type
    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                NodeType::Root => Style::new().bold().cyan(),
                NodeType::Node => Style::new().dim(),
                NodeType::Joint => Style::new().green(),
            }
        }
    }
}

/// Render a tree structure to string
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    render_node(root, &mut output, "", true, 0, options);
    output
}

fn render_node(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) {
    if let Some(max_depth) = options.max_depth
        && depth > max_depth
    {
        return;
    }

    let style = node.node_type.style(options.no_color);
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    output.push_str(&format!(
        "{}{}{} {}",
        prefix,
        connector,
        node.node_type.marker(),
        style.apply_to(&node.name)
    ));

    if options.show_metadata && !node.metadata.is_empty() {
        let parts: Vec<String> = node
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        let meta_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        output.push_str(&format!(" {}", meta_style.apply_to(format!("[{}]", parts.join(", ")))));
    }
    output.push('\n');

    let new_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i == node.children.len() - 1;
        render_node(child, output, &new_prefix, is_last_child, depth + 1, options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain() -> TreeOptions {
        TreeOptions {
            no_color: true,
            ..TreeOptions::default()
        }
    }

    #[test]
    fn test_tree_rendering() {
        let root = TreeNode::new("root", NodeType::Root)
            .add_child(
                TreeNode::new("hip", NodeType::Joint)
                    .with_metadata("joint", "0")
                    .add_child(TreeNode::new("knee", NodeType::Joint)),
            )
            .add_child(TreeNode::new("tail", NodeType::Node));

        let output = render_tree(&root, &plain());
        let expected = "\
◆ root
├── ● hip [joint:0]
│   └── ● knee
└── ○ tail
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_max_depth() {
        let root = TreeNode::new("root", NodeType::Root).add_child(
            TreeNode::new("a", NodeType::Node).add_child(TreeNode::new("b", NodeType::Node)),
        );
        let options = TreeOptions {
            max_depth: Some(1),
            ..plain()
        };

        let output = render_tree(&root, &options);
        assert!(output.contains("a"));
        assert!(!output.contains("b"));
    }
}
