use crate::arena::{Graph, Node, NodeId};

const DEBUG_UNPARSE_MAX_DEPTH: usize = 8;
const DEBUG_UNPARSE_MAX_NODES: usize = 200;

pub fn node_kind(g: &Graph, id: NodeId) -> &'static str {
    match g.get(id) {
        Node::Atom(_) => "Atom",
        Node::Cell(_, _) => "Cell",
    }
}

/// Render a noun as `[a b c]` text, compressing right-nested cells. Output
/// parses back to the same noun.
pub fn unparse(g: &Graph, id: NodeId) -> String {
    let mut budget = usize::MAX;
    render(g, id, usize::MAX, &mut budget)
}

/// Like [`unparse`] but cut off at a fixed depth and node budget, for log lines.
pub fn debug_unparse(g: &Graph, id: NodeId) -> String {
    let mut budget = DEBUG_UNPARSE_MAX_NODES;
    render(g, id, DEBUG_UNPARSE_MAX_DEPTH, &mut budget)
}

fn render(g: &Graph, id: NodeId, max_depth: usize, budget: &mut usize) -> String {
    enum Item {
        Node(NodeId, usize),
        Text(&'static str),
    }

    let mut out = String::new();
    let mut stack: Vec<Item> = vec![Item::Node(id, 0)];

    while let Some(item) = stack.pop() {
        match item {
            Item::Text(s) => out.push_str(s),
            Item::Node(curr, depth) => {
                if *budget == 0 || depth > max_depth {
                    out.push_str("...");
                    continue;
                }
                *budget -= 1;
                match g.get(curr) {
                    Node::Atom(n) => out.push_str(&n.to_string()),
                    Node::Cell(h, t) => {
                        // Flatten the right spine: [a [b c]] prints as [a b c].
                        let mut elems = vec![*h];
                        let mut rest = *t;
                        while let Node::Cell(h2, t2) = g.get(rest) {
                            elems.push(*h2);
                            rest = *t2;
                        }
                        elems.push(rest);

                        stack.push(Item::Text("]"));
                        for (i, e) in elems.iter().enumerate().rev() {
                            stack.push(Item::Node(*e, depth + 1));
                            if i > 0 {
                                stack.push(Item::Text(" "));
                            }
                        }
                        stack.push(Item::Text("["));
                    }
                }
            }
        }
    }
    out
}
