use crate::structure::extract::{
    AssignTarget, BaseExpr, BodyItem, ClassDef, ParsedModule, StructureParser, SyntaxError,
};
use tree_sitter::{LanguageError, Node, Parser};

pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self, LanguageError> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }
}

impl StructureParser for PythonParser {
    fn language(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&mut self, source: &str) -> Result<ParsedModule, SyntaxError> {
        let tree = self.parser.parse(source, None).ok_or_else(|| SyntaxError {
            line: 1,
            column: 1,
            message: "parser produced no tree".to_string(),
        })?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(syntax_error(root));
        }
        if let Some(node) = first_python2_node(root) {
            let start = node.start_position();
            return Err(SyntaxError {
                line: start.row + 1,
                column: start.column + 1,
                message: format!("python 2 {} is not valid python 3", node.kind()),
            });
        }
        let mut module = ParsedModule::default();
        collect_classes(root, source, &mut module.classes);
        Ok(module)
    }
}

fn collect_classes(node: Node<'_>, source: &str, out: &mut Vec<ClassDef>) {
    if node.kind() == "class_definition" {
        if let Some(class) = class_def(node, source) {
            out.push(class);
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_classes(child, source, out);
    }
}

fn class_def(node: Node<'_>, source: &str) -> Option<ClassDef> {
    let name = node_text(node.child_by_field_name("name")?, source);
    if name.is_empty() {
        return None;
    }
    let bases = node
        .child_by_field_name("superclasses")
        .map(|list| base_exprs(list, source))
        .unwrap_or_default();
    let body = node
        .child_by_field_name("body")
        .map(|block| body_items(block, source))
        .unwrap_or_default();
    Some(ClassDef { name, bases, body })
}

fn base_exprs(list: Node<'_>, source: &str) -> Vec<BaseExpr> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        // metaclass=... and **kwargs are class keywords, not bases
        .filter(|child| {
            !matches!(
                child.kind(),
                "keyword_argument" | "dictionary_splat" | "comment"
            )
        })
        .map(|child| {
            let child = unparenthesize(child);
            match child.kind() {
                "identifier" => BaseExpr::Name(node_text(child, source)),
                _ => BaseExpr::Other,
            }
        })
        .collect()
}

/// `(Base)` and `((Base))` are the bare expression; `(A, B)` is a tuple.
fn unparenthesize(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        let mut cursor = node.walk();
        let inner = node
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment");
        match inner {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

fn body_items(block: Node<'_>, source: &str) -> Vec<BodyItem> {
    let mut cursor = block.walk();
    block
        .named_children(&mut cursor)
        .filter(|stmt| stmt.kind() != "comment")
        .map(|stmt| body_item(stmt, source))
        .collect()
}

fn body_item(stmt: Node<'_>, source: &str) -> BodyItem {
    match stmt.kind() {
        "function_definition" => method(stmt, source),
        "decorated_definition" => match stmt.child_by_field_name("definition") {
            Some(def) if def.kind() == "function_definition" => method(def, source),
            _ => BodyItem::Other,
        },
        "expression_statement" => stmt
            .named_child(0)
            .and_then(|expr| assignment_targets(expr, source))
            .map(BodyItem::Assignment)
            .unwrap_or(BodyItem::Other),
        "for_statement" if !is_async(stmt) => BodyItem::Loop,
        _ => BodyItem::Other,
    }
}

fn method(def: Node<'_>, source: &str) -> BodyItem {
    if is_async(def) {
        return BodyItem::Other;
    }
    match def.child_by_field_name("name") {
        Some(name) => BodyItem::Method(node_text(name, source)),
        None => BodyItem::Other,
    }
}

/// Targets of a plain `=` statement, outermost first. Annotated
/// (`x: int = 1`) and augmented (`x += 1`) assignments return `None`.
fn assignment_targets(node: Node<'_>, source: &str) -> Option<Vec<AssignTarget>> {
    if !is_plain_assignment(node) {
        return None;
    }
    let mut targets = Vec::new();
    let mut current = node;
    loop {
        let left = current.child_by_field_name("left")?;
        targets.push(match left.kind() {
            "identifier" => AssignTarget::Name(node_text(left, source)),
            _ => AssignTarget::Other,
        });
        match current.child_by_field_name("right") {
            Some(right) if is_plain_assignment(right) => current = right,
            _ => break,
        }
    }
    Some(targets)
}

fn is_plain_assignment(node: Node<'_>) -> bool {
    node.kind() == "assignment"
        && node.child_by_field_name("type").is_none()
        && node.child_by_field_name("right").is_some()
}

fn is_async(node: Node<'_>) -> bool {
    node.child(0).is_some_and(|first| first.kind() == "async")
}

fn syntax_error(root: Node<'_>) -> SyntaxError {
    match first_error_node(root) {
        Some(node) => {
            let start = node.start_position();
            let message = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "invalid syntax".to_string()
            };
            SyntaxError {
                line: start.row + 1,
                column: start.column + 1,
                message,
            }
        }
        None => SyntaxError {
            line: 1,
            column: 1,
            message: "invalid syntax".to_string(),
        },
    }
}

/// tree-sitter-python still accepts the `print` and `exec` statements and
/// `except E, e:`, none of which parse as Python 3.
fn first_python2_node(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "print_statement" | "exec_statement" => return Some(node),
        "except_clause" if is_python2_except(node) => return Some(node),
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = first_python2_node(child) {
            return Some(found);
        }
    }
    None
}

fn is_python2_except(clause: Node<'_>) -> bool {
    let mut cursor = clause.walk();
    if clause.children_by_field_name("value", &mut cursor).count() > 1 {
        return true;
    }
    let mut cursor = clause.walk();
    clause.children(&mut cursor).any(|child| child.kind() == ",")
}

fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error_node(child) {
                return Some(found);
            }
        }
    }
    None
}

fn node_text(node: Node<'_>, source: &str) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    source.get(start..end).unwrap_or("").trim().to_string()
}
