use std::fmt;

/// A class base as written in the class header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseExpr {
    /// Plain identifier, e.g. `Base` in `class A(Base)`.
    Name(String),
    /// Attribute access, call, subscript or anything else.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignTarget {
    Name(String),
    /// Tuple/list unpacking, attribute or subscript targets.
    Other,
}

/// Direct child statement of a class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyItem {
    Method(String),
    /// One plain assignment statement; chained `a = b = 1` has two targets.
    Assignment(Vec<AssignTarget>),
    Loop,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<BaseExpr>,
    pub body: Vec<BodyItem>,
}

impl ClassDef {
    /// Simple-name bases in declaration order.
    pub fn simple_bases(&self) -> Vec<&str> {
        self.bases
            .iter()
            .filter_map(|base| match base {
                BaseExpr::Name(name) => Some(name.as_str()),
                BaseExpr::Other => None,
            })
            .collect()
    }
}

/// Every class definition of one file, at any depth, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedModule {
    pub classes: Vec<ClassDef>,
}

/// First syntax error of a file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Language front-end used by the extractor.
pub trait StructureParser {
    fn language(&self) -> &'static str;

    /// Extensions (without the dot) this front-end understands by default.
    fn extensions(&self) -> &'static [&'static str];

    fn parse(&mut self, source: &str) -> Result<ParsedModule, SyntaxError>;
}
