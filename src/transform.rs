//! Reshapes an `AggregateReport` into the tree consumed by the D3 views.
//!
//! Each top-level key of `classes` becomes one child whose leaves are the
//! entry's own methods followed by its own attributes. Subclasses nested
//! under a key are not expanded: only the outer key is drawn.

use crate::model::AggregateReport;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Attribute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MemberKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassNode {
    pub name: String,
    pub children: Vec<MemberNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VizTree {
    pub lines_of_code: u64,
    pub num_classes: u64,
    pub num_methods: u64,
    pub num_variables: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub for_loops: Option<u64>,
    pub children: Vec<ClassNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_number: Option<String>,
}

impl VizTree {
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_commit_number(mut self, commit_number: Option<String>) -> Self {
        self.commit_number = commit_number;
        self
    }
}

pub fn to_tree(report: &AggregateReport) -> VizTree {
    let children = report
        .classes
        .iter()
        .map(|(name, entry)| {
            let mut members = Vec::new();
            if let Some(record) = &entry.record {
                members.extend(record.methods.iter().map(|method| MemberNode {
                    name: method.clone(),
                    kind: MemberKind::Method,
                }));
                members.extend(record.attributes.iter().map(|attr| MemberNode {
                    name: attr.clone(),
                    kind: MemberKind::Attribute,
                }));
            }
            ClassNode {
                name: name.clone(),
                children: members,
            }
        })
        .collect();

    VizTree {
        lines_of_code: report.lines_of_code,
        num_classes: report.class_count,
        num_methods: report.method_count,
        num_variables: report.variable_count,
        for_loops: report.loop_count,
        children,
        commit_message: report.commit_message.clone(),
        title: None,
        commit_number: None,
    }
}
