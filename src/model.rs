use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys a serialized `ClassEntry` uses for its own record. Nested subclass
/// names share the same JSON object, so these names cannot be subclasses.
pub const RECORD_KEYS: &[&str] = &["methods", "attributes", "loops"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(rename = "loops", default, skip_serializing_if = "Option::is_none")]
    pub loop_count: Option<u64>,
}

/// Value stored under a top-level key of `AggregateReport::classes`.
///
/// `record` is the class defined under this name without a simple-name base.
/// `subclasses` holds every class whose first simple-name base is this name,
/// whether or not the base itself was ever defined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassEntry {
    pub record: Option<ClassRecord>,
    pub subclasses: IndexMap<String, ClassRecord>,
}

impl Serialize for ClassEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(record) = &self.record {
            map.serialize_entry("methods", &record.methods)?;
            map.serialize_entry("attributes", &record.attributes)?;
            if let Some(loops) = record.loop_count {
                map.serialize_entry("loops", &loops)?;
            }
        }
        for (name, subclass) in &self.subclasses {
            map.serialize_entry(name, subclass)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ClassEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut record: Option<ClassRecord> = None;
        let mut subclasses = IndexMap::new();
        for (key, value) in raw {
            match key.as_str() {
                "methods" => {
                    record.get_or_insert_with(ClassRecord::default).methods =
                        serde_json::from_value(value).map_err(de::Error::custom)?;
                }
                "attributes" => {
                    record.get_or_insert_with(ClassRecord::default).attributes =
                        serde_json::from_value(value).map_err(de::Error::custom)?;
                }
                "loops" => {
                    record.get_or_insert_with(ClassRecord::default).loop_count =
                        Some(serde_json::from_value(value).map_err(de::Error::custom)?);
                }
                _ => {
                    let subclass: ClassRecord =
                        serde_json::from_value(value).map_err(de::Error::custom)?;
                    subclasses.insert(key, subclass);
                }
            }
        }
        Ok(ClassEntry { record, subclasses })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    pub lines_of_code: u64,
    #[serde(rename = "num_classes")]
    pub class_count: u64,
    #[serde(rename = "num_methods")]
    pub method_count: u64,
    #[serde(rename = "num_variables")]
    pub variable_count: u64,
    #[serde(rename = "for_loops", default, skip_serializing_if = "Option::is_none")]
    pub loop_count: Option<u64>,
    #[serde(default)]
    pub classes: IndexMap<String, ClassEntry>,
}

impl AggregateReport {
    /// Record filed directly under `name` (a class with no simple-name base).
    pub fn top_level(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.get(name).and_then(|entry| entry.record.as_ref())
    }

    /// Record filed under `classes[base][name]`.
    pub fn nested(&self, base: &str, name: &str) -> Option<&ClassRecord> {
        self.classes
            .get(base)
            .and_then(|entry| entry.subclasses.get(name))
    }

    /// Growth from `previous` to `self`. `for_loops_change` is only set when
    /// both reports tracked loops.
    pub fn delta(&self, previous: &AggregateReport) -> ReportDelta {
        ReportDelta {
            lines_of_code_change: signed_change(previous.lines_of_code, self.lines_of_code),
            num_classes_change: signed_change(previous.class_count, self.class_count),
            num_methods_change: signed_change(previous.method_count, self.method_count),
            num_variables_change: signed_change(previous.variable_count, self.variable_count),
            for_loops_change: previous
                .loop_count
                .zip(self.loop_count)
                .map(|(before, after)| signed_change(before, after)),
        }
    }
}

fn signed_change(before: u64, after: u64) -> i64 {
    (i128::from(after) - i128::from(before)).clamp(i128::from(i64::MIN), i128::from(i64::MAX))
        as i64
}

/// Change in the scalar counts between two consecutive reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDelta {
    pub lines_of_code_change: i64,
    pub num_classes_change: i64,
    pub num_methods_change: i64,
    pub num_variables_change: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_loops_change: Option<i64>,
}

/// Where `ReportBuilder::record_class` filed a class. `Shadowed` means the
/// slot was already taken: the class still counts, its members are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassSlot {
    TopLevel(usize),
    Nested { entry: usize, index: usize },
    Shadowed,
}

/// Owns an `AggregateReport` while a run is in progress and enforces the
/// placement rules: one level of nesting under the first simple-name base,
/// insert-if-absent at every slot.
#[derive(Debug)]
pub struct ReportBuilder {
    report: AggregateReport,
    track_loops: bool,
}

impl ReportBuilder {
    pub fn new(track_loops: bool) -> Self {
        let report = AggregateReport {
            loop_count: track_loops.then_some(0),
            ..AggregateReport::default()
        };
        Self {
            report,
            track_loops,
        }
    }

    pub fn with_commit_message(mut self, message: Option<String>) -> Self {
        self.report.commit_message = message;
        self
    }

    pub fn add_lines(&mut self, lines: u64) {
        self.report.lines_of_code += lines;
    }

    /// `bases` are the class's simple-name bases in declaration order; only
    /// the first one decides placement.
    pub fn record_class<S: AsRef<str>>(&mut self, name: &str, bases: &[S]) -> ClassSlot {
        self.report.class_count += 1;
        let record = ClassRecord {
            loop_count: self.track_loops.then_some(0),
            ..ClassRecord::default()
        };
        match bases.first() {
            Some(base) => self.place_nested(base.as_ref(), name, record),
            None => self.place_top_level(name, record),
        }
    }

    fn place_top_level(&mut self, name: &str, record: ClassRecord) -> ClassSlot {
        let entry = self.report.classes.entry(name.to_string());
        let index = entry.index();
        let entry = entry.or_default();
        if entry.record.is_some() {
            return ClassSlot::Shadowed;
        }
        entry.record = Some(record);
        ClassSlot::TopLevel(index)
    }

    fn place_nested(&mut self, base: &str, name: &str, record: ClassRecord) -> ClassSlot {
        if RECORD_KEYS.contains(&name) {
            tracing::debug!(class = name, base, "subclass name collides with record key");
            return ClassSlot::Shadowed;
        }
        let entry = self.report.classes.entry(base.to_string());
        let entry_index = entry.index();
        let subclasses = &mut entry.or_default().subclasses;
        match subclasses.entry(name.to_string()) {
            indexmap::map::Entry::Occupied(_) => ClassSlot::Shadowed,
            indexmap::map::Entry::Vacant(vacant) => {
                let index = vacant.index();
                vacant.insert(record);
                ClassSlot::Nested {
                    entry: entry_index,
                    index,
                }
            }
        }
    }

    pub fn record_method(&mut self, slot: ClassSlot, name: &str) {
        self.report.method_count += 1;
        if let Some(record) = self.slot_mut(slot) {
            record.methods.push(name.to_string());
        }
    }

    pub fn record_attribute(&mut self, slot: ClassSlot, name: &str) {
        self.report.variable_count += 1;
        if let Some(record) = self.slot_mut(slot) {
            record.attributes.push(name.to_string());
        }
    }

    pub fn record_loop(&mut self, slot: ClassSlot) {
        if !self.track_loops {
            return;
        }
        if let Some(total) = self.report.loop_count.as_mut() {
            *total += 1;
        }
        if let Some(count) = self.slot_mut(slot).and_then(|r| r.loop_count.as_mut()) {
            *count += 1;
        }
    }

    fn slot_mut(&mut self, slot: ClassSlot) -> Option<&mut ClassRecord> {
        match slot {
            ClassSlot::TopLevel(index) => self
                .report
                .classes
                .get_index_mut(index)
                .and_then(|(_, entry)| entry.record.as_mut()),
            ClassSlot::Nested { entry, index } => self
                .report
                .classes
                .get_index_mut(entry)
                .and_then(|(_, entry)| entry.subclasses.get_index_mut(index))
                .map(|(_, record)| record),
            ClassSlot::Shadowed => None,
        }
    }

    pub fn finish(self) -> AggregateReport {
        self.report
    }
}
